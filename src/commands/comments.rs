//! Photo comment commands.
//!
//! - `comments`: list the validated comments of a photo
//! - `comment`: submit a new comment for moderation

use jiff::Timestamp;
use owo_colors::OwoColorize;
use serde_json::json;
use tokio::sync::mpsc;

use super::{CommandOutput, OutputOptions, print_snapshots, session_deps};
use crate::comments::SendOutcome;
use crate::config::Config;
use crate::error::{RescueError, Result};
use crate::model::{Photo, PhotoComment};
use crate::screens::{comment_composer, open_comments};

fn photo(id: &str) -> Photo {
    Photo {
        id: Some(id.to_string()),
        url: None,
        story: String::new(),
    }
}

/// List the validated comments of a photo
pub async fn cmd_comments(photo_id: &str, watch: bool, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let deps = session_deps(&config, watch)?;
    let root = config.comments_path()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = open_comments(&deps, &root, &photo(photo_id), move |comments| {
        let _ = tx.send(comments.clone());
    })?
    .ok_or_else(|| RescueError::Other(format!("photo '{photo_id}' has no comment thread")))?;

    let result = print_snapshots(&mut rx, watch, output, |comments| render(photo_id, comments)).await;
    session.close();
    result
}

fn render(photo_id: &str, comments: &[PhotoComment]) -> CommandOutput {
    let json_output = json!({
        "photo_id": photo_id,
        "comments": comments
            .iter()
            .map(|c| json!({
                "key": c.key,
                "content": c.content,
                "author": c.author,
                "timestamp": c.timestamp,
                "date": c.formatted_date(),
            }))
            .collect::<Vec<_>>(),
    });

    if comments.is_empty() {
        return CommandOutput::new(json_output).with_text("No comments".dimmed().to_string());
    }

    let lines: Vec<String> = comments
        .iter()
        .map(|c| {
            let author = if c.author.is_empty() {
                String::new()
            } else {
                format!("{} ", c.author.yellow())
            };
            format!("{} {author}{}", c.formatted_date().dimmed(), c.content)
        })
        .collect();
    CommandOutput::new(json_output).with_text(lines.join("\n"))
}

/// Submit a comment; it stays hidden until validated
pub async fn cmd_comment(photo_id: &str, text: &[String], output: OutputOptions) -> Result<()> {
    let content = text.join(" ");
    if content.trim().is_empty() {
        return Err(RescueError::Other("comment text is empty".to_string()));
    }

    let config = Config::load()?;
    let deps = session_deps(&config, false)?;
    let root = config.comments_path()?;
    let composer = comment_composer(&deps, &root, &photo(photo_id))?;

    let now = Timestamp::now();
    composer.set_input(content);
    let outcome = composer.send(now).await?;
    let thread = composer
        .thread()
        .map(ToString::to_string)
        .unwrap_or_default();

    let sent = outcome == SendOutcome::Sent;
    CommandOutput::new(json!({
        "action": "comment_submitted",
        "photo_id": photo_id,
        "thread": thread,
        "key": now.as_second().to_string(),
        "sent": sent,
    }))
    .with_text(format!(
        "Submitted comment to {} (pending moderation)",
        thread.cyan()
    ))
    .print(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_lists_date_and_content() {
        let comments = vec![PhotoComment {
            key: "1535000000".into(),
            content: "Brave work".into(),
            timestamp: "1535000000".into(),
            author: String::new(),
            validated: true,
        }];
        let out = render("p1", &comments);
        assert_eq!(out.json["comments"][0]["date"], "2018-08-23 04:53");
        assert!(out.text.unwrap().contains("Brave work"));
    }
}
