//! `rescue contacts`: the emergency contacts directory.

use owo_colors::OwoColorize;
use serde_json::json;
use tokio::sync::mpsc;

use super::{CommandOutput, OutputOptions, print_snapshots, session_deps};
use crate::config::Config;
use crate::decode::GroupedList;
use crate::error::Result;
use crate::model::Contact;
use crate::screens::open_contacts;

pub async fn cmd_contacts(watch: bool, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let deps = session_deps(&config, watch)?;
    let root = config.contacts_path()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = open_contacts(&deps, &root, move |list| {
        let _ = tx.send(list.clone());
    });
    let source = session.source().to_string();

    let result = print_snapshots(&mut rx, watch, output, |list| render(list, &source)).await;
    session.close();
    result
}

/// Sections in registry order, then sections that only have details.
fn ordered_sections(list: &GroupedList<Contact>) -> Vec<(&str, &str)> {
    let mut sections: Vec<(&str, &str)> = list.registry.iter().collect();
    for key in list.detail_keys() {
        if !list.registry.contains(key) {
            sections.push((key, key));
        }
    }
    sections
}

fn render(list: &GroupedList<Contact>, source: &str) -> CommandOutput {
    let sections = ordered_sections(list);

    let json_sections: Vec<_> = sections
        .iter()
        .map(|(key, label)| {
            json!({
                "key": key,
                "label": label,
                "contacts": list.items(key),
            })
        })
        .collect();
    let json_output = json!({
        "source": source,
        "sections": json_sections,
    });

    if sections.is_empty() {
        return CommandOutput::new(json_output).with_text("No contacts".dimmed().to_string());
    }

    let mut text = String::new();
    for (key, label) in &sections {
        text.push_str(&format!("{}\n", label.cyan().bold()));
        let items = list.items(key);
        if items.is_empty() {
            text.push_str(&format!("  {}\n", "(none)".dimmed()));
        }
        for contact in items {
            let phones = if contact.phones.is_empty() {
                "-".dimmed().to_string()
            } else {
                contact.phones.join(", ")
            };
            text.push_str(&format!("  {:<30} {}\n", contact.name, phones));
        }
    }
    text.push_str(&format!("{}", format!("Source: {source}").dimmed()));

    CommandOutput::new(json_output).with_text(text)
}
