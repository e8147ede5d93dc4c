//! `rescue blob`: bounded download from the local blob directory.

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions};
use crate::blob::DirBlobStore;
use crate::busy::NoopBusyIndicator;
use crate::config::Config;
use crate::error::Result;
use crate::model::Photo;
use crate::screens::download_photo;

pub async fn cmd_blob(path: &str, max_size: Option<u64>, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let store = DirBlobStore::new(&config.blobs);
    let max_size = max_size.unwrap_or(config.max_blob_size);
    let photo = Photo {
        id: None,
        url: Some(path.to_string()),
        story: String::new(),
    };

    let Some(result) = download_photo(&store, &NoopBusyIndicator, &photo, max_size).await else {
        return Ok(());
    };
    let data = result?;

    CommandOutput::new(json!({
        "path": path,
        "size": data.len(),
        "max_size": max_size,
    }))
    .with_text(format!("{}: {} bytes", path.cyan(), data.len()))
    .print(output)
}
