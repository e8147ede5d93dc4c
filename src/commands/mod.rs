mod blob;
mod comments;
mod config;
mod contacts;

pub use blob::cmd_blob;
pub use comments::{cmd_comment, cmd_comments};
pub use config::{cmd_config_get, cmd_config_set, cmd_config_show};
pub use contacts::cmd_contacts;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::busy::NoopBusyIndicator;
use crate::client::{RemoteDocumentClient, UnavailableClient};
use crate::config::Config;
use crate::error::{RescueError, Result};
use crate::fallback::{BundledResources, FixedConnectivity};
use crate::session::SessionDeps;
use crate::store::FileStore;

/// How long a one-shot listing waits for its first snapshot.
const FIRST_SNAPSHOT_TIMEOUT: Duration = Duration::from_secs(10);

/// Output flags shared by every command.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputOptions {
    pub json: bool,
}

/// Result of a command, printable as text or JSON.
pub struct CommandOutput {
    json: Value,
    text: Option<String>,
}

impl CommandOutput {
    pub fn new(json: Value) -> Self {
        Self { json, text: None }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn print(self, output: OutputOptions) -> Result<()> {
        if output.json {
            println!("{}", serde_json::to_string_pretty(&self.json)?);
        } else if let Some(text) = self.text {
            println!("{text}");
        } else {
            println!("{}", serde_json::to_string_pretty(&self.json)?);
        }
        Ok(())
    }
}

/// Build session collaborators from the configuration.
///
/// The local database file plays the remote store. With `watch`, outside
/// edits to it are published to open sessions.
pub(crate) fn session_deps(config: &Config, watch: bool) -> Result<SessionDeps> {
    Ok(SessionDeps {
        client: open_client(config, watch)?,
        connectivity: Arc::new(FixedConnectivity(!config.offline)),
        fallback: Arc::new(BundledResources::from_file(&config.bundle)),
        busy: Arc::new(NoopBusyIndicator),
    })
}

/// Open the database file as the remote store.
///
/// A database that cannot be read counts as an unreachable store: sessions
/// fall back to the bundle and writes fail.
fn open_client(config: &Config, watch: bool) -> Result<Arc<dyn RemoteDocumentClient>> {
    let mut store = match FileStore::open(&config.database) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!("Failed to open {}: {e}", config.database.display());
            return Ok(Arc::new(UnavailableClient::new(e.to_string())));
        }
    };
    if watch {
        store.watch()?;
    }
    tracing::debug!(
        "Opened {} (offline: {})",
        store.path().display(),
        config.offline
    );
    Ok(Arc::new(store))
}

/// Print snapshots as they arrive.
///
/// Without `watch` only the first snapshot is printed. With it, printing
/// continues until Ctrl-C.
pub(crate) async fn print_snapshots<T>(
    rx: &mut mpsc::UnboundedReceiver<T>,
    watch: bool,
    output: OutputOptions,
    render: impl Fn(&T) -> CommandOutput,
) -> Result<()> {
    if !watch {
        let snapshot = tokio::time::timeout(FIRST_SNAPSHOT_TIMEOUT, rx.recv())
            .await
            .map_err(|_| RescueError::Other("timed out waiting for data".to_string()))?
            .ok_or_else(|| RescueError::Other("session closed before any data arrived".to_string()))?;
        return render(&snapshot).print(output);
    }

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            snapshot = rx.recv() => match snapshot {
                Some(snapshot) => render(&snapshot).print(output)?,
                None => break,
            },
            _ = &mut shutdown => break,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientError;
    use rescue_document::DocPath;
    use tempfile::TempDir;

    fn config_with_database(dir: &TempDir, content: &str) -> Config {
        let database = dir.path().join("database.json");
        std::fs::write(&database, content).unwrap();
        Config {
            database,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_unreadable_database_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let config = config_with_database(&dir, "{ nope");

        let client = open_client(&config, false).unwrap();
        assert!(matches!(
            client.observe(&DocPath::parse("contacts").unwrap()),
            Err(ClientError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_readable_database_is_observed() {
        let dir = TempDir::new().unwrap();
        let config = config_with_database(&dir, r#"{"contacts": {"sections": {"a": "A"}}}"#);

        let client = open_client(&config, false).unwrap();
        let doc = client.fetch_once(&DocPath::parse("contacts/sections").unwrap()).await.unwrap();
        assert_eq!(doc.get("a").and_then(|v| v.as_str()), Some("A"));
    }
}
