//! Top-level application configuration.
//!
//! Configuration is stored in `.rescue/config.yaml` and includes:
//! - Location of the local document database and the offline bundle
//! - Remote roots of the contacts directory and the comment threads
//! - Whether to force offline mode, and the photo download ceiling

use std::env;
use std::fs;
use std::path::PathBuf;

use rescue_document::DocPath;
use serde::{Deserialize, Serialize};

use crate::blob::DEFAULT_MAX_BLOB_SIZE;
use crate::error::{RescueError, Result};
use crate::screens::{COMMENTS_ROOT, CONTACTS_ROOT};

/// Directory holding configuration and local data.
pub const RESCUE_DIR: &str = ".rescue";

/// Keys accepted by `config get` / `config set`.
pub const VALID_KEYS: &[&str] = &[
    "database",
    "bundle",
    "blobs",
    "contacts_root",
    "comments_root",
    "offline",
    "max_blob_size",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// JSON file backing the local document store
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// JSON bundle of offline fallback documents
    #[serde(default = "default_bundle")]
    pub bundle: PathBuf,

    /// Directory holding downloadable blobs
    #[serde(default = "default_blobs")]
    pub blobs: PathBuf,

    #[serde(default = "default_contacts_root")]
    pub contacts_root: String,

    #[serde(default = "default_comments_root")]
    pub comments_root: String,

    /// Treat the remote store as unreachable (default: false)
    #[serde(default)]
    pub offline: bool,

    /// Largest photo download accepted, in bytes
    #[serde(default = "default_max_blob_size")]
    pub max_blob_size: u64,
}

fn default_database() -> PathBuf {
    PathBuf::from(RESCUE_DIR).join("database.json")
}

fn default_bundle() -> PathBuf {
    PathBuf::from(RESCUE_DIR).join("bundle.json")
}

fn default_blobs() -> PathBuf {
    PathBuf::from(RESCUE_DIR).join("blobs")
}

fn default_contacts_root() -> String {
    CONTACTS_ROOT.to_string()
}

fn default_comments_root() -> String {
    COMMENTS_ROOT.to_string()
}

fn default_max_blob_size() -> u64 {
    DEFAULT_MAX_BLOB_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            bundle: default_bundle(),
            blobs: default_blobs(),
            contacts_root: default_contacts_root(),
            comments_root: default_comments_root(),
            offline: false,
            max_blob_size: default_max_blob_size(),
        }
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        PathBuf::from(RESCUE_DIR).join("config.yaml")
    }

    /// Load configuration from file, or return default if not found.
    /// Environment overrides are applied on top.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from file only, without environment overrides
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            RescueError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {e}", path.display()),
            ))
        })?;
        if content.trim().is_empty() {
            return Ok(Config::default());
        }
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(database) = env::var("RESCUE_DATABASE")
            && !database.is_empty()
        {
            self.database = PathBuf::from(database);
        }
        if let Ok(offline) = env::var("RESCUE_OFFLINE")
            && let Some(flag) = parse_bool(&offline)
        {
            self.offline = flag;
        }
    }

    pub fn contacts_path(&self) -> Result<DocPath> {
        Ok(DocPath::parse(&self.contacts_root)?)
    }

    pub fn comments_path(&self) -> Result<DocPath> {
        Ok(DocPath::parse(&self.comments_root)?)
    }

    /// Read a value by key as display text
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "database" => self.database.display().to_string(),
            "bundle" => self.bundle.display().to_string(),
            "blobs" => self.blobs.display().to_string(),
            "contacts_root" => self.contacts_root.clone(),
            "comments_root" => self.comments_root.clone(),
            "offline" => self.offline.to_string(),
            "max_blob_size" => self.max_blob_size.to_string(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set a value by key, validating it
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "database" => self.database = PathBuf::from(value),
            "bundle" => self.bundle = PathBuf::from(value),
            "blobs" => self.blobs = PathBuf::from(value),
            "contacts_root" => {
                DocPath::parse(value)?;
                self.contacts_root = value.to_string();
            }
            "comments_root" => {
                DocPath::parse(value)?;
                self.comments_root = value.to_string();
            }
            "offline" => {
                self.offline = parse_bool(value).ok_or_else(|| {
                    RescueError::Config(format!("invalid value '{value}' for offline, expected true or false"))
                })?;
            }
            "max_blob_size" => {
                self.max_blob_size = value.parse().map_err(|_| {
                    RescueError::Config(format!(
                        "invalid value '{value}' for max_blob_size, expected a byte count"
                    ))
                })?;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> RescueError {
    RescueError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        VALID_KEYS.join(", ")
    ))
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
