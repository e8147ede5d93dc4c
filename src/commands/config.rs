//! Configuration commands for managing Rescue settings.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print a single value
//! - `config set`: Set a configuration value

use owo_colors::OwoColorize;
use serde_json::json;

use super::{CommandOutput, OutputOptions};
use crate::config::{Config, VALID_KEYS};
use crate::error::Result;

/// Show current configuration, environment overrides included
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;

    let mut json_output = serde_json::to_value(&config)?;
    json_output["config_file"] = json!(Config::config_path().to_string_lossy());

    let mut text_output = format!("{}\n\n", "Configuration:".cyan().bold());
    for key in VALID_KEYS {
        text_output.push_str(&format!("{}: {}\n", key.cyan(), config.get(key)?));
    }
    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Print one configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get(key)?;

    CommandOutput::new(json!({ "key": key, "value": value }))
        .with_text(value)
        .print(output)
}

/// Set a configuration value
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    // environment overrides must not leak into the saved file
    let mut config = Config::load_file()?;
    config.set(key, value)?;
    config.save()?;

    CommandOutput::new(json!({
        "action": "config_set",
        "key": key,
        "value": value,
        "success": true,
    }))
    .with_text(format!("Set {} = {}", key.cyan(), value))
    .print(output)
}
