use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use rescue::commands::{
    OutputOptions, cmd_blob, cmd_comment, cmd_comments, cmd_config_get, cmd_config_set,
    cmd_config_show, cmd_contacts,
};

#[derive(Parser)]
#[command(name = "rescue")]
#[command(about = "Emergency contacts and photo comments, kept in sync")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the emergency contacts directory
    Contacts {
        /// Keep running and print every update
        #[arg(short, long)]
        watch: bool,
    },

    /// Show the validated comments of a photo
    Comments {
        /// Photo ID
        photo_id: String,

        /// Keep running and print every update
        #[arg(short, long)]
        watch: bool,
    },

    /// Submit a comment on a photo
    Comment {
        /// Photo ID
        photo_id: String,

        /// Comment text
        #[arg(trailing_var_arg = true, required = true)]
        text: Vec<String>,
    },

    /// Download a blob and report its size
    Blob {
        /// Path below the blob directory
        path: String,

        /// Size limit in bytes (default: max_blob_size from config)
        #[arg(long)]
        max_size: Option<u64>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// Value to set
        value: String,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("RESCUE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let output = OutputOptions { json: cli.json };

    let result = match cli.command {
        Commands::Contacts { watch } => cmd_contacts(watch, output).await,
        Commands::Comments { photo_id, watch } => cmd_comments(&photo_id, watch, output).await,
        Commands::Comment { photo_id, text } => cmd_comment(&photo_id, &text, output).await,
        Commands::Blob { path, max_size } => cmd_blob(&path, max_size, output).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd_config_show(output),
            ConfigAction::Get { key } => cmd_config_get(&key, output),
            ConfigAction::Set { key, value } => cmd_config_set(&key, &value, output),
        },
    };

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}
