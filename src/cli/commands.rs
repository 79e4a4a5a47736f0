//! Command definitions and structures for the CLI
//!
//! All clap-based argument definitions: the main CLI structure and its
//! subcommands.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::fcm::Priority;
use crate::transport::TransportKind;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "fcm-push")]
#[command(about = "Send push notifications through Firebase Cloud Messaging")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Project path for project-level configuration
    #[arg(long, global = true)]
    pub project: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Send one notification to one device
    Send(SendArgs),

    /// Initialize configuration
    Init {
        /// Initialize global configuration (default is project-level)
        #[arg(short, long)]
        global: bool,

        /// Overwrite an existing configuration with defaults
        #[arg(short, long)]
        force: bool,
    },

    /// Configure settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SendArgs {
    /// Device token to deliver to
    #[arg(short, long, env = "FCM_DEVICE_TOKEN")]
    pub token: String,

    /// Text body, sent as the `message` payload field
    #[arg(short, long)]
    pub message: Option<String>,

    /// Extra payload field, may be repeated
    #[arg(short, long = "data", value_name = "KEY=VALUE")]
    pub data: Vec<String>,

    /// Delivery priority (normal or high)
    #[arg(long)]
    pub priority: Option<Priority>,

    #[arg(long)]
    pub collapse_key: Option<String>,

    /// Seconds the gateway keeps the message for an offline device
    #[arg(long, value_name = "SECONDS")]
    pub ttl: Option<u32>,

    #[arg(long)]
    pub content_available: bool,

    /// Ask the gateway to validate without delivering
    #[arg(long)]
    pub dry_run: bool,

    /// Transport override (http or curl)
    #[arg(long)]
    pub transport: Option<TransportKind>,

    /// Read the server key from this file instead of the configuration
    #[arg(long)]
    pub server_key_file: Option<PathBuf>,

    /// Gateway endpoint override
    #[arg(long)]
    pub endpoint: Option<String>,
}

/// Configuration management actions
#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Set configuration value
    Set {
        /// Configuration key (e.g., gateway.transport)
        key: String,
        /// Value to set, empty to clear
        value: String,
    },

    /// Get configuration value
    Get {
        /// Configuration key
        key: String,
    },
}
