//! Command handlers for all CLI operations
//!
//! Routes parsed commands to the handler owning each concern.

pub mod config;
pub mod send;

use super::{CliContext, Commands};
use anyhow::Result;

pub use config::ConfigHandler;
pub use send::SendHandler;

/// Coordinates all command handling operations with dependency injection via CliContext
pub struct CommandHandler {
    context: CliContext,
}

impl CommandHandler {
    pub fn new(context: CliContext) -> Self {
        Self { context }
    }

    /// Route commands to their appropriate handlers
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Send(args) => SendHandler::new(&self.context).handle_send(args).await,
            Commands::Init { global, force } => {
                ConfigHandler::new(&self.context).handle_init(global, force).await
            }
            Commands::Config { action } => ConfigHandler::new(&self.context).handle_config(action).await,
        }
    }
}
