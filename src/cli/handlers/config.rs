//! Configuration management handler
//!
//! Handles `init` and the `config show|get|set` commands.

use super::super::{CliContext, ConfigAction};
use crate::config::ConfigManager;
use anyhow::Result;
use std::path::PathBuf;

/// Handler for configuration operations
pub struct ConfigHandler<'a> {
    context: &'a CliContext,
}

impl<'a> ConfigHandler<'a> {
    pub fn new(context: &'a CliContext) -> Self {
        Self { context }
    }

    /// Handle configuration initialization
    pub async fn handle_init(&self, global: bool, force: bool) -> Result<()> {
        let mut config_manager = if global {
            ConfigManager::new(None)?
        } else {
            // Project init always targets the project file, even when a global one exists
            let path = self.context.project_path.clone().unwrap_or_else(|| PathBuf::from("."));
            ConfigManager::new_project_config(path)?
        };

        let config_path = config_manager.config_path().to_path_buf();
        if config_path.exists() && !force {
            println!("Configuration already initialized at: {}", config_path.display());
            println!("Use --force to overwrite");
            return Ok(());
        }

        if force {
            config_manager.reset();
        }
        config_manager.save()?;
        tracing::info!(path = %config_path.display(), "Configuration written");
        println!("Configuration initialized successfully at: {}", config_path.display());
        println!(
            "Set gateway.server_key_path (or {}) before sending",
            crate::config::SERVER_KEY_ENV
        );

        Ok(())
    }

    /// Handle configuration management
    pub async fn handle_config(&self, action: ConfigAction) -> Result<()> {
        let mut config_manager = ConfigManager::new(self.context.project_path.clone())?;

        match action {
            ConfigAction::Show => {
                println!("# {}", config_manager.config_path().display());
                println!("{}", config_manager.config().to_redacted_toml()?);
            }
            ConfigAction::Set { key, value } => {
                config_manager.config_mut().set_value(&key, &value)?;
                config_manager.save()?;
                let shown = config_manager.config().get_value(&key)?;
                println!("Configuration updated: {key} = {shown}");
            }
            ConfigAction::Get { key } => {
                println!("{}", config_manager.config().get_value(&key)?);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context_for(dir: &TempDir) -> CliContext {
        CliContext::new(Some(dir.path().to_path_buf()), false).unwrap()
    }

    #[tokio::test]
    async fn test_init_creates_project_config() {
        let temp_dir = TempDir::new().unwrap();
        let context = context_for(&temp_dir);

        ConfigHandler::new(&context).handle_init(false, false).await.unwrap();

        assert!(temp_dir.path().join(".fcm-push").join("config.toml").exists());
    }

    #[tokio::test]
    async fn test_init_force_resets_existing_values() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        manager.config_mut().set_value("gateway.transport", "curl").unwrap();
        manager.save().unwrap();

        let context = context_for(&temp_dir);
        ConfigHandler::new(&context).handle_init(false, false).await.unwrap();
        let kept = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(kept.config().gateway.transport.to_string(), "curl");

        ConfigHandler::new(&context).handle_init(false, true).await.unwrap();
        let reset = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(reset.config().gateway.transport.to_string(), "http");
    }

    #[tokio::test]
    async fn test_set_unknown_key_fails() {
        let temp_dir = TempDir::new().unwrap();
        let context = context_for(&temp_dir);

        let result = ConfigHandler::new(&context)
            .handle_config(ConfigAction::Set {
                key: "gateway.pigeon".to_string(),
                value: "yes".to_string(),
            })
            .await;

        assert!(result.is_err());
        assert!(!temp_dir.path().join(".fcm-push").join("config.toml").exists());
    }
}
