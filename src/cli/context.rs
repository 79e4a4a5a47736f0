//! CLI Context for dependency injection and shared state
//!
//! Centralizes configuration loading and logging setup for the handlers.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigManager;

/// CLI execution context containing shared dependencies and configuration
#[derive(Clone)]
pub struct CliContext {
    pub project_path: Option<PathBuf>,
    pub verbose: bool,
    pub config_manager: Arc<ConfigManager>,
}

impl CliContext {
    pub fn new(project_path: Option<PathBuf>, verbose: bool) -> Result<Self> {
        let resolved_project_path = Self::resolve_project_path(project_path);
        let config_manager = Arc::new(ConfigManager::new(resolved_project_path.clone())?);

        Ok(Self {
            project_path: resolved_project_path,
            verbose,
            config_manager,
        })
    }

    /// Auto-detect project path by looking for .fcm-push/config.toml
    fn resolve_project_path(project_path: Option<PathBuf>) -> Option<PathBuf> {
        if let Some(path) = project_path {
            return Some(path);
        }

        if let Ok(current_dir) = std::env::current_dir() {
            if current_dir.join(".fcm-push").join("config.toml").exists() {
                return Some(current_dir);
            }
        }

        None
    }

    /// Initialize logging from verbosity and configuration
    ///
    /// Logs go to stderr. When `logging.log_path` is set a daily rolling file
    /// layer is added; the returned guard must be kept alive until exit.
    pub fn init_logging(&self) -> Result<Option<WorkerGuard>> {
        let logging = &self.config_manager.config().logging;
        let log_level = if self.verbose { "debug" } else { logging.level.as_str() };

        let env_filter = EnvFilter::from_default_env()
            .add_directive(log_level.parse().unwrap_or_else(|_| tracing::Level::INFO.into()));
        let console_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        let guard = match &logging.log_path {
            Some(log_path) => {
                let dir = log_path.parent().unwrap_or_else(|| Path::new("."));
                std::fs::create_dir_all(dir).context("Failed to create log directory")?;

                let file_name = log_path
                    .file_name()
                    .unwrap_or_else(|| std::ffi::OsStr::new("fcm-push.log"));
                let file_appender = tracing_appender::rolling::daily(dir, file_name);
                let (file_writer, guard) = tracing_appender::non_blocking(file_appender);
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false);

                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .with(file_layer)
                    .init();
                Some(guard)
            }
            None => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(console_layer)
                    .init();
                None
            }
        };

        if self.verbose {
            tracing::debug!("Verbose logging enabled");
            tracing::debug!("Project path: {:?}", self.project_path);
            tracing::debug!("Config path: {}", self.config_manager.config_path().display());
        }

        Ok(guard)
    }
}
