use crate::errors::{AppError, AppResult, ErrorContextExt};
use crate::fcm::{read_server_key, Firebase, ServerKey, DEFAULT_ENDPOINT};
use crate::transport::TransportKind;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the configured server key
pub const SERVER_KEY_ENV: &str = "FCM_SERVER_KEY";

/// User agent sent when `gateway.user_agent` is unset
pub const DEFAULT_USER_AGENT: &str = concat!("fcm-push/", env!("CARGO_PKG_VERSION"));

const CONFIG_DIR: &str = ".fcm-push";
const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure for fcm-push
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Literal server key; prefer `server_key_path` so the key stays out of the config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_key_path: Option<PathBuf>,
    #[serde(default)]
    pub transport: TransportKind,
    /// Request timeout; unset leaves the transport default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Unset sends [`DEFAULT_USER_AGENT`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Also write logs to a daily rolling file at this path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            server_key: None,
            server_key_path: None,
            transport: TransportKind::default(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_path: None,
        }
    }
}

impl GatewayConfig {
    /// Resolve the server key: environment, then literal key, then key file
    pub fn resolve_server_key(&self) -> AppResult<ServerKey> {
        self.resolve_server_key_with(std::env::var(SERVER_KEY_ENV).ok())
    }

    fn resolve_server_key_with(&self, env_value: Option<String>) -> AppResult<ServerKey> {
        if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
            return Ok(ServerKey::new(key.trim()));
        }
        if let Some(key) = self.server_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(ServerKey::new(key.trim()));
        }
        if let Some(path) = &self.server_key_path {
            return Ok(read_server_key(path)?);
        }
        Err(AppError::MissingServerKey {
            env_var: SERVER_KEY_ENV.to_string(),
        })
    }

    /// Configured user agent, or the built-in one when unset
    pub fn effective_user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string())
    }

    /// Build a client from these settings with the resolved server key
    pub fn build_client(&self) -> AppResult<Firebase> {
        self.build_client_with_key(self.resolve_server_key()?)
    }

    pub fn build_client_with_key(&self, server_key: ServerKey) -> AppResult<Firebase> {
        let mut builder = Firebase::builder(server_key)
            .endpoint(self.endpoint.clone())
            .transport(self.transport);

        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        builder = builder.user_agent(self.effective_user_agent());

        Ok(builder.build()?)
    }
}

impl Config {
    /// Keys understood by [`Config::get_value`] and [`Config::set_value`]
    pub const KEYS: &'static [&'static str] = &[
        "gateway.endpoint",
        "gateway.server_key",
        "gateway.server_key_path",
        "gateway.transport",
        "gateway.timeout_secs",
        "gateway.user_agent",
        "logging.level",
        "logging.log_path",
    ];

    /// Read one setting as text; the literal server key is redacted
    pub fn get_value(&self, key: &str) -> AppResult<String> {
        let value = match key {
            "gateway.endpoint" => self.gateway.endpoint.clone(),
            "gateway.server_key" => redact(self.gateway.server_key.as_deref()),
            "gateway.server_key_path" => display_path(self.gateway.server_key_path.as_deref()),
            "gateway.transport" => self.gateway.transport.to_string(),
            "gateway.timeout_secs" => self
                .gateway
                .timeout_secs
                .map(|s| s.to_string())
                .unwrap_or_else(|| "None".to_string()),
            "gateway.user_agent" => self.gateway.user_agent.clone().unwrap_or_else(|| "None".to_string()),
            "logging.level" => self.logging.level.clone(),
            "logging.log_path" => display_path(self.logging.log_path.as_deref()),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Update one setting from text; an empty value clears optional settings
    pub fn set_value(&mut self, key: &str, value: &str) -> AppResult<()> {
        match key {
            "gateway.endpoint" => {
                url::Url::parse(value)
                    .map_err(|e| AppError::InvalidConfigValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        source: Some(Box::new(e)),
                    })?;
                self.gateway.endpoint = value.to_string();
            }
            "gateway.server_key" => self.gateway.server_key = optional(value),
            "gateway.server_key_path" => self.gateway.server_key_path = optional(value).map(PathBuf::from),
            "gateway.transport" => {
                self.gateway.transport = value
                    .parse()
                    .map_err(|_| AppError::invalid_config_value(key, value))?;
            }
            "gateway.timeout_secs" => {
                self.gateway.timeout_secs = match optional(value) {
                    Some(v) => Some(v.parse::<u64>().with_context(format!("Invalid value for '{}'", key))?),
                    None => None,
                };
            }
            "gateway.user_agent" => self.gateway.user_agent = optional(value),
            "logging.level" => {
                value
                    .parse::<tracing::Level>()
                    .map_err(|_| AppError::invalid_config_value(key, value))?;
                self.logging.level = value.to_string();
            }
            "logging.log_path" => self.logging.log_path = optional(value).map(PathBuf::from),
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }

    /// Configuration as TOML with the literal server key redacted
    pub fn to_redacted_toml(&self) -> AppResult<String> {
        let mut shown = self.clone();
        if shown.gateway.server_key.is_some() {
            shown.gateway.server_key = Some(redact(shown.gateway.server_key.as_deref()));
        }
        toml::to_string_pretty(&shown).map_err(|e| AppError::config_with_source("Failed to serialize config", e))
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn redact(value: Option<&str>) -> String {
    match value {
        Some(_) => "<redacted>".to_string(),
        None => "None".to_string(),
    }
}

fn display_path(path: Option<&Path>) -> String {
    path.map(|p| p.display().to_string())
        .unwrap_or_else(|| "None".to_string())
}

fn unknown_key(key: &str) -> AppError {
    AppError::config(format!(
        "Unknown configuration key: {}. Valid keys are: {}",
        key,
        Config::KEYS.join(", ")
    ))
}

/// Configuration manager for fcm-push
///
/// Handles loading and saving project-level and global configuration.
/// Project configuration takes precedence over the global one.
///
/// # Configuration Hierarchy
///
/// 1. **Project-level**: `.fcm-push/config.toml` in the project root
/// 2. **Global**: `~/.fcm-push/config.toml` in the user home directory
///
/// # Example
///
/// ```rust,no_run
/// use fcm_push::config::ConfigManager;
/// use std::path::PathBuf;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config_manager = ConfigManager::new(Some(PathBuf::from("/path/to/project")))?;
///     println!("Endpoint: {}", config_manager.config().gateway.endpoint);
///     Ok(())
/// }
/// ```
pub struct ConfigManager {
    config_path: PathBuf,
    config: Config,
}

impl ConfigManager {
    /// Creates a new ConfigManager instance
    ///
    /// With a project path, the project configuration is used if it exists,
    /// then the global one, and otherwise defaults bound to the project path.
    /// Without a project path the global configuration is used. Nothing is
    /// written until [`save()`](Self::save) is called.
    pub fn new(project_path: Option<PathBuf>) -> AppResult<Self> {
        if let Some(ref path) = project_path {
            let project_config_path = Self::get_config_path(Some(path.clone()))?;
            if project_config_path.exists() {
                return Self::open(project_config_path);
            }

            let global_config_path = Self::get_config_path(None)?;
            if global_config_path.exists() {
                return Self::open(global_config_path);
            }

            Self::open(project_config_path)
        } else {
            Self::open(Self::get_config_path(None)?)
        }
    }

    /// Always uses the project-level configuration, even if a global one exists
    pub fn new_project_config(project_path: PathBuf) -> AppResult<Self> {
        Self::open(Self::get_config_path(Some(project_path))?)
    }

    pub fn get_config_path(project_path: Option<PathBuf>) -> AppResult<PathBuf> {
        let base_path = if let Some(path) = project_path {
            path.join(CONFIG_DIR)
        } else {
            let base_dirs = BaseDirs::new().ok_or_else(|| AppError::config("Failed to get base directories"))?;
            base_dirs.home_dir().join(CONFIG_DIR)
        };
        Ok(base_path.join(CONFIG_FILE))
    }

    fn open(config_path: PathBuf) -> AppResult<Self> {
        let config = Self::load_or_default(&config_path)?;
        Ok(Self { config_path, config })
    }

    fn load_or_default(path: &Path) -> AppResult<Config> {
        if path.exists() {
            let content = fs::read_to_string(path).in_file_operation(path, "read config file")?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Config::default())
        }
    }

    /// Writes the configuration to its file, creating the directory if needed
    pub fn save(&self) -> AppResult<()> {
        if let Some(dir) = self.config_path.parent() {
            fs::create_dir_all(dir).in_file_operation(dir, "create config directory")?;
        }
        let content = toml::to_string_pretty(&self.config)
            .map_err(|e| AppError::config_with_source("Failed to serialize config", e))?;
        fs::write(&self.config_path, content).in_file_operation(&self.config_path, "write config file")?;
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Call [`save()`](Self::save) afterwards to persist changes
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Replace the loaded configuration with defaults (not saved)
    pub fn reset(&mut self) {
        self.config = Config::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config_roundtrip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
        assert_eq!(parsed.gateway.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(parsed.gateway.transport, TransportKind::Http);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let parsed: Config = toml::from_str("[gateway]\ntransport = \"curl\"\n").unwrap();
        assert_eq!(parsed.gateway.transport, TransportKind::Curl);
        assert_eq!(parsed.gateway.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(parsed.logging.level, "info");
    }

    #[test]
    fn test_manager_writes_only_on_save() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();

        let expected = temp_dir.path().join(".fcm-push").join("config.toml");
        assert_eq!(manager.config_path(), expected.as_path());
        assert_eq!(manager.config(), &Config::default());
        assert!(!expected.exists());

        manager.save().unwrap();
        assert!(expected.exists());
    }

    #[test]
    fn test_manager_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        manager.config_mut().set_value("gateway.transport", "curl").unwrap();
        manager.config_mut().set_value("gateway.timeout_secs", "15").unwrap();
        manager.save().unwrap();

        let reloaded = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.config().gateway.transport, TransportKind::Curl);
        assert_eq!(reloaded.config().gateway.timeout_secs, Some(15));
    }

    #[test]
    fn test_cleared_user_agent_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        manager.config_mut().set_value("gateway.user_agent", "custom-agent/1.0").unwrap();
        manager.save().unwrap();

        let reloaded = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.config().gateway.user_agent.as_deref(), Some("custom-agent/1.0"));

        let mut manager = reloaded;
        manager.config_mut().set_value("gateway.user_agent", "").unwrap();
        manager.save().unwrap();

        let reloaded = ConfigManager::new_project_config(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(reloaded.config().gateway.user_agent, None);
        assert_eq!(reloaded.config().get_value("gateway.user_agent").unwrap(), "None");
        assert_eq!(reloaded.config().gateway.effective_user_agent(), DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_set_value_validation() {
        let mut config = Config::default();
        assert!(config.set_value("gateway.endpoint", "not a url").is_err());
        assert!(config.set_value("gateway.transport", "pigeon").is_err());
        assert!(config.set_value("gateway.timeout_secs", "soon").is_err());
        assert!(config.set_value("logging.level", "loud").is_err());
        assert!(config.set_value("gateway.unknown", "x").is_err());

        config.set_value("gateway.timeout_secs", "").unwrap();
        assert_eq!(config.gateway.timeout_secs, None);
    }

    #[test]
    fn test_server_key_is_redacted() {
        let mut config = Config::default();
        config.set_value("gateway.server_key", "very-secret").unwrap();

        assert_eq!(config.get_value("gateway.server_key").unwrap(), "<redacted>");
        let shown = config.to_redacted_toml().unwrap();
        assert!(!shown.contains("very-secret"));
        assert_eq!(config.gateway.server_key.as_deref(), Some("very-secret"));
    }

    #[test]
    fn test_server_key_resolution_order() {
        let mut key_file = NamedTempFile::new().unwrap();
        writeln!(key_file, "from-file").unwrap();

        let mut gateway = GatewayConfig {
            server_key_path: Some(key_file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(gateway.resolve_server_key_with(None).unwrap().as_str(), "from-file");

        gateway.server_key = Some("literal".to_string());
        assert_eq!(gateway.resolve_server_key_with(None).unwrap().as_str(), "literal");

        let from_env = gateway.resolve_server_key_with(Some("from-env".to_string())).unwrap();
        assert_eq!(from_env.as_str(), "from-env");
    }

    #[test]
    fn test_missing_server_key() {
        let gateway = GatewayConfig::default();
        assert!(matches!(
            gateway.resolve_server_key_with(None),
            Err(AppError::MissingServerKey { .. })
        ));

        let gateway = GatewayConfig {
            server_key_path: Some(PathBuf::from("/this/path/does/not/exist")),
            ..Default::default()
        };
        assert!(matches!(
            gateway.resolve_server_key_with(None),
            Err(AppError::Firebase(crate::fcm::FirebaseError::KeyFile { .. }))
        ));
    }

    #[test]
    fn test_build_client_from_config() {
        let gateway = GatewayConfig {
            endpoint: "http://127.0.0.1:9/fcm/send".to_string(),
            transport: TransportKind::Curl,
            timeout_secs: Some(3),
            ..Default::default()
        };
        let client = gateway.build_client_with_key(ServerKey::new("K")).unwrap();
        assert_eq!(client.endpoint(), "http://127.0.0.1:9/fcm/send");
        assert_eq!(client.transport_name(), "curl");
    }
}
