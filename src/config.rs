//! Configuration management module.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

impl From<ConfigError> for crate::AppError {
    fn from(e: ConfigError) -> Self {
        crate::AppError::Config(e.to_string())
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// Which document store backs the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    #[default]
    Postgres,
    /// Volatile, for demos and offline use.
    Memory,
}

/// Document store settings. Connection fields apply to PostgreSQL only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Which authentication provider signs users in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthBackend {
    #[default]
    IdentityToolkit,
    Local,
}

/// Authentication settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub provider: AuthBackend,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_auth_endpoint")]
    pub endpoint: String,
    /// When set, sign-up only accepts `<local>@<email_domain>` addresses.
    #[serde(default)]
    pub email_domain: Option<String>,
}

fn default_auth_endpoint() -> String {
    "https://identitytoolkit.googleapis.com/v1".to_string()
}

/// UI preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// How long success/error banners stay visible.
    #[serde(default = "default_notification_secs")]
    pub notification_secs: u64,
}

fn default_page_size() -> usize {
    crate::listing::DEFAULT_PAGE_SIZE
}

fn default_notification_secs() -> u64 {
    4
}

impl AppConfig {
    /// Config file in the platform config directory, or next to the
    /// executable when no home directory is available.
    pub fn default_path() -> PathBuf {
        match project_dirs() {
            Some(dirs) => dirs.config_dir().join("config.toml"),
            None => std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()))
                .unwrap_or_else(|| PathBuf::from("."))
                .join("config.toml"),
        }
    }

    /// Directory for rolling log files.
    pub fn log_dir() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_local_dir().join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<AppConfig>(&content) {
                Ok(config) => match config.validate() {
                    Ok(()) => ConfigLoadResult::Loaded(config),
                    Err(e) => ConfigLoadResult::Invalid(e),
                },
                Err(e) => ConfigLoadResult::Invalid(ConfigError::Parse(e)),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Settings for running without any remote service.
    pub fn offline() -> Self {
        let mut config = Self::default();
        config.store.backend = StoreBackend::Memory;
        config.auth.provider = AuthBackend::Local;
        config
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend == StoreBackend::Postgres {
            if self.store.host.trim().is_empty() {
                return Err(ConfigError::Validation("Database host cannot be empty".to_string()));
            }
            if self.store.port == 0 {
                return Err(ConfigError::Validation(
                    "Database port must be greater than 0".to_string(),
                ));
            }
            if self.store.name.trim().is_empty() {
                return Err(ConfigError::Validation("Database name cannot be empty".to_string()));
            }
        }
        if self.auth.provider == AuthBackend::IdentityToolkit {
            if self.auth.api_key.trim().is_empty() {
                return Err(ConfigError::Validation("Auth API key cannot be empty".to_string()));
            }
            if !self.auth.endpoint.starts_with("http") {
                return Err(ConfigError::Validation(
                    "Auth endpoint must start with http:// or https://".to_string(),
                ));
            }
        }
        if let Some(domain) = &self.auth.email_domain
            && (domain.trim().is_empty() || domain.contains('@'))
        {
            return Err(ConfigError::Validation(
                "Email domain must be a bare domain such as example.com".to_string(),
            ));
        }
        if !(1..=100).contains(&self.ui.page_size) {
            return Err(ConfigError::Validation("Page size must be between 1 and 100".to_string()));
        }
        if self.ui.notification_secs == 0 {
            return Err(ConfigError::Validation(
                "Notification duration must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "gianged", "gianged-hr")
}

impl StoreConfig {
    /// Build connection string for SeaORM.
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.name
        )
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Postgres,
            host: "localhost".to_string(),
            port: 5432,
            name: "gianged_hr".to_string(),
            username: "postgres".to_string(),
            password: String::new(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            provider: AuthBackend::Local,
            api_key: String::new(),
            endpoint: default_auth_endpoint(),
            email_domain: None,
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            notification_secs: default_notification_secs(),
        }
    }
}
