use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use zoomlion_auth::{ClientSettings, ProviderOptions};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP transport towards Zoomlion
    #[serde(default)]
    pub client: ClientSettings,
    /// Login orchestration switches
    #[serde(default)]
    pub provider: ProviderOptions,
    /// Where the provider config and its secrets are kept
    #[serde(default)]
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        if self.client.request_timeout.is_zero() {
            return Err("client.request_timeout must be > 0".into());
        }
        if self.client.user_agent.trim().is_empty() {
            return Err("client.user_agent must not be empty".into());
        }
        if url::Url::parse(&self.client.redirect_uri).is_err() {
            return Err(format!(
                "client.redirect_uri is not a valid URL: {}",
                self.client.redirect_uri
            ));
        }
        if self.store.config_file.as_os_str().is_empty() {
            return Err("store.config_file must not be empty".into());
        }
        if self.store.secrets_dir.as_os_str().is_empty() {
            return Err("store.secrets_dir must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// TOML file holding the applied provider config
    #[serde(default = "default_config_file")]
    pub config_file: PathBuf,
    /// Directory with one file per stored secret
    #[serde(default = "default_secrets_dir")]
    pub secrets_dir: PathBuf,
}
fn default_config_file() -> PathBuf {
    PathBuf::from(".zoomlion/provider.toml")
}
fn default_secrets_dir() -> PathBuf {
    PathBuf::from(".zoomlion/secrets")
}
impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            secrets_dir: default_secrets_dir(),
        }
    }
}

pub mod loader {
    use super::AppConfig;
    use config::{Config, Environment, File};
    use std::path::PathBuf;

    /// Default config file looked up in the working directory.
    pub const DEFAULT_CONFIG_FILE: &str = "zoomlion.toml";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        } else if path.is_some() {
            return Err(format!("config file not found: {}", pathbuf.display()));
        }
        // Environment variable overrides, e.g., ZOOMLION__LOGGING__LEVEL=debug
        builder = builder.add_source(
            Environment::with_prefix("ZOOMLION")
                .try_parsing(true)
                .separator("__"),
        );
        let cfg = builder
            .build()
            .map_err(|e| format!("config build error: {e}"))?;
        let merged: AppConfig = cfg
            .try_deserialize()
            .map_err(|e| format!("config deserialize error: {e}"))?;
        merged.validate()?;
        Ok(merged)
    }
}
