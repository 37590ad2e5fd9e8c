//! Configuration management

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,

    /// Base URL of the device hub API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_refresh_interval_ms")]
    pub refresh_interval_ms: u64,

    /// Device shown on the detail and control screens. Those screens are
    /// not mounted without it.
    #[serde(default)]
    pub device_id: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl Config {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }
}

fn default_port() -> u16 {
    8090
}

fn default_api_url() -> String {
    "http://localhost:9090".to_string()
}

fn default_locale() -> String {
    "en".to_string()
}

fn default_refresh_interval_ms() -> u64 {
    3000
}

const APP_DIR_NAME: &str = "devicehub-dashboard";

/// Get config directory (DHD_CONFIG_DIR, XDG_CONFIG_HOME or ~/.config)
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DHD_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join(APP_DIR_NAME);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config").join(APP_DIR_NAME);
    }

    // Fallback to current directory
    PathBuf::from(".")
}

pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir();

    let mut builder = ::config::Config::builder()
        .set_default("port", default_port() as i64)?
        .set_default("api_url", default_api_url())?
        .set_default("locale", default_locale())?
        .set_default("refresh_interval_ms", default_refresh_interval_ms() as i64)?
        // config.toml / config.json / config.yaml, whichever exists
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // DHD_API_URL, DHD_DEVICE_ID, ...
        .add_source(
            ::config::Environment::with_prefix("DHD")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    // Port precedence: DHD_PORT > PORT > config file > default
    if let Ok(port) = std::env::var("DHD_PORT") {
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", port_num as i64)?;
        }
    } else if let Ok(port) = std::env::var("PORT") {
        if let Ok(port_num) = port.parse::<u16>() {
            builder = builder.set_override("port", port_num as i64)?;
        }
    }

    let config: Config = builder.build()?.try_deserialize()?;
    if config.refresh_interval_ms == 0 {
        anyhow::bail!("refresh_interval_ms must be greater than zero");
    }

    Ok(config)
}
