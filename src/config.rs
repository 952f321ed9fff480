use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_WEBHOOK_COLOR, DEFAULT_WEBHOOK_FOOTER, SHOP_BASE_URL, WEBHOOK_ENV_VAR};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config deserialized from `config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub proxies: ProxyConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub shop: ShopConfig,
}

/// Poll cadence and retry delays, all in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Wait after a detected restock before reloading the catalog.
    #[serde(default = "default_restock_delay")]
    pub restock_delay_ms: u64,
    /// Steady-state interval between monitor cycles.
    #[serde(default = "default_monitor_delay")]
    pub monitor_delay_ms: u64,
    /// Wait before retrying any failed request.
    #[serde(default = "default_error_delay")]
    pub error_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub use_proxies: bool,
    /// Newline-delimited `host:port` or `host:port:user:pass` entries.
    #[serde(default = "default_proxy_file")]
    pub proxy_file: PathBuf,
}

/// Restock notification channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Webhook URL. Empty disables the Discord sink.
    #[serde(default)]
    pub webhook: String,
    #[serde(default = "default_footer")]
    pub footer: String,
    #[serde(default = "default_color")]
    pub color: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_restock_delay() -> u64 {
    1000
}

fn default_monitor_delay() -> u64 {
    1000
}

fn default_error_delay() -> u64 {
    1500
}

fn default_proxy_file() -> PathBuf {
    PathBuf::from("proxies.txt")
}

fn default_footer() -> String {
    DEFAULT_WEBHOOK_FOOTER.to_string()
}

fn default_color() -> u32 {
    DEFAULT_WEBHOOK_COLOR
}

fn default_base_url() -> String {
    SHOP_BASE_URL.to_string()
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            restock_delay_ms: default_restock_delay(),
            monitor_delay_ms: default_monitor_delay(),
            error_delay_ms: default_error_delay(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            use_proxies: false,
            proxy_file: default_proxy_file(),
        }
    }
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook: String::new(),
            footer: default_footer(),
            color: default_color(),
        }
    }
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

impl MonitorConfig {
    pub fn restock_delay(&self) -> Duration {
        Duration::from_millis(self.restock_delay_ms)
    }

    pub fn monitor_delay(&self) -> Duration {
        Duration::from_millis(self.monitor_delay_ms)
    }

    pub fn error_delay(&self) -> Duration {
        Duration::from_millis(self.error_delay_ms)
    }
}

impl AppConfig {
    /// Load config from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Write config to the given TOML file path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("failed to serialize config")?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }

    /// Override the webhook URL from `RESTOCK_WEBHOOK_URL` when it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(WEBHOOK_ENV_VAR) {
            if !url.trim().is_empty() {
                self.discord.webhook = url.trim().to_string();
            }
        }
    }

    /// Normalized shop base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        self.shop.base_url.trim_end_matches('/')
    }
}
