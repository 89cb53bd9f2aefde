use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;

use crate::notifiers::{NotifierConfig, NOTIFIER_TYPE};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub notifier: NotifierSettings,
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierSettings {
    pub name: String,
    /// Alertmanager base address, without the `/api/v1/alerts` suffix
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alertmanager_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provisioning_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl WebhookConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Config {
    pub fn load() -> crate::Result<Self> {
        // Load environment variables from .env file if it exists
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = match lookup("WEBHOOK_TIMEOUT_SECS") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                crate::Error::Config(format!("WEBHOOK_TIMEOUT_SECS must be a number of seconds, got '{}'", raw))
            })?),
            None => None,
        };

        let config = Config {
            notifier: NotifierSettings {
                name: lookup("NOTIFIER_NAME").unwrap_or_else(|| "alertmanager".to_string()),
                alertmanager_url: lookup("ALERTMANAGER_URL").filter(|url| !url.is_empty()),
                provisioning_path: lookup("NOTIFIER_PROVISIONING_PATH").map(PathBuf::from),
            },
            webhook: WebhookConfig { timeout_secs },
        };

        if config.notifier.alertmanager_url.is_none() && config.notifier.provisioning_path.is_none() {
            tracing::warn!("Neither ALERTMANAGER_URL nor NOTIFIER_PROVISIONING_PATH is set.");
        }

        Ok(config)
    }

    /// Notifier definition for the directly configured Alertmanager, if any
    pub fn notifier_config(&self) -> Option<NotifierConfig> {
        self.notifier.alertmanager_url.as_ref().map(|url| {
            NotifierConfig::new(&self.notifier.name, NOTIFIER_TYPE, json!({ "url": url }))
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notifier: NotifierSettings {
                name: "alertmanager".to_string(),
                alertmanager_url: None,
                provisioning_path: None,
            },
            webhook: WebhookConfig::default(),
        }
    }
}
