mod alertmanager;

pub use alertmanager::{new_alertmanager_notifier, AlertPayload, AlertmanagerNotifier, NOTIFIER_TYPE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{
    alerting::EvalContext,
    metrics::{record_notification, Outcome},
    Result,
};

/// Persisted configuration of one notifier instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifierConfig {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub notifier_type: String,
    #[serde(default)]
    pub is_default: bool,
    /// Type specific settings, e.g. `url` for Alertmanager
    #[serde(default)]
    pub settings: Value,
}

impl NotifierConfig {
    pub fn new(name: &str, notifier_type: &str, settings: Value) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            notifier_type: notifier_type.to_string(),
            is_default: false,
            settings,
        }
    }

    pub fn setting_str(&self, key: &str) -> Option<&str> {
        self.settings.get(key).and_then(|v| v.as_str())
    }
}

/// Identity shared by every notifier implementation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifierBase {
    pub id: i64,
    pub name: String,
    pub notifier_type: String,
    pub is_default: bool,
}

impl From<&NotifierConfig> for NotifierBase {
    fn from(config: &NotifierConfig) -> Self {
        Self {
            id: config.id,
            name: config.name.clone(),
            notifier_type: config.notifier_type.clone(),
            is_default: config.is_default,
        }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;
    fn notifier_type(&self) -> &str;
    fn is_default(&self) -> bool;
    fn should_notify(&self, ctx: &EvalContext) -> bool;
    /// Delivers the evaluation. Callers check `should_notify` first.
    async fn notify(&self, ctx: &EvalContext) -> Result<()>;
}

/// Runs one evaluation through a notifier. Returns `false` when the notifier
/// chose not to fire, in which case no payload is built.
pub async fn dispatch(notifier: &dyn Notifier, ctx: &EvalContext) -> Result<bool> {
    if !notifier.should_notify(ctx) {
        debug!(
            "Skipping notifier '{}' for rule '{}' in state {}",
            notifier.name(),
            ctx.rule.name,
            ctx.rule.state
        );
        record_notification(notifier.name(), Outcome::Suppressed);
        return Ok(false);
    }

    match notifier.notify(ctx).await {
        Ok(()) => {
            record_notification(notifier.name(), Outcome::Sent);
            Ok(true)
        }
        Err(e) => {
            record_notification(notifier.name(), Outcome::Failed);
            Err(e)
        }
    }
}
