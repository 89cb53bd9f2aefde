pub mod alerting;
pub mod config;
pub mod extract;
pub mod metrics;
pub mod notifiers;
pub mod provisioning;
pub mod registry;
pub mod transport;

use thiserror::Error;

pub use alerting::{AlertState, EvalContext, EvalMatch, Rule, RuleLink};
pub use notifiers::{dispatch, AlertPayload, AlertmanagerNotifier, Notifier, NotifierConfig};
pub use registry::{register_builtin_notifiers, NotifierPlugin, NotifierRegistry};
pub use transport::{HttpWebhookSender, WebhookRequest, WebhookSender};

#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Webhook response status {status}: {body}")]
    Webhook { status: u16, body: String },
    #[error("Notification cancelled")]
    Cancelled,
    #[error("Rule URL error: {0}")]
    RuleUrl(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
