//! Notifier definitions provisioned from a YAML file:
//!
//! ```yaml
//! notifiers:
//!   - name: ops-alertmanager
//!     type: prometheus-alertmanager
//!     isDefault: true
//!     settings:
//!       url: http://localhost:9093
//! ```

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::{
    notifiers::{Notifier, NotifierConfig},
    registry::NotifierRegistry,
    transport::WebhookSender,
    Error, Result,
};

#[derive(Debug, Deserialize)]
pub struct ProvisioningFile {
    #[serde(default)]
    pub notifiers: Vec<NotifierConfig>,
}

pub fn parse_notifiers(yaml: &str) -> Result<Vec<NotifierConfig>> {
    let file: ProvisioningFile = serde_yaml::from_str(yaml)?;

    let mut seen = HashSet::new();
    for config in &file.notifiers {
        if !seen.insert(config.name.as_str()) {
            return Err(Error::Config(format!(
                "Notifier '{}' is defined more than once",
                config.name
            )));
        }
    }

    Ok(file.notifiers)
}

pub fn load_notifiers(path: &Path) -> Result<Vec<NotifierConfig>> {
    let contents = std::fs::read_to_string(path)?;
    let notifiers = parse_notifiers(&contents)?;
    info!("Loaded {} notifier(s) from {}", notifiers.len(), path.display());
    Ok(notifiers)
}

pub fn build_notifiers(
    registry: &NotifierRegistry,
    configs: &[NotifierConfig],
    sender: Arc<dyn WebhookSender>,
) -> Result<Vec<Box<dyn Notifier>>> {
    configs
        .iter()
        .map(|config| registry.create(config, sender.clone()))
        .collect()
}
