//! Maps notifier type names to their constructors.
//!
//! Nothing registers itself: the host builds a registry and calls
//! [`register_builtin_notifiers`] during setup.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    notifiers::{self, Notifier, NotifierConfig},
    transport::WebhookSender,
    Error, Result,
};

pub type NotifierFactory = fn(&NotifierConfig, Arc<dyn WebhookSender>) -> Result<Box<dyn Notifier>>;

#[derive(Clone)]
pub struct NotifierPlugin {
    pub notifier_type: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub factory: NotifierFactory,
}

#[derive(Default)]
pub struct NotifierRegistry {
    plugins: HashMap<&'static str, NotifierPlugin>,
}

impl NotifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: NotifierPlugin) {
        info!("Registering notifier type '{}'", plugin.notifier_type);
        if let Some(previous) = self.plugins.insert(plugin.notifier_type, plugin) {
            warn!("Notifier type '{}' was already registered, replaced", previous.notifier_type);
        }
    }

    pub fn get(&self, notifier_type: &str) -> Option<&NotifierPlugin> {
        self.plugins.get(notifier_type)
    }

    /// Registered plugins sorted by type name
    pub fn plugins(&self) -> Vec<&NotifierPlugin> {
        let mut plugins: Vec<_> = self.plugins.values().collect();
        plugins.sort_by_key(|p| p.notifier_type);
        plugins
    }

    pub fn create(
        &self,
        config: &NotifierConfig,
        sender: Arc<dyn WebhookSender>,
    ) -> Result<Box<dyn Notifier>> {
        let plugin = self.get(&config.notifier_type).ok_or_else(|| {
            Error::Validation(format!("Unsupported notifier type: {}", config.notifier_type))
        })?;
        (plugin.factory)(config, sender)
    }
}

pub fn register_builtin_notifiers(registry: &mut NotifierRegistry) {
    registry.register(NotifierPlugin {
        notifier_type: notifiers::NOTIFIER_TYPE,
        name: "Prometheus Alertmanager",
        description: "Sends alert to Prometheus Alertmanager",
        factory: notifiers::new_alertmanager_notifier,
    });
}
