use async_trait::async_trait;
use chrono::SecondsFormat;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::{Notifier, NotifierBase, NotifierConfig};
use crate::{
    alerting::EvalContext,
    extract::{extract_annotations, extract_labels, Annotations, Labels},
    transport::{WebhookRequest, WebhookSender},
    Error, Result,
};

pub const NOTIFIER_TYPE: &str = "prometheus-alertmanager";

const ALERTS_PATH: &str = "/api/v1/alerts";

/// One element of the `POST /api/v1/alerts` body
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPayload {
    pub starts_at: String,
    #[serde(rename = "generatorURL", skip_serializing_if = "Option::is_none")]
    pub generator_url: Option<String>,
    pub annotations: Annotations,
    pub labels: Labels,
}

pub struct AlertmanagerNotifier {
    base: NotifierBase,
    url: String,
    sender: Arc<dyn WebhookSender>,
}

impl AlertmanagerNotifier {
    pub fn new(config: &NotifierConfig, sender: Arc<dyn WebhookSender>) -> Result<Self> {
        let url = match config.setting_str("url") {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => {
                return Err(Error::Validation(
                    "Could not find url property in settings".to_string(),
                ))
            }
        };

        info!("Configured Alertmanager notifier '{}' for {}", config.name, url);

        Ok(Self {
            base: NotifierBase::from(config),
            url,
            sender,
        })
    }

    /// Base URL exactly as configured
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn alerts_url(&self) -> String {
        format!("{}{}", self.url, ALERTS_PATH)
    }

    pub fn build_alerts(&self, ctx: &EvalContext) -> Vec<AlertPayload> {
        let starts_at = ctx.start_time.to_rfc3339_opts(SecondsFormat::Secs, true);
        let generator_url = ctx.rule_url().ok();

        ctx.eval_matches
            .iter()
            .map(|eval_match| {
                let (labels, cleaned_message) = extract_labels(ctx, eval_match);
                AlertPayload {
                    starts_at: starts_at.clone(),
                    generator_url: generator_url.clone(),
                    annotations: extract_annotations(&cleaned_message),
                    labels,
                }
            })
            .collect()
    }
}

#[async_trait]
impl Notifier for AlertmanagerNotifier {
    fn name(&self) -> &str {
        &self.base.name
    }

    fn notifier_type(&self) -> &str {
        &self.base.notifier_type
    }

    fn is_default(&self) -> bool {
        self.base.is_default
    }

    fn should_notify(&self, ctx: &EvalContext) -> bool {
        ctx.rule.state.is_firing()
    }

    async fn notify(&self, ctx: &EvalContext) -> Result<()> {
        let alerts = self.build_alerts(ctx);
        let body = serde_json::to_string(&alerts)?;
        let request = WebhookRequest::post_json(self.alerts_url(), body);

        debug!(
            "Sending {} alert(s) for rule '{}' to {}",
            alerts.len(),
            ctx.rule.name,
            request.url
        );

        let result = tokio::select! {
            biased;
            _ = ctx.cancel.cancelled() => Err(Error::Cancelled),
            result = self.sender.send(&request) => result,
        };

        if let Err(e) = &result {
            error!("Failed to send alertmanager '{}': {}", self.base.name, e);
        }
        result
    }
}

pub fn new_alertmanager_notifier(
    config: &NotifierConfig,
    sender: Arc<dyn WebhookSender>,
) -> Result<Box<dyn Notifier>> {
    Ok(Box::new(AlertmanagerNotifier::new(config, sender)?))
}
