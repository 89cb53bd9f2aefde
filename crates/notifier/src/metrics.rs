use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

use crate::{Error, Result};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref NOTIFICATIONS_TOTAL: IntCounterVec = {
        let counter = IntCounterVec::new(
            Opts::new(
                "alertmanager_notifier_notifications_total",
                "Evaluations handled by a notifier, by outcome."
            ),
            &["notifier", "outcome"]
        )
        .expect("valid notifications_total metric");
        REGISTRY
            .register(Box::new(counter.clone()))
            .expect("notifications_total registered once");
        counter
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Sent,
    Failed,
    Suppressed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Sent => "sent",
            Outcome::Failed => "failed",
            Outcome::Suppressed => "suppressed",
        }
    }
}

pub fn record_notification(notifier: &str, outcome: Outcome) {
    NOTIFICATIONS_TOTAL
        .with_label_values(&[notifier, outcome.as_str()])
        .inc();
}

// Text exposition of everything in REGISTRY
pub fn gather_metrics() -> Result<String> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| Error::Config(format!("Failed to encode metrics: {}", e)))?;
    String::from_utf8(buffer).map_err(|e| Error::Config(format!("Metrics are not valid UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_notification_counts_by_outcome() {
        let sent = NOTIFICATIONS_TOTAL.with_label_values(&["metrics-test", "sent"]);
        let before = sent.get();

        record_notification("metrics-test", Outcome::Sent);
        record_notification("metrics-test", Outcome::Sent);
        record_notification("metrics-test", Outcome::Failed);

        assert_eq!(sent.get(), before + 2);
        assert_eq!(
            NOTIFICATIONS_TOTAL
                .with_label_values(&["metrics-test", "failed"])
                .get(),
            1
        );
    }

    #[test]
    fn test_gather_metrics_exposes_counter() {
        record_notification("gather-test", Outcome::Suppressed);
        let text = gather_metrics().unwrap();
        assert!(text.contains("alertmanager_notifier_notifications_total"));
        assert!(text.contains("outcome=\"suppressed\""));
    }
}
