//! Evaluation results handed to notifiers by the alert evaluation engine.
//!
//! Everything here is a read-only snapshot of one rule evaluation. Notifiers
//! never mutate it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    Alerting,
    Ok,
    Pending,
    Paused,
    NoData,
    Error,
    #[default]
    Unknown,
}

impl AlertState {
    pub fn is_firing(&self) -> bool {
        matches!(self, AlertState::Alerting)
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertState::Alerting => write!(f, "alerting"),
            AlertState::Ok => write!(f, "ok"),
            AlertState::Pending => write!(f, "pending"),
            AlertState::Paused => write!(f, "paused"),
            AlertState::NoData => write!(f, "no_data"),
            AlertState::Error => write!(f, "error"),
            AlertState::Unknown => write!(f, "unknown"),
        }
    }
}

impl From<&str> for AlertState {
    fn from(s: &str) -> Self {
        match s {
            "alerting" => AlertState::Alerting,
            "ok" => AlertState::Ok,
            "pending" => AlertState::Pending,
            "paused" => AlertState::Paused,
            "no_data" => AlertState::NoData,
            "error" => AlertState::Error,
            _ => AlertState::Unknown,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    /// Free text shown to the receiver; may embed `"key":"value"` label lines
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub state: AlertState,
}

impl Rule {
    pub fn new(name: &str, message: &str) -> Self {
        Self {
            id: 0,
            name: name.to_string(),
            message: message.to_string(),
            state: AlertState::Unknown,
        }
    }

    pub fn with_state(mut self, state: AlertState) -> Self {
        self.state = state;
        self
    }
}

/// One matched series of an evaluation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalMatch {
    pub metric: String,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
}

impl EvalMatch {
    pub fn new(metric: &str) -> Self {
        Self {
            metric: metric.to_string(),
            value: None,
            tags: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_tag(mut self, key: &str, value: &str) -> Self {
        self.tags.insert(key.to_string(), value.to_string());
        self
    }
}

/// Where the rule lives in the host UI, used to build `generatorURL`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleLink {
    pub app_url: String,
    pub dashboard_uid: String,
    pub dashboard_slug: String,
    pub panel_id: i64,
    pub org_id: i64,
}

impl RuleLink {
    pub fn resolve(&self) -> Result<String> {
        Url::parse(&self.app_url)
            .map_err(|e| Error::RuleUrl(format!("Invalid app url '{}': {}", self.app_url, e)))?;

        if self.dashboard_uid.is_empty() {
            return Err(Error::RuleUrl("Dashboard uid is empty".to_string()));
        }

        Ok(format!(
            "{}/d/{}/{}?fullscreen&edit&tab=alert&panelId={}&orgId={}",
            self.app_url.trim_end_matches('/'),
            self.dashboard_uid,
            self.dashboard_slug,
            self.panel_id,
            self.org_id
        ))
    }
}

#[derive(Debug, Clone)]
pub struct EvalContext {
    pub rule: Rule,
    pub start_time: DateTime<Utc>,
    pub eval_matches: Vec<EvalMatch>,
    pub rule_link: Option<RuleLink>,
    /// Cancelled by the engine when the evaluation is abandoned
    pub cancel: CancellationToken,
}

impl EvalContext {
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            start_time: Utc::now(),
            eval_matches: Vec::new(),
            rule_link: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    pub fn with_rule_link(mut self, link: RuleLink) -> Self {
        self.rule_link = Some(link);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn add_match(&mut self, eval_match: EvalMatch) {
        self.eval_matches.push(eval_match);
    }

    pub fn rule_url(&self) -> Result<String> {
        match &self.rule_link {
            Some(link) => link.resolve(),
            None => Err(Error::RuleUrl(format!(
                "No dashboard link for rule '{}'",
                self.rule.name
            ))),
        }
    }
}
