//! Label and annotation extraction for Alertmanager alerts.
//!
//! Rule messages may carry extra Alertmanager labels inline, one per line, as
//! `"key":"value"`. Those lines become labels and are dropped from the text
//! used as the alert description.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;

use crate::alerting::{EvalContext, EvalMatch};

pub type Labels = BTreeMap<String, String>;
pub type Annotations = BTreeMap<String, String>;

lazy_static! {
    static ref LABEL_LINE: Regex = Regex::new(r#""(.+)":"(.+)""#).expect("label line pattern");
}

/// Builds the label set for one match and returns it together with the rule
/// message minus every line that contributed a label.
pub fn extract_labels(ctx: &EvalContext, eval_match: &EvalMatch) -> (Labels, String) {
    let mut labels = Labels::new();
    labels.insert("alertname".to_string(), ctx.rule.name.clone());

    if eval_match.tags.is_empty() {
        labels.insert("metric".to_string(), eval_match.metric.clone());
    } else {
        for (key, value) in &eval_match.tags {
            labels.insert(key.clone(), value.clone());
        }
    }

    let message = &ctx.rule.message;
    let mut cleaned = String::with_capacity(message.len());

    // First match per line only; a line holding two pairs still yields one label.
    for line in message.split_inclusive('\n') {
        let text = line.strip_suffix('\n').unwrap_or(line);
        match LABEL_LINE.captures(text) {
            Some(caps) => {
                labels.insert(caps[1].to_string(), caps[2].to_string());
            }
            None => cleaned.push_str(line),
        }
    }

    (labels, cleaned)
}

pub fn extract_annotations(cleaned_message: &str) -> Annotations {
    let mut annotations = Annotations::new();
    if !cleaned_message.is_empty() {
        annotations.insert("description".to_string(), cleaned_message.to_string());
    }
    annotations
}
