use alertmanager_notifier::{
    dispatch, register_builtin_notifiers, AlertState, Error, EvalContext, EvalMatch,
    HttpWebhookSender, Notifier, NotifierConfig, NotifierRegistry, Rule, WebhookSender,
};
use axum::{
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone)]
struct ReceiverState {
    received: Arc<Mutex<Vec<(String, Value)>>>,
    status: StatusCode,
}

async fn receive_alerts(
    State(state): State<ReceiverState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.received.lock().unwrap().push((content_type, body));
    state.status
}

/// Starts a fake Alertmanager and returns its base URL
async fn start_receiver(status: StatusCode) -> (String, Arc<Mutex<Vec<(String, Value)>>>) {
    let received = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/v1/alerts", post(receive_alerts))
        .with_state(ReceiverState {
            received: received.clone(),
            status,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), received)
}

fn sender() -> Arc<dyn WebhookSender> {
    Arc::new(HttpWebhookSender::new(Some(Duration::from_secs(5))).unwrap())
}

fn notifier_config(url: &str) -> NotifierConfig {
    NotifierConfig::new("alertmanager", "prometheus-alertmanager", json!({ "url": url }))
}

fn registry() -> NotifierRegistry {
    let mut registry = NotifierRegistry::new();
    register_builtin_notifiers(&mut registry);
    registry
}

fn firing_context() -> EvalContext {
    let rule = Rule::new(
        "test_alert",
        "A great description\n\
         With some details\n\
         \"label1\":\"value1\"\n\
         \"label2\":\"value2\"\n",
    )
    .with_state(AlertState::Alerting);

    let mut ctx =
        EvalContext::new(rule).with_start_time(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap());
    ctx.add_match(EvalMatch::new("fake.metric").with_value(1.0).with_tag("tag1", "tagvalue1"));
    ctx.add_match(EvalMatch::new("other.metric").with_value(2.0));
    ctx
}

#[tokio::test]
async fn test_firing_evaluation_is_delivered() {
    let (url, received) = start_receiver(StatusCode::OK).await;
    let notifier = registry().create(&notifier_config(&url), sender()).unwrap();

    let delivered = dispatch(notifier.as_ref(), &firing_context()).await.unwrap();
    assert!(delivered);

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);

    let (content_type, body) = &received[0];
    assert_eq!(content_type, "application/json");
    assert_eq!(
        body,
        &json!([
            {
                "startsAt": "2024-01-02T03:04:05Z",
                "annotations": { "description": "A great description\nWith some details\n" },
                "labels": {
                    "alertname": "test_alert",
                    "label1": "value1",
                    "label2": "value2",
                    "tag1": "tagvalue1"
                }
            },
            {
                "startsAt": "2024-01-02T03:04:05Z",
                "annotations": { "description": "A great description\nWith some details\n" },
                "labels": {
                    "alertname": "test_alert",
                    "label1": "value1",
                    "label2": "value2",
                    "metric": "other.metric"
                }
            }
        ])
    );
}

#[tokio::test]
async fn test_resolved_evaluation_is_not_delivered() {
    let (url, received) = start_receiver(StatusCode::OK).await;
    let notifier = registry().create(&notifier_config(&url), sender()).unwrap();

    let mut ctx = firing_context();
    ctx.rule.state = AlertState::Ok;

    assert!(!dispatch(notifier.as_ref(), &ctx).await.unwrap());
    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_is_returned() {
    let (url, received) = start_receiver(StatusCode::INTERNAL_SERVER_ERROR).await;
    let notifier = registry().create(&notifier_config(&url), sender()).unwrap();

    let err = notifier.notify(&firing_context()).await.unwrap_err();

    assert!(matches!(err, Error::Webhook { status: 500, .. }));
    assert_eq!(received.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unreachable_alertmanager_is_an_http_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier = registry()
        .create(&notifier_config(&format!("http://{}", addr)), sender())
        .unwrap();

    let err = notifier.notify(&firing_context()).await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
}
