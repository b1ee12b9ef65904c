use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use email_service::{DispatchEngine, EmailResult, MailProvider};
use mail_common::{MailEnvelope, MailMessage};
use serde_json::{json, Value};
use tower::ServiceExt;

use mail_server::{create_app, subscriber::forward_envelope, MailServer};

/// Provider that records every message it is asked to send
#[derive(Default)]
struct RecordingProvider {
    sent: Mutex<Vec<MailMessage>>,
}

impl RecordingProvider {
    fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }

    async fn wait_for_send(&self, timeout: Duration) -> Option<MailMessage> {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if let Some(message) = self.sent().first().cloned() {
                return Some(message);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        None
    }
}

#[async_trait]
impl MailProvider for RecordingProvider {
    async fn send(&self, message: &MailMessage) -> EmailResult<String> {
        self.sent.lock().unwrap().push(message.clone());
        Ok("test-id".to_string())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

struct TestApp {
    provider: Arc<RecordingProvider>,
    engine: Arc<DispatchEngine>,
    app: Router,
}

impl TestApp {
    fn new() -> Self {
        let provider = Arc::new(RecordingProvider::default());
        let engine = Arc::new(DispatchEngine::start(provider.clone(), "info@suricata.com", 1));
        let app = create_app(MailServer::new(engine.clone(), None));
        Self {
            provider,
            engine,
            app,
        }
    }

    async fn post(&self, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .uri("/")
            .method("POST")
            .body(Body::from(body.to_string()))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }
}

#[tokio::test]
async fn test_post_queues_mail_for_delivery() {
    let test = TestApp::new();

    let (status, body) = test
        .post(r#"{"recipient":"a@b.com","subject":"Hi","message":"Hello"}"#)
        .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["status"], "queued");

    let sent = test
        .provider
        .wait_for_send(Duration::from_secs(1))
        .await
        .expect("provider never called");
    assert_eq!(sent.recipient(), "a@b.com");
    assert_eq!(sent.subject(), "Hi");
    assert_eq!(sent.body(), "Hello");
    assert_eq!(sent.sender(), "info@suricata.com");
}

#[tokio::test]
async fn test_wire_envelope_round_trips_through_ingress() {
    let test = TestApp::new();
    let original = MailMessage::new("from@x.com", "Subject", "Body", "to@x.com").unwrap();
    let payload = serde_json::to_string(&MailEnvelope::from(&original)).unwrap();

    let (status, _) = test.post(&payload).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let sent = test.provider.wait_for_send(Duration::from_secs(1)).await;
    assert_eq!(sent, Some(original));
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let test = TestApp::new();

    let (status, body) = test.post("{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "bad_request");

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(test.provider.sent().is_empty());
}

#[tokio::test]
async fn test_missing_recipient_is_unprocessable() {
    let test = TestApp::new();

    let (status, body) = test.post(r#"{"subject":"Hi","message":"Hello"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "unprocessable_entity");
}

#[tokio::test]
async fn test_closed_engine_is_unavailable() {
    let test = TestApp::new();
    test.engine.shutdown().await;

    let (status, _) = test
        .post(r#"{"recipient":"a@b.com","subject":"Hi","message":"Hello"}"#)
        .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(test.provider.sent().is_empty());
}

#[tokio::test]
async fn test_unstarted_engine_is_unavailable() {
    let app = create_app(MailServer::new(Arc::new(DispatchEngine::default()), None));
    let request = Request::builder()
        .uri("/")
        .method("POST")
        .body(Body::from(r#"{"recipient":"a@b.com"}"#))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_reports_dispatcher_state() {
    let test = TestApp::new();
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["dispatcher"], "running");
    assert_eq!(body["checks"]["nats"], "disabled");

    test.engine.shutdown().await;
    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = test.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_pubsub_envelope_is_forwarded() {
    let test = TestApp::new();

    forward_envelope(
        &test.engine,
        serde_json::from_value(json!({ "Recipient": "a@b.com", "Subject": "Hi", "Message": "Hello" }))
            .unwrap(),
    )
    .await;

    let sent = test.provider.wait_for_send(Duration::from_secs(1)).await;
    assert_eq!(sent.map(|m| m.recipient().to_string()), Some("a@b.com".to_string()));
}
