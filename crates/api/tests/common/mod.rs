use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue};
use axum_test::TestServer;
use serde_json::{json, Value};
use shiftdesk_api::{app, ApiState};
use shiftdesk_core::models::user::UserContact;
use shiftdesk_core::notification::{Notification, Notifier};
use shiftdesk_core::store::ScheduleStore;
use shiftdesk_db::InMemoryStore;

/// Keeps every notification it is asked to send. Fails all of them when
/// `failing` is set.
#[derive(Default)]
pub struct RecordingNotifier {
    failing: bool,
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            failing: true,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification) -> eyre::Result<()> {
        self.sent.lock().unwrap().push(notification.clone());
        if self.failing {
            eyre::bail!("smtp relay refused the message");
        }
        Ok(())
    }
}

pub struct TestContext {
    pub server: TestServer,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_notifier(RecordingNotifier::default())
    }

    pub fn with_notifier(notifier: RecordingNotifier) -> Self {
        let store = InMemoryStore::with_users([
            contact(1, "ana@example.com"),
            contact(2, "ben@example.com"),
        ]);
        Self::with_store(Arc::new(store), notifier)
    }

    pub fn with_store(store: Arc<dyn ScheduleStore>, notifier: RecordingNotifier) -> Self {
        let notifier = Arc::new(notifier);
        let state = Arc::new(ApiState::new(store, notifier.clone()));
        let server = TestServer::new(app(state)).unwrap();
        Self { server, notifier }
    }

    /// Notifications go out on a spawned task; give it a moment.
    pub async fn wait_for_notifications(&self, count: usize) -> Vec<Notification> {
        for _ in 0..100 {
            let sent = self.notifier.sent();
            if sent.len() >= count {
                return sent;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.notifier.sent()
    }

    /// Creates a batch through the API and returns its JSON.
    pub async fn create_batch(&self, entries: Value) -> Value {
        let response = self
            .server
            .post("/api/schedules")
            .add_header(user_header(), HeaderValue::from_static("1"))
            .json(&json!({ "entries": entries }))
            .await;
        assert_eq!(response.status_code(), 201, "{}", response.text());
        response.json::<Value>()
    }
}

pub fn user_header() -> HeaderName {
    HeaderName::from_static("x-user-id")
}

pub fn admin() -> HeaderValue {
    HeaderValue::from_static("1")
}

pub fn entry(date: &str, start: &str, end: &str, user_id: i64) -> Value {
    json!({ "date": date, "startTime": start, "endTime": end, "userId": user_id })
}

fn contact(id: i64, email: &str) -> UserContact {
    UserContact {
        id,
        email: Some(email.to_string()),
        first_name: Some(format!("User{id}")),
        last_name: None,
    }
}
