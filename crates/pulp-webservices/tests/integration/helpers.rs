use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use chrono::Utc;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use pulp_testing::WebservicesFixture;
use pulp_webservices::collaborators::Collaborators;
use pulp_webservices::domain::repository::EventListenerRepository;
use pulp_webservices::domain::types::{EventListener, EventListenerChanges};
use pulp_webservices::error::WebservicesError;
use pulp_webservices::router::build_router;
use pulp_webservices::state::AppState;

pub const EVENTS_PATH: &str = "/pulp/api/v2/events/";

// ── MockEventListenerRepo ────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockEventListenerRepo {
    pub listeners: Arc<Mutex<Vec<EventListener>>>,
}

impl MockEventListenerRepo {
    pub fn new(listeners: Vec<EventListener>) -> Self {
        Self {
            listeners: Arc::new(Mutex::new(listeners)),
        }
    }

    pub fn snapshot(&self) -> Vec<EventListener> {
        self.listeners.lock().unwrap().clone()
    }
}

impl EventListenerRepository for MockEventListenerRepo {
    async fn list(&self) -> Result<Vec<EventListener>, WebservicesError> {
        Ok(self.snapshot())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EventListener>, WebservicesError> {
        Ok(self.snapshot().into_iter().find(|l| l.id == id))
    }

    async fn create(&self, listener: &EventListener) -> Result<(), WebservicesError> {
        self.listeners.lock().unwrap().push(listener.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &EventListenerChanges,
    ) -> Result<Option<EventListener>, WebservicesError> {
        let mut listeners = self.listeners.lock().unwrap();
        let Some(listener) = listeners.iter_mut().find(|l| l.id == id) else {
            return Ok(None);
        };
        if let Some(config) = &changes.notifier_config {
            listener.notifier_config = config.clone();
        }
        if let Some(event_types) = &changes.event_types {
            listener.event_types = event_types.clone();
        }
        Ok(Some(listener.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, WebservicesError> {
        let mut listeners = self.listeners.lock().unwrap();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        Ok(listeners.len() < before)
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub fn test_listener() -> EventListener {
    let config = match json!({"url": "http://hooks.example.com/pulp", "username": "hook"}) {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    EventListener {
        id: Uuid::new_v4(),
        notifier_type_id: "http".to_owned(),
        notifier_config: config,
        event_types: vec!["repo.sync.finish".to_owned()],
        created_at: Utc::now(),
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub fixture: WebservicesFixture,
    pub repo: MockEventListenerRepo,
}

/// A router over `repo` whose collaborators are all mocked.
pub fn test_app(repo: MockEventListenerRepo) -> TestApp {
    let collaborators = Arc::new(Collaborators::default());
    let fixture = WebservicesFixture::set_up(&collaborators);
    let state = AppState {
        collaborators,
        events: repo.clone(),
        server_name: "pulp.test".to_owned(),
    };
    let server = TestServer::new(build_router(state)).unwrap();
    TestApp {
        server,
        fixture,
        repo,
    }
}
