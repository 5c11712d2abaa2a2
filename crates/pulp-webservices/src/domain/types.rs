use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Notifiers an event listener may name.
pub const NOTIFIER_TYPES: &[&str] = &["http", "email", "amqp"];

/// Event types a listener may subscribe to.
pub const EVENT_TYPES: &[&str] = &[
    "repo.sync.start",
    "repo.sync.finish",
    "repo.publish.start",
    "repo.publish.finish",
];

/// Subscribes a listener to every event type.
pub const ALL_EVENT_TYPES: &str = "*";

#[derive(Debug, Clone, PartialEq)]
pub struct EventListener {
    pub id: Uuid,
    pub notifier_type_id: String,
    pub notifier_config: Map<String, Value>,
    pub event_types: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields an update may change. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct EventListenerChanges {
    pub notifier_config: Option<Map<String, Value>>,
    pub event_types: Option<Vec<String>>,
}

pub fn is_known_notifier_type(notifier_type_id: &str) -> bool {
    NOTIFIER_TYPES.contains(&notifier_type_id)
}

pub fn is_known_event_type(event_type: &str) -> bool {
    event_type == ALL_EVENT_TYPES || EVENT_TYPES.contains(&event_type)
}
