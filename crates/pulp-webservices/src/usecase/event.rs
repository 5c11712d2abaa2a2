use chrono::Utc;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::repository::EventListenerRepository;
use crate::domain::types::{
    EventListener, EventListenerChanges, is_known_event_type, is_known_notifier_type,
};
use crate::error::WebservicesError;

fn validate_event_types(event_types: &[String]) -> Result<(), WebservicesError> {
    if event_types.is_empty() {
        return Err(WebservicesError::MissingEventTypes);
    }
    match event_types.iter().find(|t| !is_known_event_type(t)) {
        Some(unknown) => Err(WebservicesError::InvalidEventType(unknown.clone())),
        None => Ok(()),
    }
}

/// Overlays `changes` onto `config`; a `null` value removes the key.
fn merge_notifier_config(config: &mut Map<String, Value>, changes: Map<String, Value>) {
    for (key, value) in changes {
        if value.is_null() {
            config.remove(&key);
        } else {
            config.insert(key, value);
        }
    }
}

// ── ListEventListeners ───────────────────────────────────────────────────────

pub struct ListEventListenersUseCase<R: EventListenerRepository> {
    pub repo: R,
}

impl<R: EventListenerRepository> ListEventListenersUseCase<R> {
    pub async fn execute(&self) -> Result<Vec<EventListener>, WebservicesError> {
        self.repo.list().await
    }
}

// ── GetEventListener ─────────────────────────────────────────────────────────

pub struct GetEventListenerUseCase<R: EventListenerRepository> {
    pub repo: R,
}

impl<R: EventListenerRepository> GetEventListenerUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<EventListener, WebservicesError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(WebservicesError::EventListenerNotFound)
    }
}

// ── CreateEventListener ──────────────────────────────────────────────────────

pub struct CreateEventListenerInput {
    pub notifier_type_id: String,
    pub notifier_config: Map<String, Value>,
    pub event_types: Vec<String>,
}

pub struct CreateEventListenerUseCase<R: EventListenerRepository> {
    pub repo: R,
}

impl<R: EventListenerRepository> CreateEventListenerUseCase<R> {
    pub async fn execute(
        &self,
        input: CreateEventListenerInput,
    ) -> Result<EventListener, WebservicesError> {
        if !is_known_notifier_type(&input.notifier_type_id) {
            return Err(WebservicesError::InvalidNotifierType(input.notifier_type_id));
        }
        validate_event_types(&input.event_types)?;

        let listener = EventListener {
            id: Uuid::new_v4(),
            notifier_type_id: input.notifier_type_id,
            notifier_config: input.notifier_config,
            event_types: input.event_types,
            created_at: Utc::now(),
        };
        self.repo.create(&listener).await?;
        tracing::info!(
            id = %listener.id,
            notifier_type_id = %listener.notifier_type_id,
            "event listener created"
        );
        Ok(listener)
    }
}

// ── UpdateEventListener ──────────────────────────────────────────────────────

pub struct UpdateEventListenerUseCase<R: EventListenerRepository> {
    pub repo: R,
}

impl<R: EventListenerRepository> UpdateEventListenerUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        changes: EventListenerChanges,
    ) -> Result<EventListener, WebservicesError> {
        if let Some(event_types) = &changes.event_types {
            validate_event_types(event_types)?;
        }
        let mut current = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(WebservicesError::EventListenerNotFound)?;

        let notifier_config = match changes.notifier_config {
            Some(delta) => {
                merge_notifier_config(&mut current.notifier_config, delta);
                Some(current.notifier_config)
            }
            None => None,
        };
        let merged = EventListenerChanges {
            notifier_config,
            event_types: changes.event_types,
        };
        self.repo
            .update(id, &merged)
            .await?
            .ok_or(WebservicesError::EventListenerNotFound)
    }
}

// ── DeleteEventListener ──────────────────────────────────────────────────────

pub struct DeleteEventListenerUseCase<R: EventListenerRepository> {
    pub repo: R,
}

impl<R: EventListenerRepository> DeleteEventListenerUseCase<R> {
    pub async fn execute(&self, id: Uuid) -> Result<(), WebservicesError> {
        if !self.repo.delete(id).await? {
            return Err(WebservicesError::EventListenerNotFound);
        }
        tracing::info!(%id, "event listener deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn should_merge_notifier_config() {
        let mut current = config(json!({"url": "http://a", "username": "u", "password": "p"}));
        merge_notifier_config(
            &mut current,
            config(json!({"url": "http://b", "password": null, "timeout": 5})),
        );
        assert_eq!(
            Value::Object(current),
            json!({"url": "http://b", "username": "u", "timeout": 5})
        );
    }

    #[test]
    fn should_validate_event_types() {
        assert!(validate_event_types(&["*".to_owned()]).is_ok());
        assert!(validate_event_types(&["repo.sync.finish".to_owned()]).is_ok());
        assert!(matches!(
            validate_event_types(&[]),
            Err(WebservicesError::MissingEventTypes)
        ));
        assert!(matches!(
            validate_event_types(&["repo.sync.finish".to_owned(), "bogus".to_owned()]),
            Err(WebservicesError::InvalidEventType(t)) if t == "bogus"
        ));
    }
}
