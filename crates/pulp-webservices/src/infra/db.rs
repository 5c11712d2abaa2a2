use anyhow::Context as _;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection, EntityTrait, QueryOrder};
use serde_json::Value;
use uuid::Uuid;

use pulp_db::model::event_listeners;

use crate::domain::repository::EventListenerRepository;
use crate::domain::types::{EventListener, EventListenerChanges};
use crate::error::WebservicesError;

#[derive(Clone)]
pub struct DbEventListenerRepository {
    pub db: DatabaseConnection,
}

impl EventListenerRepository for DbEventListenerRepository {
    async fn list(&self) -> Result<Vec<EventListener>, WebservicesError> {
        let models = event_listeners::Entity::find()
            .order_by_asc(event_listeners::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list event listeners")?;
        models.into_iter().map(listener_from_model).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<EventListener>, WebservicesError> {
        let model = event_listeners::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find event listener by id")?;
        model.map(listener_from_model).transpose()
    }

    async fn create(&self, listener: &EventListener) -> Result<(), WebservicesError> {
        event_listeners::ActiveModel {
            id: Set(listener.id),
            notifier_type_id: Set(listener.notifier_type_id.clone()),
            notifier_config: Set(Value::Object(listener.notifier_config.clone())),
            event_types: Set(serde_json::to_value(&listener.event_types)
                .context("encode event types")?),
            created_at: Set(listener.created_at),
        }
        .insert(&self.db)
        .await
        .context("insert event listener")?;
        Ok(())
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &EventListenerChanges,
    ) -> Result<Option<EventListener>, WebservicesError> {
        let Some(model) = event_listeners::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find event listener for update")?
        else {
            return Ok(None);
        };

        if changes.notifier_config.is_none() && changes.event_types.is_none() {
            return listener_from_model(model).map(Some);
        }

        let mut active: event_listeners::ActiveModel = model.into();
        if let Some(config) = &changes.notifier_config {
            active.notifier_config = Set(Value::Object(config.clone()));
        }
        if let Some(event_types) = &changes.event_types {
            active.event_types =
                Set(serde_json::to_value(event_types).context("encode event types")?);
        }
        let model = active
            .update(&self.db)
            .await
            .context("update event listener")?;
        listener_from_model(model).map(Some)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, WebservicesError> {
        let result = event_listeners::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete event listener")?;
        Ok(result.rows_affected > 0)
    }
}

fn listener_from_model(model: event_listeners::Model) -> Result<EventListener, WebservicesError> {
    let notifier_config = match model.notifier_config {
        Value::Object(map) => map,
        Value::Null => serde_json::Map::new(),
        other => {
            let err = anyhow::anyhow!("notifier config of {} is not an object: {other}", model.id);
            return Err(err.into());
        }
    };
    let event_types = serde_json::from_value(model.event_types)
        .with_context(|| format!("decode event types of {}", model.id))?;
    Ok(EventListener {
        id: model.id,
        notifier_type_id: model.notifier_type_id,
        notifier_config,
        event_types,
        created_at: model.created_at,
    })
}
