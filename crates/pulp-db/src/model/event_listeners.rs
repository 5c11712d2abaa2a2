use sea_orm::entity::prelude::*;

/// A configured event listener: which notifier handles which event types.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "event_listeners")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Notifier that handles matching events (`http`, `email`, `amqp`).
    pub notifier_type_id: String,
    /// Passed to the notifier every time a matching event fires.
    pub notifier_config: Json,
    /// JSON array of event type names, `"*"` matching all.
    pub event_types: Json,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
