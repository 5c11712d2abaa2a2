use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};

use crate::model::event_listeners;

/// Create the tables of every entity that does not have one yet.
pub async fn ensure_tables<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    create_if_missing(db, event_listeners::Entity).await
}

async fn create_if_missing<C, E>(db: &C, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let backend = db.get_database_backend();
    let mut statement = Schema::new(backend).create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(backend.build(&statement)).await?;
    Ok(())
}
