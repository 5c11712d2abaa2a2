use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};

use crate::connection::DatabaseDriver;
use crate::error::DbError;
use crate::schema;
use crate::settings::DatabaseSettings;

/// Database every Postgres server has; used to create and drop the working database.
const MAINTENANCE_DATABASE: &str = "postgres";

/// Postgres driver over sea-orm.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

/// Open pool to the working database plus the URL of the maintenance database.
#[derive(Debug, Clone)]
pub struct PgHandle {
    pub db: DatabaseConnection,
    admin_url: String,
}

impl DatabaseDriver for PostgresDriver {
    type Handle = PgHandle;

    async fn connect(&self, settings: &DatabaseSettings) -> Result<PgHandle, DbError> {
        validate_name(&settings.name)?;
        let admin_url = settings.url(MAINTENANCE_DATABASE)?;

        let admin = Database::connect(&admin_url).await?;
        let exists = admin
            .query_one(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                "SELECT 1 FROM pg_database WHERE datname = $1",
                [settings.name.clone().into()],
            ))
            .await?
            .is_some();
        if !exists {
            admin
                .execute_unprepared(&format!("CREATE DATABASE \"{}\"", settings.name))
                .await?;
            tracing::info!(database = %settings.name, "database created");
        }
        admin.close().await?;

        let mut options = ConnectOptions::new(settings.url(&settings.name)?);
        options
            .max_connections(settings.max_pool_size)
            .sqlx_logging(false);
        let db = Database::connect(options).await?;
        schema::ensure_tables(&db).await?;

        Ok(PgHandle { db, admin_url })
    }

    async fn drop_database(&self, handle: &PgHandle, name: &str) -> Result<(), DbError> {
        validate_name(name)?;
        let admin = Database::connect(&handle.admin_url).await?;
        // FORCE terminates the pool's own sessions on the database being dropped.
        admin
            .execute_unprepared(&format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"))
            .await?;
        admin.close().await?;
        Ok(())
    }
}

/// Database names are interpolated into DDL, so only `[A-Za-z0-9_]` is accepted.
fn validate_name(name: &str) -> Result<(), DbError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DbError::InvalidName(name.to_owned()))
    }
}
