#![allow(async_fn_in_trait)]

use std::sync::LazyLock;

use tokio::sync::OnceCell;

use crate::error::DbError;
use crate::postgres::PostgresDriver;
use crate::settings::DatabaseSettings;

/// Opens connections and destroys databases.
pub trait DatabaseDriver: Send + Sync {
    type Handle: Send + Sync;

    async fn connect(&self, settings: &DatabaseSettings) -> Result<Self::Handle, DbError>;

    async fn drop_database(&self, handle: &Self::Handle, name: &str) -> Result<(), DbError>;
}

/// A connection slot that is filled at most once.
pub struct SharedConnection<D: DatabaseDriver> {
    driver: D,
    handle: OnceCell<D::Handle>,
}

impl<D: DatabaseDriver> SharedConnection<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            handle: OnceCell::new(),
        }
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn is_connected(&self) -> bool {
        self.handle.initialized()
    }

    pub fn get(&self) -> Option<&D::Handle> {
        self.handle.get()
    }

    /// Connect with `settings` unless a connection already exists.
    ///
    /// Concurrent callers share a single connect attempt; a failed attempt leaves the slot
    /// empty so a later call can retry.
    pub async fn initialize(&self, settings: &DatabaseSettings) -> Result<&D::Handle, DbError> {
        self.handle
            .get_or_try_init(|| async {
                let handle = self.driver.connect(settings).await?;
                tracing::info!(database = %settings.name, "database connection initialized");
                Ok::<_, DbError>(handle)
            })
            .await
    }

    pub async fn drop_database(&self, name: &str) -> Result<(), DbError> {
        let handle = self.handle.get().ok_or(DbError::NotConnected)?;
        self.driver.drop_database(handle, name).await?;
        tracing::info!(database = %name, "database dropped");
        Ok(())
    }
}

static CONNECTION: LazyLock<SharedConnection<PostgresDriver>> =
    LazyLock::new(|| SharedConnection::new(PostgresDriver));

/// The process-wide connection.
pub fn connection() -> &'static SharedConnection<PostgresDriver> {
    &CONNECTION
}
