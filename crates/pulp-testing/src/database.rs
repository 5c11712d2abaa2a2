use pulp_config::{ConfigError, SharedConfig};
use pulp_core::logs::{LoggingSubsystem, TracingLogging};
use pulp_db::{DatabaseDriver, DatabaseSettings, PostgresDriver, SharedConnection};

use crate::config::load_test_config;
use crate::error::HarnessError;

/// The config store, logging subsystem and connection slot the harness drives.
pub struct TestEnvironment<'c, D: DatabaseDriver = PostgresDriver, L = TracingLogging> {
    config: SharedConfig,
    logging: L,
    connection: &'c SharedConnection<D>,
}

impl TestEnvironment<'static> {
    /// The process-wide config, tracing subscriber and connection.
    pub fn global() -> Self {
        Self::new(pulp_config::global().clone(), TracingLogging, pulp_db::connection())
    }
}

impl<'c, D, L> TestEnvironment<'c, D, L>
where
    D: DatabaseDriver,
    L: LoggingSubsystem,
{
    pub fn new(config: SharedConfig, logging: L, connection: &'c SharedConnection<D>) -> Self {
        Self {
            config,
            logging,
            connection,
        }
    }

    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    pub fn logging(&self) -> &L {
        &self.logging
    }

    pub fn connection(&self) -> &'c SharedConnection<D> {
        self.connection
    }

    /// Load the test config and connect, once per connection slot.
    ///
    /// The config is always loaded before connecting so the connection never sees
    /// production settings. Returns immediately when already connected.
    pub async fn start_database_connection(&self) -> Result<(), HarnessError> {
        if self.connection.is_connected() {
            return Ok(());
        }
        load_test_config(&self.config, &self.logging)?;
        let settings = DatabaseSettings::from_config(&self.config.read())?;
        self.connection.initialize(&settings).await?;
        Ok(())
    }

    /// Drop the database named in the current config.
    pub async fn drop_database(&self) -> Result<(), HarnessError> {
        let name = self
            .config
            .get("database", "name")
            .ok_or_else(|| ConfigError::MissingOption {
                section: "database".to_owned(),
                key: "name".to_owned(),
            })?;
        self.connection.drop_database(&name).await?;
        Ok(())
    }
}

/// [`TestEnvironment::start_database_connection`] on the global environment.
pub async fn start_database_connection() -> Result<(), HarnessError> {
    TestEnvironment::global().start_database_connection().await
}

/// [`TestEnvironment::drop_database`] on the global environment.
pub async fn drop_database() -> Result<(), HarnessError> {
    TestEnvironment::global().drop_database().await
}
