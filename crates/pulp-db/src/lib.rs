//! Database access for the Pulp server.
//!
//! One shared connection per process, opened through a [`DatabaseDriver`] against the
//! database named in the `[database]` config section.

pub mod connection;
pub mod error;
pub mod model;
pub mod postgres;
pub mod schema;
pub mod settings;

pub use connection::{DatabaseDriver, SharedConnection, connection};
pub use error::DbError;
pub use postgres::{PgHandle, PostgresDriver};
pub use settings::DatabaseSettings;
