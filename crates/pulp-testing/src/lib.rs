//! Test harness for the Pulp server.
//!
//! Points the process-wide config at test-only resources and locks it, manages the
//! shared test database connection, and swaps the webservice collaborators for
//! recording mocks. Use from tests only, never from production code.

pub mod config;
pub mod database;
pub mod error;
pub mod patch;
pub mod recorder;
pub mod webservices;

pub use config::{
    TEST_DATABASE_NAME, TEST_STORAGE_DIR, block_load_conf, load_test_config,
    override_config_attrs, restore_config_attrs,
};
pub use database::{TestEnvironment, drop_database, start_database_connection};
pub use error::HarnessError;
pub use patch::PatchSet;
pub use recorder::CallRecorder;
pub use webservices::WebservicesFixture;
