//! Server configuration store.
//!
//! A process-wide set of INI-style sections (`[database] name`, `[server] storage_dir`, ...)
//! assembled from built-in defaults and an autoload list of config files. The three mutating
//! entry points (`assign`, `load_configuration`, `set`) go through a [`MutatorTable`] so the
//! test harness can lock the store down between runs.

pub mod defaults;
pub mod error;
pub mod guard;
pub mod settings;
pub mod store;

pub use error::{ConfigError, TamperError};
pub use guard::{EntryPoint, Mutator, MutatorTable, Sentinel};
pub use settings::Settings;
pub use store::{DEFAULT_CONFIG_FILE, ServerConfig, SharedConfig, global};
