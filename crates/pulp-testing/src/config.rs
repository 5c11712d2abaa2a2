//! Locks the config store for the duration of a test run.
//!
//! [`load_test_config`] reloads the store, points it at test-only resources, restarts
//! logging and then installs guards on every mutating entry point. Any later
//! mutation attempt fails with a tamper error naming the entry point and its arguments.

use std::path::Path;

use pulp_config::{ConfigError, DEFAULT_CONFIG_FILE, EntryPoint, Mutator, Sentinel, SharedConfig};
use pulp_core::logs::LoggingSubsystem;

use crate::error::HarnessError;

pub const TEST_DATABASE_NAME: &str = "pulp_unittest";
pub const TEST_STORAGE_DIR: &str = "/tmp/pulp";

/// Guard every mutating entry point of `config`.
///
/// The live mutators are recorded the first time only; later calls just reinstall
/// the sentinels.
pub fn override_config_attrs(config: &SharedConfig) {
    let mut store = config.write();
    store.record_overridden_attrs();
    for entry in EntryPoint::ALL {
        store.install_mutator(
            entry,
            Mutator::Guarded(Sentinel::new(entry.qualified_name())),
        );
    }
}

/// Put back the mutators recorded by [`override_config_attrs`]. A no-op if it never ran.
pub fn restore_config_attrs(config: &SharedConfig) {
    let mut store = config.write();
    let Some(original) = store.overridden_attrs().cloned() else {
        return;
    };
    store.restore_mutators(original);
}

/// Take the production config file out of the autoload list.
///
/// Already removed counts as success; every other failure propagates.
pub fn block_load_conf(config: &SharedConfig) -> Result<(), ConfigError> {
    match config.remove_config_file(Path::new(DEFAULT_CONFIG_FILE)) {
        Err(ConfigError::NotAConfigFile { path }) => {
            tracing::debug!(path = %path.display(), "production config already blocked");
            Ok(())
        }
        other => other,
    }
}

/// Reload `config` for tests and lock it.
///
/// Steps run in a fixed order: block the production file, lift the guards, reload,
/// point the database and storage directory at test resources, restart logging,
/// guard again. The first failing step aborts the rest.
pub fn load_test_config(
    config: &SharedConfig,
    logging: &dyn LoggingSubsystem,
) -> Result<(), HarnessError> {
    block_load_conf(config)?;
    restore_config_attrs(config);
    config.load_configuration()?;
    config.set("database", "name", TEST_DATABASE_NAME)?;
    config.set("server", "storage_dir", TEST_STORAGE_DIR)?;
    logging.stop_logging()?;
    logging.start_logging(&config.read())?;
    override_config_attrs(config);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;
    use std::path::PathBuf;
    use std::sync::Mutex;

    use pulp_config::{MutatorTable, ServerConfig, Settings};
    use pulp_core::logs::LogError;

    use super::*;

    /// Records what the config looked like whenever logging was restarted.
    #[derive(Default)]
    struct RecordingLogging {
        events: Mutex<Vec<String>>,
    }

    impl RecordingLogging {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl LoggingSubsystem for RecordingLogging {
        fn start_logging(&self, config: &ServerConfig) -> Result<(), LogError> {
            self.events.lock().unwrap().push(format!(
                "start db={} locked={}",
                config.get("database", "name").unwrap_or_default(),
                config.mutators().is_locked()
            ));
            Ok(())
        }

        fn stop_logging(&self) -> Result<(), LogError> {
            self.events.lock().unwrap().push("stop".to_owned());
            Ok(())
        }
    }

    fn store() -> SharedConfig {
        SharedConfig::new(ServerConfig::default())
    }

    #[test]
    fn guarded_mutators_fail_without_effect() {
        let config = store();
        override_config_attrs(&config);

        let err = config.set("server", "server_name", "evil").unwrap_err();
        assert!(err.is_tamper());
        assert!(err.to_string().contains("pulp_config::Settings::set"));
        assert!(err.to_string().contains("evil"));
        assert_eq!(config.get("server", "server_name").as_deref(), Some("localhost"));

        assert!(config.load_configuration().unwrap_err().is_tamper());
        assert!(
            config
                .write()
                .assign(Settings::new())
                .unwrap_err()
                .is_tamper()
        );
        assert_eq!(config.get("server", "server_name").as_deref(), Some("localhost"));
    }

    #[test]
    fn restore_after_repeated_overrides_returns_original_mutators() {
        let config = store();
        let original = config.read().mutators().clone();
        assert_eq!(original, MutatorTable::default());

        override_config_attrs(&config);
        override_config_attrs(&config);
        override_config_attrs(&config);
        assert!(config.read().mutators().is_locked());

        restore_config_attrs(&config);
        assert_eq!(config.read().mutators(), &original);
        config.set("server", "server_name", "pulp.example.com").unwrap();

        restore_config_attrs(&config);
        assert_eq!(config.read().mutators(), &original);
    }

    #[test]
    fn restore_without_override_is_a_no_op() {
        let config = store();
        restore_config_attrs(&config);
        assert!(config.read().overridden_attrs().is_none());
        assert_eq!(config.read().mutators(), &MutatorTable::default());
    }

    #[test]
    fn block_load_conf_twice_succeeds() {
        let config = store();
        block_load_conf(&config).unwrap();
        block_load_conf(&config).unwrap();
        assert!(config.read().config_files().is_empty());
    }

    #[test]
    fn block_load_conf_propagates_other_failures() {
        let config = store();
        override_config_attrs(&config);
        let err = block_load_conf(&config).unwrap_err();
        assert!(err.is_tamper());
    }

    #[test]
    fn load_test_config_points_at_test_resources_and_locks() {
        let config = store();
        let logging = RecordingLogging::default();

        load_test_config(&config, &logging).unwrap();

        assert_eq!(config.get("database", "name").as_deref(), Some(TEST_DATABASE_NAME));
        assert_eq!(config.get("server", "storage_dir").as_deref(), Some(TEST_STORAGE_DIR));
        assert!(config.read().config_files().is_empty());
        assert!(config.read().mutators().is_locked());
        assert_eq!(
            logging.events(),
            vec!["stop".to_owned(), "start db=pulp_unittest locked=false".to_owned()]
        );
        assert!(config.set("database", "name", "pulp_database").unwrap_err().is_tamper());
    }

    #[test]
    fn load_test_config_can_run_again_while_locked() {
        let config = store();
        let logging = RecordingLogging::default();
        load_test_config(&config, &logging).unwrap();
        load_test_config(&config, &logging).unwrap();

        assert!(config.read().mutators().is_locked());
        assert_eq!(
            config.read().overridden_attrs(),
            Some(&MutatorTable::default())
        );
        assert_eq!(logging.events().len(), 4);
    }

    #[test]
    fn load_test_config_ignores_production_file_but_keeps_others() {
        let mut extra = tempfile::NamedTempFile::new().unwrap();
        writeln!(extra, "[server]\nserver_name = pulp.test\n\n[database]\nname = prod").unwrap();
        let config = SharedConfig::new(ServerConfig::with_config_files([
            PathBuf::from(DEFAULT_CONFIG_FILE),
            extra.path().to_path_buf(),
        ]));

        load_test_config(&config, &RecordingLogging::default()).unwrap();

        assert_eq!(config.get("server", "server_name").as_deref(), Some("pulp.test"));
        assert_eq!(config.get("database", "name").as_deref(), Some(TEST_DATABASE_NAME));
        assert_eq!(config.read().config_files(), &[extra.path().to_path_buf()]);
    }

    #[test]
    fn load_test_config_stops_at_first_failure() {
        struct FailingStart;

        impl LoggingSubsystem for FailingStart {
            fn start_logging(&self, _config: &ServerConfig) -> Result<(), LogError> {
                Err(LogError::InvalidFormat("xml".to_owned()))
            }

            fn stop_logging(&self) -> Result<(), LogError> {
                Ok(())
            }
        }

        let config = store();
        let err = load_test_config(&config, &FailingStart).unwrap_err();
        assert!(matches!(err, HarnessError::Logging(_)));
        assert_eq!(config.get("database", "name").as_deref(), Some(TEST_DATABASE_NAME));
        assert!(!config.read().mutators().is_locked());
    }
}
