use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::ConfigError;
use crate::guard::{EntryPoint, Mutator, MutatorTable};
use crate::settings::Settings;

/// Production config file, autoloaded unless removed from the list.
pub const DEFAULT_CONFIG_FILE: &str = "/etc/pulp/server.conf";

/// The configuration store: effective settings, the autoload file list and the mutator table.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    settings: Settings,
    config_files: Vec<PathBuf>,
    mutators: MutatorTable,
    overridden_attrs: Option<MutatorTable>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_config_files([PathBuf::from(DEFAULT_CONFIG_FILE)])
    }
}

impl ServerConfig {
    /// Store holding the defaults, autoloading `files` on the next reload.
    pub fn with_config_files(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            settings: Settings::defaults(),
            config_files: files.into_iter().collect(),
            mutators: MutatorTable::default(),
            overridden_attrs: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.settings.get(section, key)
    }

    pub fn config_files(&self) -> &[PathBuf] {
        &self.config_files
    }

    /// Replace all settings at once.
    pub fn assign(&mut self, settings: Settings) -> Result<(), ConfigError> {
        self.mutators
            .check(EntryPoint::Assign, || vec![format!("{settings:?}")])?;
        self.settings = settings;
        Ok(())
    }

    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        self.mutators.check(EntryPoint::Set, || {
            vec![section.to_owned(), key.to_owned(), value.to_owned()]
        })?;
        self.settings.set(section, key, value);
        Ok(())
    }

    /// Rebuild the settings from defaults plus every file in the autoload list, in order.
    pub fn load_configuration(&mut self) -> Result<(), ConfigError> {
        self.mutators.check(EntryPoint::LoadConfiguration, Vec::new)?;
        let mut settings = Settings::defaults();
        for path in &self.config_files {
            settings.merge_file(path)?;
        }
        self.settings = settings;
        tracing::debug!(files = self.config_files.len(), "configuration loaded");
        Ok(())
    }

    pub fn add_config_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        if self.config_files.iter().any(|p| p == path) {
            return Err(ConfigError::AlreadyAConfigFile {
                path: path.to_path_buf(),
            });
        }
        self.config_files.push(path.to_path_buf());
        self.load_configuration()
    }

    /// Drop `path` from the autoload list and reload.
    ///
    /// Fails with [`ConfigError::NotAConfigFile`] when `path` is not listed.
    pub fn remove_config_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let Some(idx) = self.config_files.iter().position(|p| p == path) else {
            return Err(ConfigError::NotAConfigFile {
                path: path.to_path_buf(),
            });
        };
        self.config_files.remove(idx);
        self.load_configuration()
    }

    /// Verify every autoloaded file exists and can be opened.
    pub fn check_config_files(&self) -> Result<(), ConfigError> {
        for path in &self.config_files {
            if !path.exists() {
                return Err(ConfigError::MissingFile { path: path.clone() });
            }
            std::fs::File::open(path).map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    pub fn mutators(&self) -> &MutatorTable {
        &self.mutators
    }

    pub fn install_mutator(&mut self, entry: EntryPoint, mutator: Mutator) -> Mutator {
        self.mutators.replace(entry, mutator)
    }

    /// Put back a whole table in one step.
    pub fn restore_mutators(&mut self, table: MutatorTable) {
        self.mutators = table;
    }

    pub fn overridden_attrs(&self) -> Option<&MutatorTable> {
        self.overridden_attrs.as_ref()
    }

    /// Snapshot the live mutator table, only the first time this is called.
    ///
    /// Later calls leave the first snapshot untouched, so a table captured while guards
    /// are installed never replaces the real one.
    pub fn record_overridden_attrs(&mut self) {
        if self.overridden_attrs.is_none() {
            self.overridden_attrs = Some(self.mutators.clone());
        }
    }
}

/// Cloneable handle to a shared [`ServerConfig`].
#[derive(Debug, Clone, Default)]
pub struct SharedConfig(Arc<RwLock<ServerConfig>>);

impl SharedConfig {
    pub fn new(config: ServerConfig) -> Self {
        Self(Arc::new(RwLock::new(config)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, ServerConfig> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, ServerConfig> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.read().get(section, key).map(str::to_owned)
    }

    pub fn set(&self, section: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        self.write().set(section, key, value)
    }

    pub fn load_configuration(&self) -> Result<(), ConfigError> {
        self.write().load_configuration()
    }

    pub fn remove_config_file(&self, path: &Path) -> Result<(), ConfigError> {
        self.write().remove_config_file(path)
    }
}

static CONFIG: LazyLock<SharedConfig> = LazyLock::new(SharedConfig::default);

/// The process-wide configuration.
pub fn global() -> &'static SharedConfig {
    &CONFIG
}
