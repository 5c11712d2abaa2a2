//! Mutator table for the config store.
//!
//! Every mutating entry point of [`ServerConfig`](crate::ServerConfig) consults this table
//! before touching state. A [`Mutator::Guarded`] slot turns the call into a [`TamperError`].

use std::fmt;

use crate::error::TamperError;

/// The entry points of the store that can be guarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryPoint {
    /// Whole-settings assignment.
    Assign,
    /// Full reload from defaults and the autoload list.
    LoadConfiguration,
    /// Single-option write.
    Set,
}

impl EntryPoint {
    pub const ALL: [EntryPoint; 3] = [Self::Assign, Self::LoadConfiguration, Self::Set];

    pub fn qualified_name(self) -> &'static str {
        match self {
            Self::Assign => "pulp_config::ServerConfig::assign",
            Self::LoadConfiguration => "pulp_config::ServerConfig::load_configuration",
            Self::Set => "pulp_config::Settings::set",
        }
    }
}

impl fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.qualified_name())
    }
}

/// Stands in for a mutator and refuses every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sentinel {
    name: String,
}

impl Sentinel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn invoke(&self, args: Vec<String>) -> TamperError {
        TamperError {
            entry_point: self.name.clone(),
            args,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mutator {
    #[default]
    Live,
    Guarded(Sentinel),
}

impl Mutator {
    pub fn is_guarded(&self) -> bool {
        matches!(self, Self::Guarded(_))
    }
}

/// One [`Mutator`] per [`EntryPoint`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutatorTable {
    assign: Mutator,
    load_configuration: Mutator,
    set: Mutator,
}

impl MutatorTable {
    pub fn get(&self, entry: EntryPoint) -> &Mutator {
        match entry {
            EntryPoint::Assign => &self.assign,
            EntryPoint::LoadConfiguration => &self.load_configuration,
            EntryPoint::Set => &self.set,
        }
    }

    /// Swap in `mutator`, returning what was installed before.
    pub fn replace(&mut self, entry: EntryPoint, mutator: Mutator) -> Mutator {
        let slot = match entry {
            EntryPoint::Assign => &mut self.assign,
            EntryPoint::LoadConfiguration => &mut self.load_configuration,
            EntryPoint::Set => &mut self.set,
        };
        std::mem::replace(slot, mutator)
    }

    pub fn is_locked(&self) -> bool {
        EntryPoint::ALL.iter().any(|e| self.get(*e).is_guarded())
    }

    /// Ok when `entry` is live, otherwise the sentinel's tamper error.
    pub fn check(
        &self,
        entry: EntryPoint,
        args: impl FnOnce() -> Vec<String>,
    ) -> Result<(), TamperError> {
        match self.get(entry) {
            Mutator::Live => Ok(()),
            Mutator::Guarded(sentinel) => Err(sentinel.invoke(args())),
        }
    }
}
