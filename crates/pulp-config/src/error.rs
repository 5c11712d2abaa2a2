use std::path::PathBuf;

/// Raised by a guard sentinel when a locked mutator is invoked.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "attempt to modify the config during a test run has been blocked: \
     {entry_point} was called with args {args:?}"
)]
pub struct TamperError {
    pub entry_point: String,
    pub args: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Tamper(#[from] TamperError),
    #[error("file, {}, not a configuration file", .path.display())]
    NotAConfigFile { path: PathBuf },
    #[error("file, {}, already a configuration file", .path.display())]
    AlreadyAConfigFile { path: PathBuf },
    #[error("cannot find configuration file: {}", .path.display())]
    MissingFile { path: PathBuf },
    #[error("cannot read configuration file: {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("missing option [{section}] {key}")]
    MissingOption { section: String, key: String },
    #[error("invalid value {value:?} for [{section}] {key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

impl ConfigError {
    /// `true` for the condition raised when a guarded mutator was called.
    pub fn is_tamper(&self) -> bool {
        matches!(self, Self::Tamper(_))
    }
}
