use pulp_config::ConfigError;
use pulp_core::logs::LogError;
use pulp_db::DbError;

#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LogError),
    #[error(transparent)]
    Database(#[from] DbError),
}

impl HarnessError {
    pub fn is_tamper(&self) -> bool {
        matches!(self, Self::Config(e) if e.is_tamper())
    }
}
