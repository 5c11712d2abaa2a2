use pulp_config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database connection has not been initialized")]
    NotConnected,
    #[error("invalid database name {0:?}")]
    InvalidName(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database error")]
    Driver(#[from] sea_orm::DbErr),
}
