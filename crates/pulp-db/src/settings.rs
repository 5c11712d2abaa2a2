use pulp_config::{ConfigError, ServerConfig};
use url::Url;

/// Connection parameters read from the `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    pub name: String,
    /// `host:port` of the server.
    pub seeds: String,
    pub username: String,
    pub password: String,
    pub max_pool_size: u32,
}

impl DatabaseSettings {
    pub fn from_config(config: &ServerConfig) -> Result<Self, ConfigError> {
        let settings = config.settings();
        Ok(Self {
            name: settings.require("database", "name")?.to_owned(),
            seeds: settings.require("database", "seeds")?.to_owned(),
            username: settings.require("database", "username")?.to_owned(),
            password: settings.get("database", "password").unwrap_or("").to_owned(),
            max_pool_size: settings.get_u32("database", "max_pool_size")?,
        })
    }

    /// `postgres://` URL for `database` on the configured server. Credentials are
    /// percent-encoded.
    pub fn url(&self, database: &str) -> Result<String, ConfigError> {
        let invalid = |key: &str, value: &str| ConfigError::InvalidValue {
            section: "database".to_owned(),
            key: key.to_owned(),
            value: value.to_owned(),
        };

        let mut url = Url::parse(&format!("postgres://{}", self.seeds))
            .map_err(|_| invalid("seeds", &self.seeds))?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(invalid("seeds", &self.seeds));
        }
        url.set_username(&self.username)
            .map_err(|()| invalid("username", &self.username))?;
        if !self.password.is_empty() {
            url.set_password(Some(&self.password))
                .map_err(|()| invalid("password", "<hidden>"))?;
        }
        url.set_path(database);
        Ok(url.into())
    }
}
