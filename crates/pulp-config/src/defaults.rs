//! Built-in configuration values, applied before any config file is merged.

use crate::settings::Settings;

const DEFAULTS: &[(&str, &[(&str, &str)])] = &[
    (
        "authentication",
        &[
            ("consumer_header", "x-pulp-consumer-id"),
            ("user_header", "x-pulp-remote-user"),
        ],
    ),
    (
        "database",
        &[
            ("name", "pulp_database"),
            ("seeds", "localhost:5432"),
            ("username", "pulp"),
            ("password", ""),
            ("max_pool_size", "10"),
        ],
    ),
    (
        "server",
        &[
            ("server_name", "localhost"),
            ("bind_address", "0.0.0.0:3110"),
            ("storage_dir", "/var/lib/pulp/"),
            ("default_login", "admin"),
            ("debugging_mode", "false"),
            ("log_level", "info"),
            ("log_format", "compact"),
        ],
    ),
];

impl Settings {
    /// Fresh settings holding only the built-in defaults.
    pub fn defaults() -> Self {
        let mut settings = Self::new();
        for (section, options) in DEFAULTS {
            for (key, value) in *options {
                settings.set(section, key, value);
            }
        }
        settings
    }
}
