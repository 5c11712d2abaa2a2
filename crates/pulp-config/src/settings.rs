use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ConfigError;

/// Parsed configuration: `section -> key -> value`, all strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|options| options.get(key))
            .map(String::as_str)
    }

    /// Like [`Settings::get`] but a missing option is an error.
    pub fn require(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        self.get(section, key)
            .ok_or_else(|| ConfigError::MissingOption {
                section: section.to_owned(),
                key: key.to_owned(),
            })
    }

    /// Boolean option using the usual INI spellings (`true/yes/on/1`, `false/no/off/0`).
    pub fn get_bool(&self, section: &str, key: &str) -> Result<bool, ConfigError> {
        let value = self.require(section, key)?;
        match value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" => Ok(false),
            _ => Err(invalid(section, key, value)),
        }
    }

    pub fn get_u32(&self, section: &str, key: &str) -> Result<u32, ConfigError> {
        let value = self.require(section, key)?;
        value.parse().map_err(|_| invalid(section, key, value))
    }

    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.get(section, key).is_some()
    }

    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// Unguarded write. The store wraps this behind its `set` entry point.
    pub(crate) fn set(&mut self, section: &str, key: &str, value: &str) {
        self.sections
            .entry(section.to_owned())
            .or_default()
            .insert(key.to_owned(), value.to_owned());
    }

    /// Merge INI text over the current values. Later keys win.
    pub fn merge_ini(&mut self, text: &str) -> Result<(), ConfigError> {
        let mut current: Option<String> = None;
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(header) = line.strip_prefix('[') {
                let name = header.strip_suffix(']').ok_or_else(|| ConfigError::Parse {
                    line: idx + 1,
                    message: format!("unterminated section header {line:?}"),
                })?;
                let name = name.trim();
                self.sections.entry(name.to_owned()).or_default();
                current = Some(name.to_owned());
                continue;
            }
            let Some(section) = current.as_deref() else {
                return Err(ConfigError::Parse {
                    line: idx + 1,
                    message: "option outside of any section".to_owned(),
                });
            };
            // Whichever delimiter comes first splits the line; values may contain the other.
            let (key, value) = line
                .find(['=', ':'])
                .map(|idx| (&line[..idx], &line[idx + 1..]))
                .ok_or_else(|| ConfigError::Parse {
                    line: idx + 1,
                    message: format!("expected `key = value`, got {line:?}"),
                })?;
            self.set(section, key.trim(), value.trim());
        }
        Ok(())
    }

    /// Merge a config file. A file that does not exist is skipped.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file absent, skipping");
                return Ok(());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        self.merge_ini(&text)
    }
}

fn invalid(section: &str, key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_owned(),
        key: key.to_owned(),
        value: value.to_owned(),
    }
}
