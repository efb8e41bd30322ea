use serde::Deserialize;
use std::env;

/// Invalid pagination settings.
#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a non-negative integer, got `{value}`")]
    InvalidSize { name: String, value: String },

    #[error("default page size {default} exceeds the maximum page size {max}")]
    DefaultExceedsMax { default: i32, max: i32 },
}

/// Page size settings applied to every connection built with them.
///
/// With the default settings nothing is applied: a request without `first` or `last` returns the
/// whole connection, and any page size is accepted.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Used as `first` when neither `first` nor `last` is passed.
    pub default_page_size: Option<i32>,

    /// Largest accepted `first` or `last`.
    pub max_page_size: Option<i32>,
}

impl PaginationConfig {
    /// Loads the settings from `RELAY_DEFAULT_PAGE_SIZE` and `RELAY_MAX_PAGE_SIZE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = PaginationConfig {
            default_page_size: read_size("RELAY_DEFAULT_PAGE_SIZE")?,
            max_page_size: read_size("RELAY_MAX_PAGE_SIZE")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the default page size does not exceed the maximum.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.default_page_size, self.max_page_size) {
            (Some(default), Some(max)) if default > max => {
                Err(ConfigError::DefaultExceedsMax { default, max })
            }
            _ => Ok(()),
        }
    }

    /// The `first` applied to requests without `first` or `last`, never above the maximum.
    pub(crate) fn default_first(&self) -> Option<i32> {
        match (self.default_page_size, self.max_page_size) {
            (Some(default), Some(max)) => Some(default.min(max)),
            (default, _) => default,
        }
    }
}

fn read_size(name: &str) -> Result<Option<i32>, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(None);
    };
    match raw.trim().parse::<i32>() {
        Ok(size) if size >= 0 => Ok(Some(size)),
        _ => Err(ConfigError::InvalidSize {
            name: name.to_owned(),
            value: raw,
        }),
    }
}
