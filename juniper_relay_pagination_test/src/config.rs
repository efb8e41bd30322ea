//! App configuration loaded from environment variables.

use anyhow::{Context, Result};
use juniper_relay_pagination::PaginationConfig;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server port
    pub port: u16,

    /// Page size settings for every connection.
    pub pagination: PaginationConfig,
}

impl AppConfig {
    /// Reads `PORT` (default 8080) and the `RELAY_*_PAGE_SIZE` settings.
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(port) => port.parse().context("PORT must be a valid port number")?,
            Err(_) => 8080,
        };
        let pagination = PaginationConfig::from_env().context("invalid pagination settings")?;

        Ok(AppConfig { port, pagination })
    }
}
