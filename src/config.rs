use std::str::FromStr;

use anyhow::{anyhow, Context};
use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::ConnectOptions;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_host: String,
    pub db_port: u16,
    pub db_name: String,
    pub db_user: String,
    pub db_password: String,
    pub db_ssl: PgSslMode,
    pub db_max_connections: u32,
    /// Log every SQL statement at info level.
    pub db_echo: bool,
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| get(key).ok_or_else(|| anyhow!("{} must be set", key));

        let db_ssl = get("DB_SSL").unwrap_or_else(|| "require".to_string());

        Ok(Self {
            db_host: required("DB_HOST")?,
            db_port: get("DB_PORT")
                .unwrap_or_else(|| "5432".to_string())
                .parse()
                .context("DB_PORT must be a valid port number")?,
            db_name: required("DB_NAME")?,
            db_user: required("DB_USER")?,
            db_password: required("DB_PASSWORD")?,
            db_ssl: PgSslMode::from_str(&db_ssl)
                .with_context(|| format!("DB_SSL has unknown ssl mode {:?}", db_ssl))?,
            db_max_connections: get("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "10".to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a positive integer")?,
            db_echo: get("DB_ECHO")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            host: get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: get("API_PORT")
                .unwrap_or_else(|| "8000".to_string())
                .parse()
                .context("API_PORT must be a valid port number")?,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .database(&self.db_name)
            .username(&self.db_user)
            .password(&self.db_password)
            .ssl_mode(self.db_ssl);

        if self.db_echo {
            options.log_statements(log::LevelFilter::Info)
        } else {
            options.disable_statement_logging()
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
