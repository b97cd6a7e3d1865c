use std::{fmt::Display, str::FromStr};

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub session_inactivity: time::Duration,
    pub bcrypt_cost: u32,
}

impl Config {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Config> {
        Ok(Config {
            database_url: var_or("DATABASE_URL", "sqlite://roomhub.db?mode=rwc".to_owned())?,
            host: var_or("HOST", "0.0.0.0".to_owned())?,
            port: var_or("PORT", 8080)?,
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 16)?,
            session_inactivity: time::Duration::minutes(var_or("SESSION_INACTIVITY_MINUTES", 60)?),
            bcrypt_cost: var_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }
}

fn var_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    match dotenv::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("invalid {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
