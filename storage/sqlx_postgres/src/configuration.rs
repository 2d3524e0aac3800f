use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use shared_kernel::configuration::config;
use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(Debug, Deserialize)]
pub struct Settings {
    database: DbSettings,
}

#[derive(Debug, Deserialize)]
pub struct DbSettings {
    host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    port: u16,
    username: String,
    password: Secret<String>,
    database_name: String,
    require_ssl: bool,
}

impl Settings {
    fn parse() -> anyhow::Result<Self> {
        config::<Settings>()
    }

    pub fn with_db() -> anyhow::Result<PgConnectOptions> {
        let config = Self::parse()?.database;
        let ssl_mode = if config.require_ssl {
            PgSslMode::Require
        } else {
            PgSslMode::Prefer
        };
        Ok(PgConnectOptions::new()
            .host(&config.host)
            .username(&config.username)
            .password(config.password.expose_secret())
            .port(config.port)
            .ssl_mode(ssl_mode)
            .database(&config.database_name))
    }
}
