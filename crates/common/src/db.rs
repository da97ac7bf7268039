use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::error::HeraldResult;

/// Seconds to wait for a PostgreSQL connection before giving up.
pub const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Build connection options from either `DATABASE_URL` or the discrete `DB_*` parts.
pub fn connect_options(config: &DatabaseConfig) -> HeraldResult<PgConnectOptions> {
    if let Some(url) = &config.url {
        return Ok(url.parse::<PgConnectOptions>()?);
    }

    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.name)
        .username(&config.user);
    if let Some(password) = &config.password {
        options = options.password(password);
    }
    Ok(options)
}

/// Create a single-connection PostgreSQL pool for a one-shot process.
pub async fn create_pool(config: &DatabaseConfig) -> HeraldResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .connect_with(connect_options(config)?)
        .await?;

    tracing::debug!(host = %config.host, database = %config.name, "Connected to PostgreSQL");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_from_parts() {
        let config = DatabaseConfig {
            password: Some("pw".to_string()),
            host: "db.internal".to_string(),
            port: 6543,
            ..DatabaseConfig::default()
        };
        let options = connect_options(&config).unwrap();
        assert_eq!(options.get_host(), "db.internal");
        assert_eq!(options.get_port(), 6543);
        assert_eq!(options.get_database(), Some("landit_sit_db"));
        assert_eq!(options.get_username(), "landit");
    }

    #[test]
    fn test_connect_options_prefers_url() {
        let config = DatabaseConfig {
            url: Some("postgres://herald:pw@pg.example:5433/agents".to_string()),
            ..DatabaseConfig::default()
        };
        let options = connect_options(&config).unwrap();
        assert_eq!(options.get_host(), "pg.example");
        assert_eq!(options.get_port(), 5433);
        assert_eq!(options.get_database(), Some("agents"));
    }

    #[test]
    fn test_invalid_url_is_error() {
        let config = DatabaseConfig {
            url: Some("not a url".to_string()),
            ..DatabaseConfig::default()
        };
        assert!(connect_options(&config).is_err());
    }
}
