use crate::error::DbError;
use crate::models::subtitle::DEFAULT_PAGE_ROWS;

/// Database configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Upper bound on pooled connections (default: `20`).
    pub max_connections: u32,
    /// Seconds to wait for a free connection (default: `5`).
    pub acquire_timeout_secs: u64,
    /// Page size used when a caller does not pick one (default: `100`).
    pub default_page_rows: i64,
}

impl DbConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default    |
    /// |---------------------------|------------|
    /// | `DATABASE_URL`            | (required) |
    /// | `DB_MAX_CONNECTIONS`      | `20`       |
    /// | `DB_ACQUIRE_TIMEOUT_SECS` | `5`        |
    /// | `DEFAULT_PAGE_ROWS`       | `100`      |
    pub fn from_env() -> Result<Self, DbError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| DbError::Config("DATABASE_URL must be set".into()))?;

        let max_connections = parse_var("DB_MAX_CONNECTIONS", 20u32)?;
        let acquire_timeout_secs = parse_var("DB_ACQUIRE_TIMEOUT_SECS", 5u64)?;
        let default_page_rows = parse_var("DEFAULT_PAGE_ROWS", DEFAULT_PAGE_ROWS)?;

        if default_page_rows <= 0 {
            return Err(DbError::Config(
                "DEFAULT_PAGE_ROWS must be a positive integer".into(),
            ));
        }

        Ok(Self {
            database_url,
            max_connections,
            acquire_timeout_secs,
            default_page_rows,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, DbError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| DbError::Config(format!("{name} must be a valid number, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}
