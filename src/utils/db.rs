use std::{str::FromStr, time::Duration};

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::info;

use crate::{models::error::Error, utils::config::Config};

/// Opens the single connection the run needs.
pub async fn connect(config: &Config) -> Result<PgPool, Error> {
    let connect_options = PgConnectOptions::from_str(&config.db_url)
        .map_err(Error::Connection)?
        .statement_cache_capacity(0);

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(connect_options)
        .await
        .map_err(Error::Connection)?;

    info!("Database connection opened");
    Ok(pool)
}

/// Closes the pool and waits for its connection to be released.
pub async fn dispose(pool: &PgPool) {
    pool.close().await;
    info!(open_connections = pool.size(), "Database connection closed");
}
