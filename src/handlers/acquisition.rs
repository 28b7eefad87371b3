use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    models::{error::Error, race_result::RaceResult},
    utils::{config::Config, db},
};

pub const RACE_RESULTS_SQL: &str = r#"
    SELECT
      ra."year" AS race_year,
      ra."date"::date AS race_date,
      c.country AS circuit_country,
      c."lat" AS circuit_lat,
      c."lng" AS circuit_lng,
      d."driverid" AS driver_id,
      r."positionorder"::integer AS position_order,
      r."points"::numeric AS points
    FROM "results" r
    JOIN "races"   ra ON r."raceid"    = ra."raceid"
    JOIN "drivers" d  ON r."driverid"  = d."driverid"
    JOIN "circuits" c ON ra."circuitid" = c."circuitid"
    "#;

pub async fn fetch_race_results(pool: &PgPool) -> Result<Vec<RaceResult>, Error> {
    let rows = sqlx::query_as::<_, RaceResult>(RACE_RESULTS_SQL)
        .fetch_all(pool)
        .await
        .map_err(Error::Query)?;

    if rows.is_empty() {
        warn!("Race results query returned no rows");
    } else {
        info!(rows = rows.len(), "Race results fetched");
    }
    Ok(rows)
}

/// Runs the results join on an open pool and closes the pool afterwards,
/// whether or not the query succeeded.
pub async fn fetch_and_dispose(pool: &PgPool) -> Result<Vec<RaceResult>, Error> {
    let rows = fetch_race_results(pool).await;
    db::dispose(pool).await;
    rows
}

pub async fn load_race_results(config: &Config) -> Result<Vec<RaceResult>, Error> {
    let pool = db::connect(config).await?;
    fetch_and_dispose(&pool).await
}
