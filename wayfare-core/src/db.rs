use serde::Serialize;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::DatabaseConfig;

/// What the health endpoint reports about the flights database.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbHealth {
    pub server_version: String,
    pub flights: i64,
    pub bookings: i64,
}

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

/// Server version plus row counts; fails when either table is missing.
pub async fn health_check(pool: &PgPool) -> Result<DbHealth, sqlx::Error> {
    let (server_version,): (String,) = sqlx::query_as("SHOW server_version")
        .fetch_one(pool)
        .await?;
    Ok(DbHealth {
        server_version,
        flights: count_rows(pool, "flights").await?,
        bookings: count_rows(pool, "bookings").await?,
    })
}

async fn count_rows(pool: &PgPool, table: &'static str) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*)::bigint FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(n)
}
