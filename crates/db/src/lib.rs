//! Persistence layer: row models, request DTOs and repositories over
//! PostgreSQL.

use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use sqlx::FromRow;

pub mod models;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Row counts of the three catalog tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow, Serialize)]
pub struct CatalogCounts {
    pub franchises: i64,
    pub movies: i64,
    pub characters: i64,
}

/// Count franchises, movies and characters in one round trip.
pub async fn catalog_counts(pool: &DbPool) -> Result<CatalogCounts, sqlx::Error> {
    sqlx::query_as::<_, CatalogCounts>(
        "SELECT
            (SELECT COUNT(*) FROM franchises) AS franchises,
            (SELECT COUNT(*) FROM movies) AS movies,
            (SELECT COUNT(*) FROM characters) AS characters",
    )
    .fetch_one(pool)
    .await
}

/// Apply the embedded migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
