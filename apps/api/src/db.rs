use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates the PostgreSQL pool shared by the profile store, roadmap
/// persistence, and progress tracker. Pool size comes from config
/// (`DB_MAX_CONNECTIONS`).
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to the DreamRoute database (pool size {max_connections})...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("DreamRoute database pool established");
    Ok(pool)
}
