//! Database access for the PPM service
//!
//! Measurements are stored in SQLite, keyed by an opaque UUID assigned at
//! insert time.

pub mod measurements;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the measurements table if it does not exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS measurements (
            id TEXT PRIMARY KEY,
            b REAL NOT NULL,
            fit_frequency REAL NOT NULL,
            fft_frequency REAL NOT NULL,
            fft_amplitude REAL NOT NULL,
            t0 REAL NOT NULL,
            a REAL NOT NULL,
            x0_error REAL NOT NULL,
            f_error REAL NOT NULL,
            t0_error REAL NOT NULL,
            a_error REAL NOT NULL,
            y0_error REAL NOT NULL,
            taken_at REAL NOT NULL,
            sample_rate REAL NOT NULL,
            number_of_samples INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (measurements)");

    Ok(())
}
