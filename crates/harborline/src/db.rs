//! SQLite connection handling with bounded lock-retry.
//!
//! The store is a single file-backed resource; only one process should
//! hold it open at a time. A second instance hitting lock contention
//! retries with a fixed delay up to the configured attempt budget, then
//! fails with a typed [`StoreError::Locked`] naming the lock location.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

use harborline_core::error::StoreError;

use crate::config::Config;

pub async fn connect(config: &Config) -> Result<SqlitePool, StoreError> {
    let db_path = &config.store.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| StoreError::Backend(e.to_string()))?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match try_open(&options).await {
            Ok(pool) => return Ok(pool),
            Err(err) if is_lock_contention(&err) => {
                if attempt >= config.lock.max_attempts {
                    return Err(StoreError::Locked {
                        path: db_path.display().to_string(),
                        attempts: attempt,
                    });
                }
                tokio::time::sleep(Duration::from_millis(config.lock.retry_delay_ms)).await;
            }
            Err(err) => return Err(StoreError::Backend(err.to_string())),
        }
    }
}

async fn try_open(options: &SqliteConnectOptions) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options.clone())
        .await?;

    // Probe immediately so contention surfaces here, inside the retry
    // loop, rather than on the first real query.
    sqlx::query("PRAGMA schema_version").execute(&pool).await?;

    Ok(pool)
}

fn is_lock_contention(err: &sqlx::Error) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("locked") || message.contains("busy")
}
