use anyhow::Result;
use sqlx::SqlitePool;

/// Create the store schema. Idempotent; safe to run on every launch.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            dims INTEGER NOT NULL,
            distance TEXT NOT NULL DEFAULT 'cosine'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS points (
            collection TEXT NOT NULL,
            id INTEGER NOT NULL,
            vector BLOB NOT NULL,
            payload_json TEXT NOT NULL DEFAULT '{}',
            PRIMARY KEY (collection, id),
            FOREIGN KEY (collection) REFERENCES collections(name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_points_collection ON points(collection)")
        .execute(pool)
        .await?;

    Ok(())
}
