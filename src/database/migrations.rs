//! Schema setup for the lists table. The session store creates its own
//! table (see `auth::postgres_store`).
//!
//! Every statement is idempotent, so running this on each start is safe.

use sqlx::PgPool;
use tracing::info;

use super::DatabaseError;

const STATEMENTS: &[(&str, &str)] = &[
    (
        "lists",
        r#"
        CREATE TABLE IF NOT EXISTS lists (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL CHECK (name <> '' AND name = btrim(name)),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "lists_name_idx",
        "CREATE INDEX IF NOT EXISTS lists_name_idx ON lists (name)",
    ),
];

/// Run all migrations in one transaction
pub async fn run(pool: &PgPool) -> Result<(), DatabaseError> {
    info!("Running migrations...");

    let mut tx = pool.begin().await?;
    for (name, sql) in STATEMENTS {
        sqlx::query(sql)
            .execute(&mut *tx)
            .await
            .map_err(|e| DatabaseError::MigrationError(format!("{}: {}", name, e)))?;
    }
    tx.commit().await?;

    info!(count = STATEMENTS.len(), "Migrations complete");
    Ok(())
}
