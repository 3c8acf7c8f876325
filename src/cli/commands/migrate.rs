use anyhow::Context;
use tracing::info;

use crate::auth;
use crate::config::{AppConfig, SessionStoreKind};
use crate::database::{migrations, DatabaseManager};

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    info!(database = %config.redacted_database_url(), "running migrations");
    let database = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    migrations::run(database.pool()).await.context("migrations failed")?;
    if config.security.session_store == SessionStoreKind::Postgres {
        auth::postgres_store(database.pool().clone(), true)
            .await
            .context("failed to create the session table")?;
    }
    database.close().await;
    Ok(())
}
