use std::time::Duration;

use sqlx::PgPool;
use tokio::task::JoinHandle;
use tower_sessions::ExpiredDeletion;
use tower_sessions_sqlx_store::PostgresStore;
use tracing::{debug, warn};

/// How often expired session rows are swept out of Postgres
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(15 * 60);

/// Sessions kept in `tower_sessions.session`, next to the application data.
/// Creates the table when `migrate` is set.
pub async fn postgres_store(pool: PgPool, migrate: bool) -> Result<PostgresStore, sqlx::Error> {
    let store = PostgresStore::new(pool);
    if migrate {
        store.migrate().await?;
    }
    Ok(store)
}

/// Deletes expired sessions now and then every `every` until the task is aborted
pub fn spawn_expired_session_cleanup(store: PostgresStore, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            match store.delete_expired().await {
                Ok(()) => debug!("deleted expired sessions"),
                Err(e) => warn!(error = %e, "failed to delete expired sessions"),
            }
        }
    })
}
