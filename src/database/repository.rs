use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use crate::database::manager::DatabaseError;
use crate::database::models::{List, ListName};
use crate::database::unit_of_work::UnitOfWork;

/// Storage contract for lists.
///
/// Dropping a returned future cancels the in-flight statement; axum drops the
/// handler future when the client goes away.
#[async_trait]
pub trait ListRepository: Send + Sync {
    /// All lists ordered by name. Empty when there are none.
    async fn filter_lists(&self) -> Result<Vec<List>, DatabaseError>;

    /// `DatabaseError::NotFound` when no row has this id.
    async fn get_list_by_id(&self, id: i64) -> Result<List, DatabaseError>;

    async fn create_list(&self, name: &ListName) -> Result<List, DatabaseError>;

    /// Returns the stored row untouched when the name is unchanged.
    async fn update_list_by_id(&self, id: i64, name: &ListName) -> Result<List, DatabaseError>;

    /// Deleting an id that does not exist is not an error.
    async fn delete_list_by_id(&self, id: i64) -> Result<(), DatabaseError>;
}

/// Postgres-backed [`ListRepository`]
#[derive(Clone)]
pub struct PgListRepository {
    pool: PgPool,
}

impl PgListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListRepository for PgListRepository {
    async fn filter_lists(&self) -> Result<Vec<List>, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        Ok(statements::select_all(&mut conn).await?)
    }

    async fn get_list_by_id(&self, id: i64) -> Result<List, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        statements::select_by_id(&mut conn, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn create_list(&self, name: &ListName) -> Result<List, DatabaseError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;
        let list = statements::insert(uow.conn(), name.as_str()).await?;
        uow.commit().await?;
        Ok(list)
    }

    async fn update_list_by_id(&self, id: i64, name: &ListName) -> Result<List, DatabaseError> {
        let mut uow = UnitOfWork::begin(&self.pool).await?;

        let current = statements::select_for_update(uow.conn(), id)
            .await?
            .ok_or_else(|| not_found(id))?;

        if current.name == name.as_str() {
            uow.rollback().await?;
            return Ok(current);
        }

        let list = statements::update_name(uow.conn(), id, name.as_str())
            .await?
            .ok_or_else(|| not_found(id))?;
        uow.commit().await?;
        Ok(list)
    }

    async fn delete_list_by_id(&self, id: i64) -> Result<(), DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let affected = statements::delete(&mut conn, id).await?;
        tracing::debug!(id, affected, "deleted list");
        Ok(())
    }
}

fn not_found(id: i64) -> DatabaseError {
    DatabaseError::NotFound(format!("List {} not found", id))
}

/// One parameterized statement per function. Each takes the connection to run
/// on, so the same statement serves a pooled connection or a unit of work.
mod statements {
    use super::*;

    const COLUMNS: &str = "id, name, created_at, updated_at";

    pub async fn select_all(conn: &mut PgConnection) -> Result<Vec<List>, sqlx::Error> {
        let sql = format!("SELECT {} FROM lists ORDER BY name ASC, id ASC", COLUMNS);
        sqlx::query_as::<_, List>(&sql).fetch_all(conn).await
    }

    pub async fn select_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<List>, sqlx::Error> {
        let sql = format!("SELECT {} FROM lists WHERE id = $1 LIMIT 1", COLUMNS);
        sqlx::query_as::<_, List>(&sql).bind(id).fetch_optional(conn).await
    }

    pub async fn select_for_update(conn: &mut PgConnection, id: i64) -> Result<Option<List>, sqlx::Error> {
        let sql = format!("SELECT {} FROM lists WHERE id = $1 FOR UPDATE", COLUMNS);
        sqlx::query_as::<_, List>(&sql).bind(id).fetch_optional(conn).await
    }

    pub async fn insert(conn: &mut PgConnection, name: &str) -> Result<List, sqlx::Error> {
        let sql = format!("INSERT INTO lists (name) VALUES ($1) RETURNING {}", COLUMNS);
        sqlx::query_as::<_, List>(&sql).bind(name).fetch_one(conn).await
    }

    pub async fn update_name(conn: &mut PgConnection, id: i64, name: &str) -> Result<Option<List>, sqlx::Error> {
        let sql = format!(
            "UPDATE lists SET name = $1, updated_at = clock_timestamp() WHERE id = $2 RETURNING {}",
            COLUMNS
        );
        sqlx::query_as::<_, List>(&sql)
            .bind(name)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn delete(conn: &mut PgConnection, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM lists WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}
