use sqlx::{PgConnection, PgPool, Postgres, Transaction};

use super::DatabaseError;

/// Statements grouped under one commit.
///
/// Dropping a unit of work without calling [`UnitOfWork::commit`] rolls it
/// back, so an early return or a cancelled request never leaves a partial
/// write behind.
pub struct UnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl UnitOfWork {
    pub async fn begin(pool: &PgPool) -> Result<Self, DatabaseError> {
        Ok(Self {
            tx: pool.begin().await?,
        })
    }

    /// Connection every statement in this unit runs on
    pub fn conn(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), DatabaseError> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
