// ============================================================================
// Data Access Layer
// ============================================================================
//
// Repository traits are the seam between services and storage. Two backends:
// - postgres: sqlx over a PgPool (production)
// - memory:   InMemoryStore, used by service and HTTP tests
//
// ============================================================================

#[cfg(test)]
mod memory;
mod postgres;
mod repositories;

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;

#[cfg(test)]
pub use memory::InMemoryStore;
pub use postgres::{
    PgDeliveryInformationRepository, PgDeliveryRepository, PgMedicineRepository, PgOrderItemRepository,
    PgOrderRepository,
};
pub use repositories::*;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Soft-delete state of a catalog row. Only `Active` rows leave a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MedicineLifecycle {
    Active,
    Deleted,
}

/// Future returned by a unit of work run inside [`Database::transaction`].
pub type TxFuture<'c, T> = Pin<Box<dyn Future<Output = RepositoryResult<T>> + Send + 'c>>;

/// Shared handle to the connection pool.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(&config.url)
            .await?;

        tracing::info!(max_connections = config.max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run `work` inside a transaction: commit on `Ok`, roll back on `Err`.
    pub async fn transaction<T, F>(&self, work: F) -> RepositoryResult<T>
    where
        T: Send,
        F: for<'c> FnOnce(&'c mut PgConnection) -> TxFuture<'c, T> + Send,
    {
        let mut tx = self.pool.begin().await?;

        match work(&mut *tx).await {
            Ok(value) => {
                tx.commit().await?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "Transaction rollback failed");
                }
                Err(err)
            }
        }
    }
}
