//! Connection pooling for the hosted TiDB cluster (MySQL wire protocol).

use diesel_async::AsyncMysqlConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::deadpool::Pool;

pub type DbPool = Pool<AsyncMysqlConnection>;

pub type PoolError = deadpool::managed::PoolError<diesel_async::pooled_connection::PoolError>;

#[derive(Debug, thiserror::Error)]
pub enum ConnectionPoolError {
    #[error("failed to build connection pool: {0}")]
    Build(#[from] deadpool::managed::BuildError),
    #[error("database unreachable: {0}")]
    Checkout(#[from] PoolError),
}

/// Builds the shared connection pool. Connections are acquired per unit of
/// work and returned to the pool when dropped.
///
/// Pool construction itself is lazy, so one connection is checked out up
/// front: a bad DATABASE_URL fails here instead of midway through a batch.
pub async fn establish_connection_pool(database_url: &str) -> Result<DbPool, ConnectionPoolError> {
    let manager = AsyncDieselConnectionManager::<AsyncMysqlConnection>::new(database_url);
    let pool = Pool::builder(manager).build()?;
    pool.get().await?;
    Ok(pool)
}
