use super::ConnectionPool;
use crate::shared::error::AppError;

mod mapper;
mod queries;
mod records;
mod sync_queue;


pub struct SqliteRepository {
    pool: ConnectionPool,
}

impl SqliteRepository {
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &ConnectionPool {
        &self.pool
    }

    pub async fn initialize(&self) -> Result<(), AppError> {
        self.pool.migrate().await?;
        Ok(())
    }

    pub async fn health_check(&self) -> Result<bool, AppError> {
        let result = sqlx::query("SELECT 1")
            .fetch_one(self.pool.get_pool())
            .await;
        Ok(result.is_ok())
    }
}
