use anyhow::Context;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use std::path::Path;
use std::sync::Arc;

use crate::shared::config::DatabaseConfig;
use crate::shared::error::AppError;

const MEMORY_URL: &str = "sqlite::memory:";

fn database_file(url: &str) -> Option<&Path> {
    let rest = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        None
    } else {
        Some(Path::new(path))
    }
}

#[derive(Clone)]
pub struct ConnectionPool {
    pool: Arc<SqlitePool>,
}

impl ConnectionPool {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(database_url)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Single-connection in-memory database. The connection is never recycled,
    /// otherwise SQLite would drop the data with it.
    pub async fn from_memory() -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect(MEMORY_URL)
            .await?;

        Ok(Self {
            pool: Arc::new(pool),
        })
    }

    /// Opens (creating if needed) a database file, including its parent directory.
    pub async fn open_file(path: &Path, max_connections: u32) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }
        let url = format!("sqlite:{}?mode=rwc", path.display());
        Ok(Self::new(&url, max_connections).await?)
    }

    /// Connects using the configured url, creating the parent directory of a
    /// file-backed database first.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let url = config.url.trim();
        if url == MEMORY_URL {
            return Ok(Self::from_memory().await?);
        }

        if let Some(parent) = database_file(url).and_then(Path::parent) {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }
        Ok(Self::new(url, config.max_connections).await?)
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(self.pool.as_ref()).await
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_file_is_extracted_from_url() {
        assert_eq!(
            database_file("sqlite:/tmp/liftlog/liftlog.db?mode=rwc"),
            Some(Path::new("/tmp/liftlog/liftlog.db"))
        );
        assert_eq!(
            database_file("sqlite://./data/liftlog.db"),
            Some(Path::new("./data/liftlog.db"))
        );
        assert_eq!(database_file("sqlite::memory:"), None);
        assert_eq!(database_file("postgres://localhost/db"), None);
    }

    #[tokio::test]
    async fn connect_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("liftlog.db");
        let config = DatabaseConfig {
            url: format!("sqlite:{}?mode=rwc", path.display()),
            max_connections: 2,
        };

        let pool = ConnectionPool::connect(&config).await.unwrap();
        pool.migrate().await.unwrap();

        assert!(path.exists());
        pool.close().await;
    }
}
