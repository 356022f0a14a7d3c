use crate::application::ports::RemoteService;
use crate::application::services::{
    DispatcherSettings, MigrationService, NetworkMonitor, SyncDispatcher,
};
use crate::infrastructure::database::{ConnectionPool, SqliteRepository};
use crate::infrastructure::network::ConnectivityState;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;

/// Wires the store, dispatcher, monitor and migration service together.
#[derive(Clone)]
pub struct SyncEngine {
    pub config: AppConfig,
    pub pool: ConnectionPool,
    pub repository: Arc<SqliteRepository>,
    pub connectivity: Arc<ConnectivityState>,
    pub dispatcher: Arc<SyncDispatcher>,
    pub network_monitor: Arc<NetworkMonitor>,
    pub migration_service: Arc<MigrationService>,
}

impl SyncEngine {
    /// Opens the configured database, runs migrations and builds every service.
    pub async fn bootstrap(
        config: AppConfig,
        remote: Arc<dyn RemoteService>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;
        let pool = ConnectionPool::connect(&config.database).await?;
        Self::with_pool(config, pool, remote).await
    }

    pub async fn with_pool(
        config: AppConfig,
        pool: ConnectionPool,
        remote: Arc<dyn RemoteService>,
    ) -> Result<Self, AppError> {
        let repository = Arc::new(SqliteRepository::new(pool.clone()));
        repository.initialize().await?;

        // Online until the platform reports otherwise.
        let connectivity = Arc::new(ConnectivityState::default());

        let dispatcher = Arc::new(SyncDispatcher::new(
            repository.clone(),
            remote,
            connectivity.clone(),
            DispatcherSettings::from(&config.sync),
        ));
        let network_monitor = Arc::new(NetworkMonitor::new(
            connectivity.clone(),
            dispatcher.clone(),
            config.sync.pending_poll(),
        ));
        let migration_service = Arc::new(MigrationService::new(
            repository.clone(),
            Some(dispatcher.clone()),
        ));

        tracing::info!(
            target: "sync::engine",
            auto_sync = config.sync.auto_sync,
            interval_secs = config.sync.sync_interval,
            max_retry = config.sync.max_retry,
            "sync engine ready"
        );

        Ok(Self {
            config,
            pool,
            repository,
            connectivity,
            dispatcher,
            network_monitor,
            migration_service,
        })
    }

    /// Starts the dispatcher timer when auto sync is enabled.
    pub fn start(&self) -> bool {
        if self.config.sync.auto_sync {
            self.dispatcher.start();
            true
        } else {
            tracing::info!(target: "sync::engine", "auto sync disabled");
            false
        }
    }

    pub async fn shutdown(&self) {
        self.dispatcher.stop();
        self.pool.close().await;
    }
}
