pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{
    AuthLifecycleEvent, AuthLifecycleStage, ConnectivityProbe, ParkedItemObserver, PendingBatch,
    RejectedQueueRow, RemoteError, RemoteService, SyncQueueRepository, TrainingRecordRepository,
};
pub use application::services::{
    DispatcherSettings, MigrationOutcome, MigrationPhase, MigrationService, NetworkMonitor,
    NetworkStatusSubscription, SyncDispatcher, SyncPassOutcome, SyncPassReport, SyncStatus,
};
pub use infrastructure::network::{ConnectivityEvent, ConnectivityState};
pub use infrastructure::remote::RestRemoteService;
pub use shared::{AppConfig, AppError, Result};
pub use state::SyncEngine;

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "liftlog_sync=debug,sync=debug,store=debug,remote=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
