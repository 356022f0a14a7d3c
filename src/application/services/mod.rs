pub mod migration_service;
pub mod network_monitor;
pub mod sync_dispatcher;

pub use migration_service::{MigrationOutcome, MigrationPhase, MigrationService};
pub use network_monitor::{NetworkMonitor, NetworkStatusSubscription};
pub use sync_dispatcher::{
    DispatcherSettings, SyncDispatcher, SyncPassOutcome, SyncPassReport, SyncStatus,
};
