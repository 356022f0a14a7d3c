pub mod auth_lifecycle;
pub mod clock;
pub mod connectivity;
pub mod local_store;
pub mod remote_service;
pub mod sync_observer;

pub use auth_lifecycle::{AuthLifecycleEvent, AuthLifecycleStage};
pub use clock::{Clock, SystemClock};
pub use connectivity::ConnectivityProbe;
pub use local_store::{
    PendingBatch, RejectedQueueRow, SyncQueueRepository, TrainingRecordRepository,
};
pub use remote_service::{RemoteError, RemoteService};
pub use sync_observer::ParkedItemObserver;
