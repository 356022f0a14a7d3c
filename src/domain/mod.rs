pub mod entities;
pub mod value_objects;

pub use entities::{
    MigrationSummary, SyncCommand, SyncQueueItem, SyncQueueItemDraft, TrainingRecord, WorkoutSet,
};
pub use value_objects::{
    EntityKind, OwnerId, RecordId, SyncOperation, SyncPayload, SyncQueueId, GUEST_OWNER_ID,
};
