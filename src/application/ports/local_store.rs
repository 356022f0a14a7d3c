use crate::domain::entities::{
    MigrationSummary, SyncQueueItem, SyncQueueItemDraft, TrainingRecord, WorkoutSet,
};
use crate::domain::value_objects::{EntityKind, OwnerId, RecordId, SyncQueueId};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait TrainingRecordRepository: Send + Sync {
    async fn get(&self, kind: EntityKind, id: &RecordId)
        -> Result<Option<TrainingRecord>, AppError>;
    /// Upserts the record. Local writes always land unsynced.
    async fn put(&self, record: &TrainingRecord) -> Result<(), AppError>;
    /// Upserts every record in one transaction.
    async fn bulk_put(&self, records: &[TrainingRecord]) -> Result<(), AppError>;
    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<bool, AppError>;
    async fn list_by_owner(
        &self,
        kind: EntityKind,
        owner: &OwnerId,
    ) -> Result<Vec<TrainingRecord>, AppError>;
    async fn list_by_kind(&self, kind: EntityKind) -> Result<Vec<TrainingRecord>, AppError>;
    async fn count_by_owner(&self, kind: EntityKind, owner: &OwnerId) -> Result<u64, AppError>;
    async fn mark_synced(&self, kind: EntityKind, id: &RecordId) -> Result<bool, AppError>;

    /// Replaces every set of a workout atomically.
    async fn replace_workout_sets(
        &self,
        workout_id: &RecordId,
        sets: &[WorkoutSet],
    ) -> Result<(), AppError>;
    async fn list_workout_sets(&self, workout_id: &RecordId) -> Result<Vec<WorkoutSet>, AppError>;

    /// Moves every record owned by `from` to `to` and enqueues a create for each
    /// pushable record, all in one transaction.
    async fn reassign_owner(
        &self,
        from: &OwnerId,
        to: &OwnerId,
        at: DateTime<Utc>,
    ) -> Result<MigrationSummary, AppError>;
}

/// A queue row that could not be decoded, such as one naming an unknown kind.
#[derive(Debug)]
pub struct RejectedQueueRow {
    pub id: SyncQueueId,
    pub error: AppError,
}

/// Pending items plus the rows among them that failed to decode.
#[derive(Debug, Default)]
pub struct PendingBatch {
    pub items: Vec<SyncQueueItem>,
    pub rejected: Vec<RejectedQueueRow>,
}

#[async_trait]
pub trait SyncQueueRepository: Send + Sync {
    async fn enqueue(&self, draft: &SyncQueueItemDraft) -> Result<SyncQueueId, AppError>;
    async fn get_item(&self, id: SyncQueueId) -> Result<Option<SyncQueueItem>, AppError>;
    /// Items below the attempt cap, oldest first. Undecodable rows are
    /// reported separately instead of failing the whole read.
    async fn load_pending(&self, max_attempts: u32) -> Result<PendingBatch, AppError>;
    /// Like [`SyncQueueRepository::load_pending`], with undecodable rows logged
    /// and left out. The other listings behave the same way.
    async fn list_pending(&self, max_attempts: u32) -> Result<Vec<SyncQueueItem>, AppError>;
    async fn list_parked(&self, max_attempts: u32) -> Result<Vec<SyncQueueItem>, AppError>;
    async fn list_all(&self) -> Result<Vec<SyncQueueItem>, AppError>;
    async fn count_pending(&self, max_attempts: u32) -> Result<u64, AppError>;
    async fn delete_item(&self, id: SyncQueueId) -> Result<(), AppError>;
    /// Deletes an acknowledged item and, when `mark_synced` is set, flags its
    /// target record as synced in the same transaction.
    async fn acknowledge(&self, item: &SyncQueueItem, mark_synced: bool) -> Result<(), AppError>;
    /// Increments `attempts` by one and stamps the failure. Returns the new count.
    async fn record_failure(
        &self,
        id: SyncQueueId,
        at: DateTime<Utc>,
        error: &str,
    ) -> Result<u32, AppError>;
    async fn clear(&self) -> Result<u64, AppError>;
}
