use crate::domain::value_objects::{
    EntityKind, RecordId, SyncOperation, SyncPayload, SyncQueueId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncQueueItem {
    pub id: SyncQueueId,
    pub entity_kind: EntityKind,
    pub operation: SyncOperation,
    pub target_record_id: RecordId,
    pub payload: SyncPayload,
    pub enqueued_at: DateTime<Utc>,
    pub attempts: u32,
    pub last_attempt_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

impl SyncQueueItem {
    /// Parked items have used up their retry budget and are no longer dispatched.
    pub fn is_parked(&self, max_attempts: u32) -> bool {
        self.attempts >= max_attempts
    }
}

/// A mutation waiting to be appended to the queue.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncQueueItemDraft {
    pub entity_kind: EntityKind,
    pub operation: SyncOperation,
    pub target_record_id: RecordId,
    pub payload: SyncPayload,
    pub enqueued_at: DateTime<Utc>,
}

impl SyncQueueItemDraft {
    pub fn new(
        entity_kind: EntityKind,
        operation: SyncOperation,
        target_record_id: RecordId,
        payload: SyncPayload,
        enqueued_at: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_kind,
            operation,
            target_record_id,
            payload,
            enqueued_at,
        }
    }
}
