use crate::domain::entities::SyncQueueItem;
use crate::domain::value_objects::{EntityKind, RecordId, SyncOperation, SyncPayload};

/// A queue item resolved to exactly one remote call.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncCommand {
    CreateWorkout { id: RecordId, payload: SyncPayload },
    UpdateWorkout { id: RecordId, payload: SyncPayload },
    DeleteWorkout { id: RecordId },
    CreateTemplate { id: RecordId, payload: SyncPayload },
    UpdateTemplate { id: RecordId, payload: SyncPayload },
    DeleteTemplate { id: RecordId },
    CreateProgram { id: RecordId, payload: SyncPayload },
    UpdateProgram { id: RecordId, payload: SyncPayload },
    DeleteProgram { id: RecordId },
    /// Personal records are produced by the backend; nothing is sent.
    PersonalRecord { id: RecordId, operation: SyncOperation },
}

impl SyncCommand {
    pub fn from_item(item: &SyncQueueItem) -> Self {
        let id = item.target_record_id.clone();
        let payload = item.payload.clone();
        match (item.entity_kind, item.operation) {
            (EntityKind::Workout, SyncOperation::Create) => Self::CreateWorkout { id, payload },
            (EntityKind::Workout, SyncOperation::Update) => Self::UpdateWorkout { id, payload },
            (EntityKind::Workout, SyncOperation::Delete) => Self::DeleteWorkout { id },
            (EntityKind::Template, SyncOperation::Create) => Self::CreateTemplate { id, payload },
            (EntityKind::Template, SyncOperation::Update) => Self::UpdateTemplate { id, payload },
            (EntityKind::Template, SyncOperation::Delete) => Self::DeleteTemplate { id },
            (EntityKind::Program, SyncOperation::Create) => Self::CreateProgram { id, payload },
            (EntityKind::Program, SyncOperation::Update) => Self::UpdateProgram { id, payload },
            (EntityKind::Program, SyncOperation::Delete) => Self::DeleteProgram { id },
            (EntityKind::PersonalRecord, operation) => Self::PersonalRecord { id, operation },
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::PersonalRecord { .. })
    }
}
