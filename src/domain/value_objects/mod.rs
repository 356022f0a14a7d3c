mod entity_kind;
mod owner_id;
mod record_id;
mod sync_operation;
mod sync_payload;
mod sync_queue_id;

pub use entity_kind::EntityKind;
pub use owner_id::{OwnerId, GUEST_OWNER_ID};
pub use record_id::RecordId;
pub use sync_operation::SyncOperation;
pub use sync_payload::SyncPayload;
pub use sync_queue_id::SyncQueueId;
