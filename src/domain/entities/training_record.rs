use crate::domain::value_objects::{EntityKind, OwnerId, RecordId, SyncPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A locally cached workout log, template, program or personal record.
///
/// `data` is the kind-specific body as the UI authored it. The store never
/// interprets it beyond passing it to the remote service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub id: RecordId,
    pub kind: EntityKind,
    pub owner_id: OwnerId,
    pub data: Value,
    pub synced: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingRecord {
    pub fn new(kind: EntityKind, owner_id: OwnerId, data: Value) -> Self {
        let now = Utc::now();
        Self {
            id: RecordId::generate(),
            kind,
            owner_id,
            data,
            synced: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(id: RecordId, kind: EntityKind, owner_id: OwnerId, data: Value) -> Self {
        Self {
            id,
            ..Self::new(kind, owner_id, data)
        }
    }

    /// Body sent to the backend: the record data with its id and owner attached.
    pub fn remote_payload(&self) -> SyncPayload {
        let mut body = match &self.data {
            Value::Object(map) => map.clone(),
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other.clone());
                map
            }
        };
        body.insert("id".to_string(), Value::String(self.id.to_string()));
        body.insert(
            "user_id".to_string(),
            Value::String(self.owner_id.to_string()),
        );
        SyncPayload::from_object(body)
    }
}
