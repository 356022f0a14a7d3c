use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncPayload(Value);

impl SyncPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    /// Payload for deletes, which carry nothing beyond the target id.
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    pub fn from_object(map: Map<String, Value>) -> Self {
        Self(Value::Object(map))
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    fn validate(value: &Value) -> Result<(), String> {
        if value.is_null() {
            return Err("Sync payload cannot be null".to_string());
        }
        Ok(())
    }
}

impl From<SyncPayload> for Value {
    fn from(payload: SyncPayload) -> Self {
        payload.0
    }
}
