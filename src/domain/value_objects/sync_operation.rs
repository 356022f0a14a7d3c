use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncOperation::Create => "create",
            SyncOperation::Update => "update",
            SyncOperation::Delete => "delete",
        }
    }

    /// Whether a successful dispatch leaves a local copy to mark as synced.
    pub fn marks_synced(&self) -> bool {
        !matches!(self, SyncOperation::Delete)
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncOperation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "create" => Ok(SyncOperation::Create),
            "update" => Ok(SyncOperation::Update),
            "delete" => Ok(SyncOperation::Delete),
            other => Err(AppError::UnknownOperation(other.to_string())),
        }
    }
}
