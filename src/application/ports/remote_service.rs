use crate::domain::value_objects::{RecordId, SyncPayload};
use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by the backend or the transport in front of it.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Remote API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Remote service unavailable: {0}")]
    Unavailable(String),
}

impl RemoteError {
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Write surface of the authoritative backend, one call per kind and operation.
#[async_trait]
pub trait RemoteService: Send + Sync {
    async fn create_workout(&self, id: &RecordId, payload: &SyncPayload)
        -> Result<(), RemoteError>;
    async fn update_workout(&self, id: &RecordId, payload: &SyncPayload)
        -> Result<(), RemoteError>;
    async fn delete_workout(&self, id: &RecordId) -> Result<(), RemoteError>;

    async fn create_template(
        &self,
        id: &RecordId,
        payload: &SyncPayload,
    ) -> Result<(), RemoteError>;
    async fn update_template(
        &self,
        id: &RecordId,
        payload: &SyncPayload,
    ) -> Result<(), RemoteError>;
    async fn delete_template(&self, id: &RecordId) -> Result<(), RemoteError>;

    async fn create_program(&self, id: &RecordId, payload: &SyncPayload)
        -> Result<(), RemoteError>;
    async fn update_program(&self, id: &RecordId, payload: &SyncPayload)
        -> Result<(), RemoteError>;
    async fn delete_program(&self, id: &RecordId) -> Result<(), RemoteError>;
}
