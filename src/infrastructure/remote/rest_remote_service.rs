//! PostgREST-style backend client used by the sync dispatcher.

use crate::application::ports::remote_service::{RemoteError, RemoteService};
use crate::domain::value_objects::{EntityKind, RecordId, SyncPayload};
use crate::shared::config::RemoteConfig;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::RwLock;
use std::time::Duration;

const MAX_LOG_BODY_CHARS: usize = 512;

pub struct RestRemoteService {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    access_token: RwLock<Option<String>>,
}

impl RestRemoteService {
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            access_token: RwLock::new(None),
        })
    }

    /// Sets the bearer token of the signed-in user. `None` falls back to the api key.
    pub fn set_access_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = token;
        }
    }

    fn table_url(&self, kind: EntityKind) -> String {
        format!("{}/rest/v1/{}", self.base_url, kind.table_name())
    }

    fn record_url(&self, kind: EntityKind, id: &RecordId) -> String {
        format!(
            "{}?id=eq.{}",
            self.table_url(kind),
            urlencoding::encode(id.as_str())
        )
    }

    fn headers(&self) -> Result<HeaderMap, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Prefer", HeaderValue::from_static("return=minimal"));

        if let Some(api_key) = &self.api_key {
            let value = HeaderValue::from_str(api_key)
                .map_err(|_| RemoteError::unavailable("Invalid api key format"))?;
            headers.insert("apikey", value);
        }

        let token = self
            .access_token
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .or_else(|| self.api_key.clone());
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| RemoteError::unavailable("Invalid access token format"))?;
            headers.insert(AUTHORIZATION, value);
        }

        Ok(headers)
    }

    async fn check_response(response: reqwest::Response) -> Result<(), RemoteError> {
        let status = response.status();
        if status.is_success() {
            tracing::debug!(target: "remote::rest", status = status.as_u16(), "request accepted");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        tracing::debug!(
            target: "remote::rest",
            status = status.as_u16(),
            body = %preview,
            "request rejected"
        );
        Err(RemoteError::api(status.as_u16(), preview))
    }

    async fn insert(&self, kind: EntityKind, payload: &SyncPayload) -> Result<(), RemoteError> {
        let response = self
            .client
            .post(self.table_url(kind))
            .headers(self.headers()?)
            .json(payload.as_json())
            .send()
            .await?;
        Self::check_response(response).await
    }

    async fn patch(
        &self,
        kind: EntityKind,
        id: &RecordId,
        payload: &SyncPayload,
    ) -> Result<(), RemoteError> {
        let response = self
            .client
            .patch(self.record_url(kind, id))
            .headers(self.headers()?)
            .json(payload.as_json())
            .send()
            .await?;
        Self::check_response(response).await
    }

    async fn remove(&self, kind: EntityKind, id: &RecordId) -> Result<(), RemoteError> {
        let response = self
            .client
            .delete(self.record_url(kind, id))
            .headers(self.headers()?)
            .send()
            .await?;
        Self::check_response(response).await
    }
}

#[async_trait]
impl RemoteService for RestRemoteService {
    async fn create_workout(
        &self,
        _id: &RecordId,
        payload: &SyncPayload,
    ) -> Result<(), RemoteError> {
        self.insert(EntityKind::Workout, payload).await
    }

    async fn update_workout(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError> {
        self.patch(EntityKind::Workout, id, payload).await
    }

    async fn delete_workout(&self, id: &RecordId) -> Result<(), RemoteError> {
        self.remove(EntityKind::Workout, id).await
    }

    async fn create_template(
        &self,
        _id: &RecordId,
        payload: &SyncPayload,
    ) -> Result<(), RemoteError> {
        self.insert(EntityKind::Template, payload).await
    }

    async fn update_template(
        &self,
        id: &RecordId,
        payload: &SyncPayload,
    ) -> Result<(), RemoteError> {
        self.patch(EntityKind::Template, id, payload).await
    }

    async fn delete_template(&self, id: &RecordId) -> Result<(), RemoteError> {
        self.remove(EntityKind::Template, id).await
    }

    async fn create_program(
        &self,
        _id: &RecordId,
        payload: &SyncPayload,
    ) -> Result<(), RemoteError> {
        self.insert(EntityKind::Program, payload).await
    }

    async fn update_program(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError> {
        self.patch(EntityKind::Program, id, payload).await
    }

    async fn delete_program(&self, id: &RecordId) -> Result<(), RemoteError> {
        self.remove(EntityKind::Program, id).await
    }
}
