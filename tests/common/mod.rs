#![allow(dead_code)]

use async_trait::async_trait;
use liftlog_sync::domain::entities::TrainingRecord;
use liftlog_sync::domain::value_objects::{EntityKind, OwnerId, RecordId, SyncPayload};
use liftlog_sync::infrastructure::database::ConnectionPool;
use liftlog_sync::{AppConfig, RemoteError, RemoteService, SyncEngine, TrainingRecordRepository};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub method: &'static str,
    pub id: String,
    pub payload: Option<Value>,
}

/// Remote fake that records every call and fails on demand.
#[derive(Default)]
pub struct ScriptedRemote {
    calls: Mutex<Vec<RemoteCall>>,
    failures: Mutex<HashMap<String, usize>>,
    gated: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// The next `times` calls for `id` fail with a 503.
    pub fn fail_next(&self, id: &str, times: usize) {
        self.failures.lock().unwrap().insert(id.to_string(), times);
    }

    /// Calls block until [`ScriptedRemote::release_one`] is invoked.
    pub fn hold_calls(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release_one(&self) {
        self.release.notify_one();
    }

    pub fn open(&self) {
        self.gated.store(false, Ordering::SeqCst);
        self.release.notify_waiters();
        self.release.notify_one();
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<&'static str> {
        self.calls().into_iter().map(|call| call.method).collect()
    }

    async fn record(
        &self,
        method: &'static str,
        id: &RecordId,
        payload: Option<&SyncPayload>,
    ) -> Result<(), RemoteError> {
        self.calls.lock().unwrap().push(RemoteCall {
            method,
            id: id.as_str().to_string(),
            payload: payload.map(|p| p.as_json().clone()),
        });

        if self.gated.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        let mut failures = self.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(id.as_str()) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(RemoteError::api(503, "service unavailable"));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteService for ScriptedRemote {
    async fn create_workout(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError> {
        self.record("create_workout", id, Some(payload)).await
    }

    async fn update_workout(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError> {
        self.record("update_workout", id, Some(payload)).await
    }

    async fn delete_workout(&self, id: &RecordId) -> Result<(), RemoteError> {
        self.record("delete_workout", id, None).await
    }

    async fn create_template(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError> {
        self.record("create_template", id, Some(payload)).await
    }

    async fn update_template(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError> {
        self.record("update_template", id, Some(payload)).await
    }

    async fn delete_template(&self, id: &RecordId) -> Result<(), RemoteError> {
        self.record("delete_template", id, None).await
    }

    async fn create_program(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError> {
        self.record("create_program", id, Some(payload)).await
    }

    async fn update_program(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError> {
        self.record("update_program", id, Some(payload)).await
    }

    async fn delete_program(&self, id: &RecordId) -> Result<(), RemoteError> {
        self.record("delete_program", id, None).await
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.sync.auto_sync = false;
    config.sync.sync_interval = 1;
    config.sync.pending_poll_interval = 1;
    config
}

pub struct TestEngine {
    pub engine: SyncEngine,
    pub remote: Arc<ScriptedRemote>,
}

pub async fn setup_engine(online: bool) -> TestEngine {
    let remote = ScriptedRemote::new();
    let pool = ConnectionPool::from_memory().await.expect("in-memory sqlite");
    let engine = SyncEngine::with_pool(test_config(), pool, remote.clone())
        .await
        .expect("engine");
    engine.connectivity.set_online(online);
    TestEngine { engine, remote }
}

pub async fn put_record(
    engine: &SyncEngine,
    kind: EntityKind,
    owner: OwnerId,
    data: Value,
) -> TrainingRecord {
    let record = TrainingRecord::new(kind, owner, data);
    engine.repository.put(&record).await.expect("put record");
    record
}

pub async fn put_user_workout(engine: &SyncEngine, name: &str) -> TrainingRecord {
    put_record(
        engine,
        EntityKind::Workout,
        OwnerId::user("user-1").expect("owner"),
        json!({"name": name}),
    )
    .await
}

/// Polls `check` until it returns true or five seconds pass.
pub async fn eventually<F, Fut>(mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        while !check().await {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .is_ok()
}
