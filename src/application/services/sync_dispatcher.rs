use crate::application::ports::{
    Clock, ConnectivityProbe, ParkedItemObserver, RemoteError, RemoteService, SyncQueueRepository,
    SystemClock,
};
use crate::domain::entities::{SyncCommand, SyncQueueItem, SyncQueueItemDraft};
use crate::domain::value_objects::{
    EntityKind, RecordId, SyncOperation, SyncPayload, SyncQueueId,
};
use crate::shared::config::{MAX_RETRY_ATTEMPTS, SyncConfig};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

const LOG_TARGET: &str = "sync::dispatcher";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPassReport {
    pub attempted: u32,
    pub succeeded: u32,
    pub failed: u32,
    pub parked: u32,
    /// Rows skipped because they could not be decoded.
    pub rejected: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPassOutcome {
    Offline,
    AlreadyRunning,
    Completed(SyncPassReport),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub is_syncing: bool,
    pub is_running: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub last_report: Option<SyncPassReport>,
    pub sync_errors: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct DispatcherSettings {
    pub interval: Duration,
    pub max_retry_attempts: u32,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            max_retry_attempts: MAX_RETRY_ATTEMPTS,
        }
    }
}

impl From<&SyncConfig> for DispatcherSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            interval: config.interval(),
            max_retry_attempts: config.max_retry.max(1),
        }
    }
}

#[derive(Debug, Default, Clone)]
struct PassHistory {
    last_sync: Option<DateTime<Utc>>,
    last_report: Option<SyncPassReport>,
    sync_errors: u32,
}

struct TimerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// Holds the single-flight flag for the duration of a pass.
struct SyncingGuard<'a>(&'a AtomicBool);

impl<'a> SyncingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for SyncingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drains the sync queue against the remote service, one item at a time.
pub struct SyncDispatcher {
    queue: Arc<dyn SyncQueueRepository>,
    remote: Arc<dyn RemoteService>,
    connectivity: Arc<dyn ConnectivityProbe>,
    clock: Arc<dyn Clock>,
    parked_observer: Option<Arc<dyn ParkedItemObserver>>,
    settings: DispatcherSettings,
    is_syncing: AtomicBool,
    timer: Mutex<Option<TimerHandle>>,
    history: RwLock<PassHistory>,
}

impl SyncDispatcher {
    pub fn new(
        queue: Arc<dyn SyncQueueRepository>,
        remote: Arc<dyn RemoteService>,
        connectivity: Arc<dyn ConnectivityProbe>,
        settings: DispatcherSettings,
    ) -> Self {
        Self {
            queue,
            remote,
            connectivity,
            clock: Arc::new(SystemClock),
            parked_observer: None,
            settings,
            is_syncing: AtomicBool::new(false),
            timer: Mutex::new(None),
            history: RwLock::new(PassHistory::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_parked_observer(mut self, observer: Arc<dyn ParkedItemObserver>) -> Self {
        self.parked_observer = Some(observer);
        self
    }

    pub fn settings(&self) -> DispatcherSettings {
        self.settings
    }

    pub fn is_online(&self) -> bool {
        self.connectivity.is_online()
    }

    pub fn is_syncing(&self) -> bool {
        self.is_syncing.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        let timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        timer.as_ref().is_some_and(|handle| !handle.task.is_finished())
    }

    /// Starts the periodic pass timer. The first tick fires immediately.
    pub fn start(self: &Arc<Self>) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if timer.as_ref().is_some_and(|handle| !handle.task.is_finished()) {
            tracing::debug!(target: LOG_TARGET, "sync timer already running");
            return;
        }

        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_timer(
            Arc::downgrade(self),
            self.settings.interval,
            shutdown_rx,
        ));
        *timer = Some(TimerHandle { shutdown, task });

        tracing::info!(
            target: LOG_TARGET,
            interval_ms = self.settings.interval.as_millis() as u64,
            "sync timer started"
        );
    }

    /// Stops the timer. A pass already in flight runs to completion.
    pub fn stop(&self) {
        let handle = self
            .timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            // The loop may already have exited; nobody left to notify then.
            let _ = handle.shutdown.send(true);
            tracing::info!(target: LOG_TARGET, "sync timer stopped");
        }
    }

    /// Runs one pass now unless offline or a pass is already running.
    pub async fn sync_now(&self) -> Result<SyncPassOutcome, AppError> {
        if self.connectivity.is_offline() {
            tracing::debug!(target: LOG_TARGET, "offline, skipping sync pass");
            return Ok(SyncPassOutcome::Offline);
        }

        let Some(_guard) = SyncingGuard::acquire(&self.is_syncing) else {
            tracing::debug!(target: LOG_TARGET, "sync pass already running");
            return Ok(SyncPassOutcome::AlreadyRunning);
        };

        let result = self.drain_queue().await;

        let mut history = self.history.write().await;
        match &result {
            Ok(report) => {
                history.last_sync = Some(self.clock.now());
                history.last_report = Some(*report);
                history.sync_errors = history.sync_errors.saturating_add(report.rejected);
            }
            Err(_) => history.sync_errors = history.sync_errors.saturating_add(1),
        }

        result.map(SyncPassOutcome::Completed)
    }

    /// Fire-and-forget pass on a background task.
    pub fn request_sync(self: &Arc<Self>) -> JoinHandle<()> {
        let dispatcher = Arc::clone(self);
        tokio::spawn(async move {
            dispatcher.run_logged_pass("request").await;
        })
    }

    pub fn request_sync_if_online(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        self.is_online().then(|| self.request_sync())
    }

    /// Appends a mutation to the queue and kicks a pass when online.
    pub async fn queue_sync(
        self: &Arc<Self>,
        entity_kind: EntityKind,
        operation: SyncOperation,
        target_record_id: RecordId,
        payload: SyncPayload,
    ) -> Result<SyncQueueId, AppError> {
        let draft = SyncQueueItemDraft::new(
            entity_kind,
            operation,
            target_record_id,
            payload,
            self.clock.now(),
        );
        let id = self.queue.enqueue(&draft).await?;

        tracing::debug!(
            target: LOG_TARGET,
            queue_id = %id,
            kind = entity_kind.as_str(),
            operation = operation.as_str(),
            record_id = %draft.target_record_id,
            "mutation queued"
        );

        self.request_sync_if_online();
        Ok(id)
    }

    pub async fn get_pending_count(&self) -> Result<u64, AppError> {
        self.queue
            .count_pending(self.settings.max_retry_attempts)
            .await
    }

    pub async fn get_pending_items(&self) -> Result<Vec<SyncQueueItem>, AppError> {
        self.queue
            .list_pending(self.settings.max_retry_attempts)
            .await
    }

    pub async fn get_all_items(&self) -> Result<Vec<SyncQueueItem>, AppError> {
        self.queue.list_all().await
    }

    pub async fn get_parked_items(&self) -> Result<Vec<SyncQueueItem>, AppError> {
        self.queue
            .list_parked(self.settings.max_retry_attempts)
            .await
    }

    /// Drops every queued item, parked ones included.
    pub async fn clear_queue(&self) -> Result<u64, AppError> {
        let removed = self.queue.clear().await?;
        tracing::info!(target: LOG_TARGET, removed, "sync queue cleared");
        Ok(removed)
    }

    pub async fn status(&self) -> SyncStatus {
        let history = self.history.read().await.clone();
        SyncStatus {
            is_syncing: self.is_syncing(),
            is_running: self.is_running(),
            last_sync: history.last_sync,
            last_report: history.last_report,
            sync_errors: history.sync_errors,
        }
    }

    async fn run_logged_pass(&self, trigger: &'static str) {
        match self.sync_now().await {
            Ok(SyncPassOutcome::Completed(report))
                if report.attempted > 0 || report.rejected > 0 =>
            {
                tracing::info!(
                    target: LOG_TARGET,
                    trigger,
                    attempted = report.attempted,
                    succeeded = report.succeeded,
                    failed = report.failed,
                    parked = report.parked,
                    rejected = report.rejected,
                    "sync pass finished"
                );
            }
            Ok(outcome) => {
                tracing::trace!(target: LOG_TARGET, trigger, ?outcome, "sync pass idle");
            }
            Err(err) => {
                tracing::error!(target: LOG_TARGET, trigger, error = %err, "sync pass failed");
            }
        }
    }

    async fn drain_queue(&self) -> Result<SyncPassReport, AppError> {
        let max_attempts = self.settings.max_retry_attempts;
        let batch = self.queue.load_pending(max_attempts).await?;
        let mut report = SyncPassReport::default();

        // Undecodable rows stay queued for inspection; the rest still flows.
        for row in &batch.rejected {
            report.rejected += 1;
            tracing::error!(
                target: LOG_TARGET,
                queue_id = %row.id,
                error = %row.error,
                "sync queue row cannot be dispatched"
            );
        }
        if batch.items.is_empty() {
            return Ok(report);
        }

        tracing::debug!(target: LOG_TARGET, pending = batch.items.len(), "sync pass started");

        for item in batch.items {
            report.attempted += 1;
            let command = SyncCommand::from_item(&item);

            match self.dispatch(&command).await {
                Ok(()) => {
                    self.queue
                        .acknowledge(&item, item.operation.marks_synced())
                        .await?;
                    report.succeeded += 1;
                    tracing::debug!(
                        target: LOG_TARGET,
                        queue_id = %item.id,
                        kind = item.entity_kind.as_str(),
                        operation = item.operation.as_str(),
                        noop = command.is_noop(),
                        "queue item acknowledged"
                    );
                }
                Err(err) => {
                    report.failed += 1;
                    let message = err.to_string();
                    let attempted_at = self.clock.now();
                    let attempts = self
                        .queue
                        .record_failure(item.id, attempted_at, &message)
                        .await?;

                    let failed = SyncQueueItem {
                        attempts,
                        last_attempt_at: Some(attempted_at),
                        last_error: Some(message),
                        ..item
                    };
                    if failed.is_parked(max_attempts) {
                        report.parked += 1;
                        self.park(&failed);
                    } else {
                        tracing::debug!(
                            target: LOG_TARGET,
                            queue_id = %failed.id,
                            attempts,
                            status = err.status_code(),
                            error = %err,
                            "queue item failed, will retry"
                        );
                    }
                }
            }
        }

        Ok(report)
    }

    async fn dispatch(&self, command: &SyncCommand) -> Result<(), RemoteError> {
        let remote = &self.remote;
        match command {
            SyncCommand::CreateWorkout { id, payload } => remote.create_workout(id, payload).await,
            SyncCommand::UpdateWorkout { id, payload } => remote.update_workout(id, payload).await,
            SyncCommand::DeleteWorkout { id } => remote.delete_workout(id).await,
            SyncCommand::CreateTemplate { id, payload } => {
                remote.create_template(id, payload).await
            }
            SyncCommand::UpdateTemplate { id, payload } => {
                remote.update_template(id, payload).await
            }
            SyncCommand::DeleteTemplate { id } => remote.delete_template(id).await,
            SyncCommand::CreateProgram { id, payload } => remote.create_program(id, payload).await,
            SyncCommand::UpdateProgram { id, payload } => remote.update_program(id, payload).await,
            SyncCommand::DeleteProgram { id } => remote.delete_program(id).await,
            SyncCommand::PersonalRecord { .. } => Ok(()),
        }
    }

    fn park(&self, item: &SyncQueueItem) {
        tracing::warn!(
            target: LOG_TARGET,
            queue_id = %item.id,
            kind = item.entity_kind.as_str(),
            operation = item.operation.as_str(),
            record_id = %item.target_record_id,
            attempts = item.attempts,
            error = item.last_error.as_deref().unwrap_or_default(),
            "queue item parked after exhausting retries"
        );
        if let Some(observer) = &self.parked_observer {
            observer.on_parked(item);
        }
    }
}

async fn run_timer(
    dispatcher: Weak<SyncDispatcher>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        // Shutdown wins over a tick that became ready during a long pass.
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        if *shutdown.borrow() {
            break;
        }
        let Some(dispatcher) = dispatcher.upgrade() else {
            break;
        };
        dispatcher.run_logged_pass("timer").await;
    }

    tracing::debug!(target: LOG_TARGET, "sync timer loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::TrainingRecordRepository;
    use crate::domain::entities::TrainingRecord;
    use crate::domain::value_objects::OwnerId;
    use crate::infrastructure::database::ConnectionPool;
    use crate::infrastructure::database::sqlite_repository::SqliteRepository;
    use crate::infrastructure::network::ConnectivityState;
    use async_trait::async_trait;
    use mockall::mock;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    mock! {
        pub Remote {}

        #[async_trait]
        impl RemoteService for Remote {
            async fn create_workout(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError>;
            async fn update_workout(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError>;
            async fn delete_workout(&self, id: &RecordId) -> Result<(), RemoteError>;
            async fn create_template(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError>;
            async fn update_template(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError>;
            async fn delete_template(&self, id: &RecordId) -> Result<(), RemoteError>;
            async fn create_program(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError>;
            async fn update_program(&self, id: &RecordId, payload: &SyncPayload) -> Result<(), RemoteError>;
            async fn delete_program(&self, id: &RecordId) -> Result<(), RemoteError>;
        }
    }

    struct CountingObserver(AtomicUsize);

    impl ParkedItemObserver for CountingObserver {
        fn on_parked(&self, item: &SyncQueueItem) {
            assert_eq!(item.attempts, MAX_RETRY_ATTEMPTS);
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Harness {
        repo: Arc<SqliteRepository>,
        connectivity: Arc<ConnectivityState>,
    }

    impl Harness {
        async fn new(online: bool) -> Self {
            let pool = ConnectionPool::from_memory().await.unwrap();
            let repo = Arc::new(SqliteRepository::new(pool));
            repo.initialize().await.unwrap();
            Self {
                repo,
                connectivity: Arc::new(ConnectivityState::new(online)),
            }
        }

        fn dispatcher(&self, remote: MockRemote) -> SyncDispatcher {
            SyncDispatcher::new(
                self.repo.clone(),
                Arc::new(remote),
                self.connectivity.clone(),
                DispatcherSettings {
                    interval: Duration::from_millis(20),
                    max_retry_attempts: MAX_RETRY_ATTEMPTS,
                },
            )
        }

        async fn workout(&self) -> TrainingRecord {
            let record = TrainingRecord::new(
                EntityKind::Workout,
                OwnerId::user("u1").unwrap(),
                json!({"name": "Leg day"}),
            );
            self.repo.put(&record).await.unwrap();
            record
        }

        async fn enqueue(&self, kind: EntityKind, operation: SyncOperation, id: &RecordId) {
            self.repo
                .enqueue(&SyncQueueItemDraft::new(
                    kind,
                    operation,
                    id.clone(),
                    SyncPayload::new(json!({"id": id.as_str()})).unwrap(),
                    Utc::now(),
                ))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn offline_pass_is_skipped() {
        let harness = Harness::new(false).await;
        let record = harness.workout().await;
        harness
            .enqueue(EntityKind::Workout, SyncOperation::Create, &record.id)
            .await;

        let dispatcher = harness.dispatcher(MockRemote::new());
        let outcome = dispatcher.sync_now().await.unwrap();

        assert_eq!(outcome, SyncPassOutcome::Offline);
        assert_eq!(dispatcher.get_pending_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn successful_create_clears_item_and_marks_synced() {
        let harness = Harness::new(true).await;
        let record = harness.workout().await;
        harness
            .enqueue(EntityKind::Workout, SyncOperation::Create, &record.id)
            .await;

        let mut remote = MockRemote::new();
        let expected = record.id.clone();
        remote
            .expect_create_workout()
            .withf(move |id, _| *id == expected)
            .times(1)
            .returning(|_, _| Ok(()));

        let dispatcher = harness.dispatcher(remote);
        let outcome = dispatcher.sync_now().await.unwrap();

        assert_eq!(
            outcome,
            SyncPassOutcome::Completed(SyncPassReport {
                attempted: 1,
                succeeded: 1,
                failed: 0,
                parked: 0,
                rejected: 0,
            })
        );
        assert!(dispatcher.get_all_items().await.unwrap().is_empty());
        let stored = harness
            .repo
            .get(EntityKind::Workout, &record.id)
            .await
            .unwrap()
            .unwrap();
        assert!(stored.synced);

        let status = dispatcher.status().await;
        assert!(!status.is_syncing);
        assert!(status.last_sync.is_some());
        assert_eq!(status.last_report.map(|r| r.succeeded), Some(1));
    }

    #[tokio::test]
    async fn delete_acknowledgement_does_not_mark_synced() {
        let harness = Harness::new(true).await;
        let record = harness.workout().await;
        harness
            .enqueue(EntityKind::Workout, SyncOperation::Delete, &record.id)
            .await;

        let mut remote = MockRemote::new();
        remote.expect_delete_workout().times(1).returning(|_| Ok(()));

        let dispatcher = harness.dispatcher(remote);
        dispatcher.sync_now().await.unwrap();

        let stored = harness
            .repo
            .get(EntityKind::Workout, &record.id)
            .await
            .unwrap()
            .unwrap();
        assert!(!stored.synced);
        assert_eq!(dispatcher.get_pending_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn personal_record_items_are_acknowledged_without_remote_calls() {
        let harness = Harness::new(true).await;
        let id = RecordId::new("pr-1").unwrap();
        harness
            .enqueue(EntityKind::PersonalRecord, SyncOperation::Create, &id)
            .await;

        // No expectations: any remote call fails the test.
        let dispatcher = harness.dispatcher(MockRemote::new());
        let outcome = dispatcher.sync_now().await.unwrap();

        assert!(matches!(
            outcome,
            SyncPassOutcome::Completed(SyncPassReport { succeeded: 1, .. })
        ));
        assert!(dispatcher.get_all_items().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failures_are_retried_until_parked() {
        let harness = Harness::new(true).await;
        let id = RecordId::new("t-1").unwrap();
        harness
            .enqueue(EntityKind::Template, SyncOperation::Update, &id)
            .await;

        let mut remote = MockRemote::new();
        remote
            .expect_update_template()
            .times(MAX_RETRY_ATTEMPTS as usize)
            .returning(|_, _| Err(RemoteError::api(500, "boom")));

        let observer = Arc::new(CountingObserver(AtomicUsize::new(0)));
        let dispatcher = harness
            .dispatcher(remote)
            .with_parked_observer(observer.clone());

        for _ in 0..MAX_RETRY_ATTEMPTS {
            dispatcher.sync_now().await.unwrap();
        }
        // Parked: the next pass finds nothing to do.
        let outcome = dispatcher.sync_now().await.unwrap();
        assert_eq!(outcome, SyncPassOutcome::Completed(SyncPassReport::default()));

        assert_eq!(observer.0.load(Ordering::SeqCst), 1);
        assert_eq!(dispatcher.get_pending_count().await.unwrap(), 0);
        assert!(dispatcher.get_pending_items().await.unwrap().is_empty());
        let parked = dispatcher.get_parked_items().await.unwrap();
        assert_eq!(parked.len(), 1);
        assert_eq!(parked[0].attempts, MAX_RETRY_ATTEMPTS);
        assert_eq!(
            parked[0].last_error.as_deref(),
            Some("Remote API error (500): boom")
        );
        assert_eq!(dispatcher.get_all_items().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn one_failure_does_not_block_later_items() {
        let harness = Harness::new(true).await;
        let failing = RecordId::new("p-1").unwrap();
        let passing = RecordId::new("p-2").unwrap();
        harness
            .enqueue(EntityKind::Program, SyncOperation::Create, &failing)
            .await;
        harness
            .enqueue(EntityKind::Program, SyncOperation::Create, &passing)
            .await;

        let mut remote = MockRemote::new();
        remote
            .expect_create_program()
            .times(2)
            .returning(|id, _| {
                if id.as_str() == "p-1" {
                    Err(RemoteError::unavailable("timeout"))
                } else {
                    Ok(())
                }
            });

        let dispatcher = harness.dispatcher(remote);
        let outcome = dispatcher.sync_now().await.unwrap();

        assert_eq!(
            outcome,
            SyncPassOutcome::Completed(SyncPassReport {
                attempted: 2,
                succeeded: 1,
                failed: 1,
                parked: 0,
                rejected: 0,
            })
        );
        let remaining = dispatcher.get_pending_items().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].target_record_id, failing);
        assert_eq!(remaining[0].attempts, 1);
    }

    #[tokio::test]
    async fn concurrent_sync_now_runs_a_single_pass() {
        let harness = Harness::new(true).await;
        let record = harness.workout().await;
        harness
            .enqueue(EntityKind::Workout, SyncOperation::Create, &record.id)
            .await;

        let mut remote = MockRemote::new();
        remote
            .expect_create_workout()
            .times(1)
            .returning(|_, _| Ok(()));
        let dispatcher = harness.dispatcher(remote);

        let (first, second) = tokio::join!(dispatcher.sync_now(), dispatcher.sync_now());
        let outcomes = [first.unwrap(), second.unwrap()];

        let completed = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, SyncPassOutcome::Completed(_)))
            .count();
        let skipped = outcomes
            .iter()
            .filter(|outcome| **outcome == SyncPassOutcome::AlreadyRunning)
            .count();
        assert_eq!((completed, skipped), (1, 1));
        assert!(!dispatcher.is_syncing());
    }

    #[tokio::test]
    async fn unknown_operation_is_rejected_while_valid_items_still_sync() {
        let harness = Harness::new(true).await;
        sqlx::query(
            "INSERT INTO sync_queue (entity_kind, operation, target_record_id, payload, enqueued_at) \
             VALUES ('workout', 'upsert', 'w-9', '{}', 0)",
        )
        .execute(harness.repo.pool().get_pool())
        .await
        .unwrap();
        let record = harness.workout().await;
        harness
            .enqueue(EntityKind::Workout, SyncOperation::Create, &record.id)
            .await;

        let mut remote = MockRemote::new();
        let expected = record.id.clone();
        remote
            .expect_create_workout()
            .withf(move |id, _| *id == expected)
            .times(1)
            .returning(|_, _| Ok(()));
        let dispatcher = harness.dispatcher(remote);

        let outcome = dispatcher.sync_now().await.unwrap();
        assert_eq!(
            outcome,
            SyncPassOutcome::Completed(SyncPassReport {
                attempted: 1,
                succeeded: 1,
                failed: 0,
                parked: 0,
                rejected: 1,
            })
        );
        assert!(!dispatcher.is_syncing(), "flag is released");
        assert_eq!(dispatcher.status().await.sync_errors, 1);

        // The bad row stays put and keeps being reported; listings still work.
        dispatcher.sync_now().await.unwrap();
        assert_eq!(dispatcher.status().await.sync_errors, 2);
        assert!(dispatcher.get_pending_items().await.unwrap().is_empty());
        assert!(dispatcher.get_all_items().await.unwrap().is_empty());
        assert!(dispatcher.get_parked_items().await.unwrap().is_empty());
        assert_eq!(dispatcher.get_pending_count().await.unwrap(), 1);
        assert_eq!(dispatcher.clear_queue().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn queue_sync_while_offline_only_enqueues() {
        let harness = Harness::new(false).await;
        let dispatcher = Arc::new(harness.dispatcher(MockRemote::new()));

        let id = dispatcher
            .queue_sync(
                EntityKind::Workout,
                SyncOperation::Create,
                RecordId::new("w-1").unwrap(),
                SyncPayload::empty(),
            )
            .await
            .unwrap();

        let item = harness.repo.get_item(id).await.unwrap().unwrap();
        assert_eq!(item.attempts, 0);
        assert_eq!(dispatcher.get_pending_count().await.unwrap(), 1);
        assert!(dispatcher.request_sync_if_online().is_none());
    }

    #[tokio::test]
    async fn start_is_idempotent_and_stop_halts_the_timer() {
        let harness = Harness::new(true).await;
        let record = harness.workout().await;
        harness
            .enqueue(EntityKind::Workout, SyncOperation::Update, &record.id)
            .await;

        let mut remote = MockRemote::new();
        remote
            .expect_update_workout()
            .times(1)
            .returning(|_, _| Ok(()));
        let dispatcher = Arc::new(harness.dispatcher(remote));

        dispatcher.start();
        dispatcher.start();
        assert!(dispatcher.is_running());

        let drained = tokio::time::timeout(Duration::from_secs(5), async {
            while !dispatcher.get_all_items().await.unwrap().is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;
        assert!(drained.is_ok(), "the first tick drains the queue");

        dispatcher.stop();
        dispatcher.stop();
        assert!(!dispatcher.is_running());
        assert!(!dispatcher.status().await.is_running);
    }

    #[tokio::test]
    async fn clear_queue_reports_removed_items() {
        let harness = Harness::new(false).await;
        let id = RecordId::new("w-1").unwrap();
        harness
            .enqueue(EntityKind::Workout, SyncOperation::Create, &id)
            .await;
        harness
            .enqueue(EntityKind::Workout, SyncOperation::Update, &id)
            .await;

        let dispatcher = harness.dispatcher(MockRemote::new());
        assert_eq!(dispatcher.clear_queue().await.unwrap(), 2);
        assert_eq!(dispatcher.get_pending_count().await.unwrap(), 0);
    }
}
