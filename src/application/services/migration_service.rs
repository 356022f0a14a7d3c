use crate::application::ports::{
    AuthLifecycleEvent, AuthLifecycleStage, Clock, SystemClock, TrainingRecordRepository,
};
use crate::application::services::sync_dispatcher::SyncDispatcher;
use crate::domain::entities::MigrationSummary;
use crate::domain::value_objects::{EntityKind, OwnerId};
use crate::shared::error::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, watch};

const LOG_TARGET: &str = "sync::migration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationPhase {
    Idle,
    Checking,
    Migrating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    NothingToMigrate,
    Migrated(MigrationSummary),
    /// Migration failed; authentication proceeds regardless.
    Failed(String),
}

/// Resets the phase to `Idle` on every exit path.
struct PhaseReset<'a>(&'a watch::Sender<MigrationPhase>);

impl Drop for PhaseReset<'_> {
    fn drop(&mut self) {
        self.0.send_replace(MigrationPhase::Idle);
    }
}

/// Re-homes guest-owned records onto an authenticated account.
pub struct MigrationService {
    records: Arc<dyn TrainingRecordRepository>,
    dispatcher: Option<Arc<SyncDispatcher>>,
    clock: Arc<dyn Clock>,
    phase: watch::Sender<MigrationPhase>,
    gate: Mutex<()>,
}

impl MigrationService {
    pub fn new(
        records: Arc<dyn TrainingRecordRepository>,
        dispatcher: Option<Arc<SyncDispatcher>>,
    ) -> Self {
        let (phase, _) = watch::channel(MigrationPhase::Idle);
        Self {
            records,
            dispatcher,
            clock: Arc::new(SystemClock),
            phase,
            gate: Mutex::new(()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn phase(&self) -> MigrationPhase {
        *self.phase.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<MigrationPhase> {
        self.phase.subscribe()
    }

    pub async fn has_local_data(&self) -> Result<bool, AppError> {
        let guest = OwnerId::guest();
        for kind in EntityKind::ALL {
            if self.records.count_by_owner(kind, &guest).await? > 0 {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Guest-owned record counts per kind.
    pub async fn get_migration_summary(&self) -> Result<MigrationSummary, AppError> {
        let guest = OwnerId::guest();
        let mut summary = MigrationSummary::default();
        for kind in EntityKind::ALL {
            let count = self.records.count_by_owner(kind, &guest).await?;
            summary.add(kind, count);
        }
        Ok(summary)
    }

    /// Moves every guest record to `user_id`, queues creates for them and
    /// requests a sync. Running it again with nothing left is a no-op.
    pub async fn migrate_local_data_to_user(
        &self,
        user_id: &str,
    ) -> Result<MigrationSummary, AppError> {
        let target = OwnerId::user(user_id).map_err(AppError::ValidationError)?;
        let _gate = self.gate.lock().await;

        let summary = self
            .records
            .reassign_owner(&OwnerId::guest(), &target, self.clock.now())
            .await?;

        if summary.is_empty() {
            tracing::debug!(target: LOG_TARGET, user_id, "no guest data to migrate");
            return Ok(summary);
        }

        tracing::info!(
            target: LOG_TARGET,
            user_id,
            workouts = summary.workouts,
            templates = summary.templates,
            programs = summary.programs,
            personal_records = summary.personal_records,
            "guest data migrated"
        );

        if let Some(dispatcher) = &self.dispatcher {
            dispatcher.request_sync_if_online();
        }

        Ok(summary)
    }

    /// Runs the post-authentication check and migration. Never fails: errors
    /// are logged and reported as [`MigrationOutcome::Failed`].
    pub async fn handle_auth_event(&self, event: &AuthLifecycleEvent) -> MigrationOutcome {
        let stage = match event.stage {
            AuthLifecycleStage::SignUp => "sign_up",
            AuthLifecycleStage::SignIn => "sign_in",
        };
        let _reset = PhaseReset(&self.phase);
        self.phase.send_replace(MigrationPhase::Checking);

        let outcome = match self.check_and_migrate(event).await {
            Ok(None) => MigrationOutcome::NothingToMigrate,
            Ok(Some(summary)) => MigrationOutcome::Migrated(summary),
            Err(err) => {
                tracing::error!(
                    target: LOG_TARGET,
                    stage,
                    user_id = %event.user_id,
                    error = %err,
                    "guest data migration failed"
                );
                MigrationOutcome::Failed(err.to_string())
            }
        };

        tracing::debug!(target: LOG_TARGET, stage, ?outcome, "auth migration check finished");
        outcome
    }

    async fn check_and_migrate(
        &self,
        event: &AuthLifecycleEvent,
    ) -> Result<Option<MigrationSummary>, AppError> {
        event.owner().map_err(AppError::ValidationError)?;

        if !self.has_local_data().await? {
            return Ok(None);
        }

        self.phase.send_replace(MigrationPhase::Migrating);
        let summary = self.migrate_local_data_to_user(&event.user_id).await?;
        Ok((!summary.is_empty()).then_some(summary))
    }
}
