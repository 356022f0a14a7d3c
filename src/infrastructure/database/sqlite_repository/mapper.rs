use crate::domain::entities::{SyncQueueItem, TrainingRecord, WorkoutSet};
use crate::domain::value_objects::{
    EntityKind, OwnerId, RecordId, SyncOperation, SyncPayload, SyncQueueId,
};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

fn timestamp(millis: i64, column: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .ok_or_else(|| AppError::Internal(format!("Invalid {column} timestamp")))
}

pub(super) fn map_record(row: &SqliteRow, kind: EntityKind) -> Result<TrainingRecord, AppError> {
    let data: String = row.try_get("data")?;

    Ok(TrainingRecord {
        id: RecordId::new(row.try_get::<String, _>("id")?)
            .map_err(AppError::DeserializationError)?,
        kind,
        owner_id: OwnerId::new(row.try_get::<String, _>("owner_id")?)
            .map_err(AppError::DeserializationError)?,
        data: serde_json::from_str(&data)?,
        synced: row.try_get::<i64, _>("synced")? != 0,
        created_at: timestamp(row.try_get("created_at")?, "created_at")?,
        updated_at: timestamp(row.try_get("updated_at")?, "updated_at")?,
    })
}

pub(super) fn map_workout_set(row: &SqliteRow) -> Result<WorkoutSet, AppError> {
    Ok(WorkoutSet {
        id: RecordId::new(row.try_get::<String, _>("id")?)
            .map_err(AppError::DeserializationError)?,
        workout_id: RecordId::new(row.try_get::<String, _>("workout_id")?)
            .map_err(AppError::DeserializationError)?,
        position: u32::try_from(row.try_get::<i64, _>("position")?)
            .map_err(|_| AppError::DeserializationError("Invalid set position".into()))?,
        exercise: row.try_get("exercise")?,
        reps: u32::try_from(row.try_get::<i64, _>("reps")?)
            .map_err(|_| AppError::DeserializationError("Invalid rep count".into()))?,
        weight: row.try_get::<Option<f64>, _>("weight")?,
        completed: row.try_get::<i64, _>("completed")? != 0,
    })
}

/// Unknown kinds or operations, and corrupt counters, surface as errors.
pub(super) fn map_sync_queue_item(row: &SqliteRow) -> Result<SyncQueueItem, AppError> {
    let kind: String = row.try_get("entity_kind")?;
    let operation: String = row.try_get("operation")?;
    let payload: String = row.try_get("payload")?;
    let last_attempt_at = row
        .try_get::<Option<i64>, _>("last_attempt_at")?
        .map(|millis| timestamp(millis, "last_attempt_at"))
        .transpose()?;

    Ok(SyncQueueItem {
        id: SyncQueueId::new(row.try_get("id")?).map_err(AppError::DeserializationError)?,
        entity_kind: kind.parse::<EntityKind>()?,
        operation: operation.parse::<SyncOperation>()?,
        target_record_id: RecordId::new(row.try_get::<String, _>("target_record_id")?)
            .map_err(AppError::DeserializationError)?,
        payload: SyncPayload::from_json_str(&payload).map_err(AppError::DeserializationError)?,
        enqueued_at: timestamp(row.try_get("enqueued_at")?, "enqueued_at")?,
        attempts: u32::try_from(row.try_get::<i64, _>("attempts")?)
            .map_err(|_| AppError::DeserializationError("Invalid attempt count".into()))?,
        last_attempt_at,
        last_error: row.try_get("last_error")?,
    })
}
