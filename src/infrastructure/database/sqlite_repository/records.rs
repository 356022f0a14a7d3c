use super::SqliteRepository;
use super::mapper::{map_record, map_workout_set};
use super::queries::{
    DELETE_WORKOUT_SETS, INSERT_SYNC_QUEUE_ITEM, INSERT_WORKOUT_SET, SELECT_WORKOUT_SETS,
    count_records_by_owner, delete_record, mark_record_synced, reassign_record_owner,
    select_record_by_id, select_records, select_records_by_owner, upsert_record,
};
use crate::application::ports::local_store::TrainingRecordRepository;
use crate::domain::entities::{MigrationSummary, TrainingRecord, WorkoutSet};
use crate::domain::value_objects::{EntityKind, OwnerId, RecordId, SyncOperation};
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, Sqlite, Transaction};

async fn upsert_in_tx(
    tx: &mut Transaction<'_, Sqlite>,
    record: &TrainingRecord,
) -> Result<(), AppError> {
    let data = serde_json::to_string(&record.data)?;
    sqlx::query(&upsert_record(record.kind.table_name()))
        .bind(record.id.as_str())
        .bind(record.owner_id.as_str())
        .bind(&data)
        .bind(record.created_at.timestamp_millis())
        .bind(record.updated_at.timestamp_millis())
        .execute(&mut **tx)
        .await?;
    Ok(())
}

#[async_trait]
impl TrainingRecordRepository for SqliteRepository {
    async fn get(
        &self,
        kind: EntityKind,
        id: &RecordId,
    ) -> Result<Option<TrainingRecord>, AppError> {
        let row = sqlx::query(&select_record_by_id(kind.table_name()))
            .bind(id.as_str())
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => map_record(&row, kind).map(Some),
            None => Ok(None),
        }
    }

    async fn put(&self, record: &TrainingRecord) -> Result<(), AppError> {
        let mut tx = self.pool.get_pool().begin().await?;
        upsert_in_tx(&mut tx, record).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn bulk_put(&self, records: &[TrainingRecord]) -> Result<(), AppError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.get_pool().begin().await?;
        for record in records {
            upsert_in_tx(&mut tx, record).await?;
        }
        tx.commit().await?;

        tracing::debug!(
            target: "store::sqlite",
            count = records.len(),
            "bulk put committed"
        );
        Ok(())
    }

    async fn delete(&self, kind: EntityKind, id: &RecordId) -> Result<bool, AppError> {
        let mut tx = self.pool.get_pool().begin().await?;
        let result = sqlx::query(&delete_record(kind.table_name()))
            .bind(id.as_str())
            .execute(&mut *tx)
            .await?;
        if kind == EntityKind::Workout {
            sqlx::query(DELETE_WORKOUT_SETS)
                .bind(id.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_owner(
        &self,
        kind: EntityKind,
        owner: &OwnerId,
    ) -> Result<Vec<TrainingRecord>, AppError> {
        let rows = sqlx::query(&select_records_by_owner(kind.table_name()))
            .bind(owner.as_str())
            .fetch_all(self.pool.get_pool())
            .await?;

        rows.iter().map(|row| map_record(row, kind)).collect()
    }

    async fn list_by_kind(&self, kind: EntityKind) -> Result<Vec<TrainingRecord>, AppError> {
        let rows = sqlx::query(&select_records(kind.table_name()))
            .fetch_all(self.pool.get_pool())
            .await?;

        rows.iter().map(|row| map_record(row, kind)).collect()
    }

    async fn count_by_owner(&self, kind: EntityKind, owner: &OwnerId) -> Result<u64, AppError> {
        let row = sqlx::query(&count_records_by_owner(kind.table_name()))
            .bind(owner.as_str())
            .fetch_one(self.pool.get_pool())
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn mark_synced(&self, kind: EntityKind, id: &RecordId) -> Result<bool, AppError> {
        let result = sqlx::query(&mark_record_synced(kind.table_name()))
            .bind(id.as_str())
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn replace_workout_sets(
        &self,
        workout_id: &RecordId,
        sets: &[WorkoutSet],
    ) -> Result<(), AppError> {
        if let Some(stray) = sets.iter().find(|set| &set.workout_id != workout_id) {
            return Err(AppError::InvalidInput(format!(
                "Set {} belongs to workout {}, not {}",
                stray.id, stray.workout_id, workout_id
            )));
        }

        let mut tx = self.pool.get_pool().begin().await?;
        sqlx::query(DELETE_WORKOUT_SETS)
            .bind(workout_id.as_str())
            .execute(&mut *tx)
            .await?;
        for set in sets {
            sqlx::query(INSERT_WORKOUT_SET)
                .bind(set.id.as_str())
                .bind(set.workout_id.as_str())
                .bind(i64::from(set.position))
                .bind(&set.exercise)
                .bind(i64::from(set.reps))
                .bind(set.weight)
                .bind(set.completed)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn list_workout_sets(&self, workout_id: &RecordId) -> Result<Vec<WorkoutSet>, AppError> {
        let rows = sqlx::query(SELECT_WORKOUT_SETS)
            .bind(workout_id.as_str())
            .fetch_all(self.pool.get_pool())
            .await?;

        rows.iter().map(map_workout_set).collect()
    }

    async fn reassign_owner(
        &self,
        from: &OwnerId,
        to: &OwnerId,
        at: DateTime<Utc>,
    ) -> Result<MigrationSummary, AppError> {
        let at_millis = at.timestamp_millis();
        let mut summary = MigrationSummary::default();
        let mut tx = self.pool.get_pool().begin().await?;

        for kind in EntityKind::ALL {
            let table = kind.table_name();
            let rows = sqlx::query(&select_records_by_owner(table))
                .bind(from.as_str())
                .fetch_all(&mut *tx)
                .await?;
            if rows.is_empty() {
                continue;
            }
            let records = rows
                .iter()
                .map(|row| map_record(row, kind))
                .collect::<Result<Vec<_>, _>>()?;

            sqlx::query(&reassign_record_owner(table))
                .bind(to.as_str())
                .bind(at_millis)
                .bind(from.as_str())
                .execute(&mut *tx)
                .await?;
            summary.add(kind, records.len() as u64);

            if kind.is_remote_derived() {
                continue;
            }

            for mut record in records {
                record.owner_id = to.clone();
                let payload = serde_json::to_string(record.remote_payload().as_json())?;
                sqlx::query(INSERT_SYNC_QUEUE_ITEM)
                    .bind(kind.as_str())
                    .bind(SyncOperation::Create.as_str())
                    .bind(record.id.as_str())
                    .bind(&payload)
                    .bind(at_millis)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        tx.commit().await?;
        Ok(summary)
    }
}
