use super::SqliteRepository;
use super::mapper::map_sync_queue_item;
use super::queries::{
    CLEAR_SYNC_QUEUE, COUNT_PENDING_SYNC_QUEUE, DELETE_SYNC_QUEUE_ITEM, INSERT_SYNC_QUEUE_ITEM,
    RECORD_SYNC_QUEUE_FAILURE, SELECT_ALL_SYNC_QUEUE, SELECT_PARKED_SYNC_QUEUE,
    SELECT_PENDING_SYNC_QUEUE, SELECT_SYNC_QUEUE_ITEM, mark_record_synced,
};
use crate::application::ports::local_store::{
    PendingBatch, RejectedQueueRow, SyncQueueRepository,
};
use crate::domain::entities::{SyncQueueItem, SyncQueueItemDraft};
use crate::domain::value_objects::SyncQueueId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

const LOG_TARGET: &str = "store::sqlite";

fn decode_rows(rows: &[SqliteRow]) -> Result<PendingBatch, AppError> {
    let mut batch = PendingBatch::default();
    for row in rows {
        match map_sync_queue_item(row) {
            Ok(item) => batch.items.push(item),
            Err(error) => {
                let id = SyncQueueId::new(row.try_get("id")?)
                    .map_err(AppError::DeserializationError)?;
                batch.rejected.push(RejectedQueueRow { id, error });
            }
        }
    }
    Ok(batch)
}

/// Decodes a listing, leaving out rows that cannot be read.
fn decode_listing(rows: &[SqliteRow]) -> Result<Vec<SyncQueueItem>, AppError> {
    let batch = decode_rows(rows)?;
    for row in &batch.rejected {
        tracing::error!(
            target: LOG_TARGET,
            queue_id = %row.id,
            error = %row.error,
            "undecodable sync queue row left out of listing"
        );
    }
    Ok(batch.items)
}

#[async_trait]
impl SyncQueueRepository for SqliteRepository {
    async fn enqueue(&self, draft: &SyncQueueItemDraft) -> Result<SyncQueueId, AppError> {
        let payload = serde_json::to_string(draft.payload.as_json())?;
        let result = sqlx::query(INSERT_SYNC_QUEUE_ITEM)
            .bind(draft.entity_kind.as_str())
            .bind(draft.operation.as_str())
            .bind(draft.target_record_id.as_str())
            .bind(&payload)
            .bind(draft.enqueued_at.timestamp_millis())
            .execute(self.pool.get_pool())
            .await?;

        SyncQueueId::new(result.last_insert_rowid()).map_err(AppError::Internal)
    }

    async fn get_item(&self, id: SyncQueueId) -> Result<Option<SyncQueueItem>, AppError> {
        let row = sqlx::query(SELECT_SYNC_QUEUE_ITEM)
            .bind(id.value())
            .fetch_optional(self.pool.get_pool())
            .await?;

        match row {
            Some(row) => map_sync_queue_item(&row).map(Some),
            None => Ok(None),
        }
    }

    async fn load_pending(&self, max_attempts: u32) -> Result<PendingBatch, AppError> {
        let rows = sqlx::query(SELECT_PENDING_SYNC_QUEUE)
            .bind(i64::from(max_attempts))
            .fetch_all(self.pool.get_pool())
            .await?;

        decode_rows(&rows)
    }

    async fn list_pending(&self, max_attempts: u32) -> Result<Vec<SyncQueueItem>, AppError> {
        let rows = sqlx::query(SELECT_PENDING_SYNC_QUEUE)
            .bind(i64::from(max_attempts))
            .fetch_all(self.pool.get_pool())
            .await?;

        decode_listing(&rows)
    }

    async fn list_parked(&self, max_attempts: u32) -> Result<Vec<SyncQueueItem>, AppError> {
        let rows = sqlx::query(SELECT_PARKED_SYNC_QUEUE)
            .bind(i64::from(max_attempts))
            .fetch_all(self.pool.get_pool())
            .await?;

        decode_listing(&rows)
    }

    async fn list_all(&self) -> Result<Vec<SyncQueueItem>, AppError> {
        let rows = sqlx::query(SELECT_ALL_SYNC_QUEUE)
            .fetch_all(self.pool.get_pool())
            .await?;

        decode_listing(&rows)
    }

    async fn count_pending(&self, max_attempts: u32) -> Result<u64, AppError> {
        let row = sqlx::query(COUNT_PENDING_SYNC_QUEUE)
            .bind(i64::from(max_attempts))
            .fetch_one(self.pool.get_pool())
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count.max(0) as u64)
    }

    async fn delete_item(&self, id: SyncQueueId) -> Result<(), AppError> {
        sqlx::query(DELETE_SYNC_QUEUE_ITEM)
            .bind(id.value())
            .execute(self.pool.get_pool())
            .await?;
        Ok(())
    }

    async fn acknowledge(&self, item: &SyncQueueItem, mark_synced: bool) -> Result<(), AppError> {
        let mut tx = self.pool.get_pool().begin().await?;

        sqlx::query(DELETE_SYNC_QUEUE_ITEM)
            .bind(item.id.value())
            .execute(&mut *tx)
            .await?;

        if mark_synced {
            let updated = sqlx::query(&mark_record_synced(item.entity_kind.table_name()))
                .bind(item.target_record_id.as_str())
                .execute(&mut *tx)
                .await?;
            if updated.rows_affected() == 0 {
                tracing::debug!(
                    target: LOG_TARGET,
                    kind = item.entity_kind.as_str(),
                    record_id = %item.target_record_id,
                    "acknowledged item targets a record missing locally"
                );
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn record_failure(
        &self,
        id: SyncQueueId,
        at: DateTime<Utc>,
        error: &str,
    ) -> Result<u32, AppError> {
        let row = sqlx::query(RECORD_SYNC_QUEUE_FAILURE)
            .bind(id.value())
            .bind(at.timestamp_millis())
            .bind(error)
            .fetch_optional(self.pool.get_pool())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Sync queue item {id}")))?;

        let attempts: i64 = row.try_get("attempts")?;
        u32::try_from(attempts)
            .map_err(|_| AppError::DeserializationError("Invalid attempt count".into()))
    }

    async fn clear(&self) -> Result<u64, AppError> {
        let result = sqlx::query(CLEAR_SYNC_QUEUE)
            .execute(self.pool.get_pool())
            .await?;
        Ok(result.rows_affected())
    }
}
