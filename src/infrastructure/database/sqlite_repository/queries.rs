// Record tables share one shape; statements are rendered per table name.

pub(super) fn select_record_by_id(table: &str) -> String {
    format!(
        "SELECT id, owner_id, data, synced, created_at, updated_at FROM {table} WHERE id = ?1"
    )
}

pub(super) fn select_records_by_owner(table: &str) -> String {
    format!(
        "SELECT id, owner_id, data, synced, created_at, updated_at FROM {table} \
         WHERE owner_id = ?1 ORDER BY created_at ASC, id ASC"
    )
}

pub(super) fn select_records(table: &str) -> String {
    format!(
        "SELECT id, owner_id, data, synced, created_at, updated_at FROM {table} \
         ORDER BY created_at ASC, id ASC"
    )
}

pub(super) fn count_records_by_owner(table: &str) -> String {
    format!("SELECT COUNT(*) AS count FROM {table} WHERE owner_id = ?1")
}

pub(super) fn upsert_record(table: &str) -> String {
    format!(
        r#"
        INSERT INTO {table} (id, owner_id, data, synced, created_at, updated_at)
        VALUES (?1, ?2, ?3, 0, ?4, ?5)
        ON CONFLICT(id) DO UPDATE SET
            owner_id = excluded.owner_id,
            data = excluded.data,
            synced = 0,
            updated_at = excluded.updated_at
        "#
    )
}

pub(super) fn delete_record(table: &str) -> String {
    format!("DELETE FROM {table} WHERE id = ?1")
}

pub(super) fn mark_record_synced(table: &str) -> String {
    format!("UPDATE {table} SET synced = 1 WHERE id = ?1")
}

pub(super) fn reassign_record_owner(table: &str) -> String {
    format!(
        "UPDATE {table} SET owner_id = ?1, synced = 0, updated_at = ?2 WHERE owner_id = ?3"
    )
}

pub(super) const DELETE_WORKOUT_SETS: &str = r#"
    DELETE FROM workout_sets WHERE workout_id = ?1
"#;

pub(super) const INSERT_WORKOUT_SET: &str = r#"
    INSERT INTO workout_sets (id, workout_id, position, exercise, reps, weight, completed)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

pub(super) const SELECT_WORKOUT_SETS: &str = r#"
    SELECT id, workout_id, position, exercise, reps, weight, completed
    FROM workout_sets
    WHERE workout_id = ?1
    ORDER BY position ASC
"#;

pub(super) const INSERT_SYNC_QUEUE_ITEM: &str = r#"
    INSERT INTO sync_queue (entity_kind, operation, target_record_id, payload, enqueued_at, attempts)
    VALUES (?1, ?2, ?3, ?4, ?5, 0)
"#;

pub(super) const SELECT_SYNC_QUEUE_ITEM: &str = r#"
    SELECT id, entity_kind, operation, target_record_id, payload, enqueued_at,
           attempts, last_attempt_at, last_error
    FROM sync_queue
    WHERE id = ?1
"#;

pub(super) const SELECT_PENDING_SYNC_QUEUE: &str = r#"
    SELECT id, entity_kind, operation, target_record_id, payload, enqueued_at,
           attempts, last_attempt_at, last_error
    FROM sync_queue
    WHERE attempts < ?1
    ORDER BY id ASC
"#;

pub(super) const SELECT_PARKED_SYNC_QUEUE: &str = r#"
    SELECT id, entity_kind, operation, target_record_id, payload, enqueued_at,
           attempts, last_attempt_at, last_error
    FROM sync_queue
    WHERE attempts >= ?1
    ORDER BY id ASC
"#;

pub(super) const SELECT_ALL_SYNC_QUEUE: &str = r#"
    SELECT id, entity_kind, operation, target_record_id, payload, enqueued_at,
           attempts, last_attempt_at, last_error
    FROM sync_queue
    ORDER BY id ASC
"#;

pub(super) const COUNT_PENDING_SYNC_QUEUE: &str = r#"
    SELECT COUNT(*) AS count FROM sync_queue WHERE attempts < ?1
"#;

pub(super) const DELETE_SYNC_QUEUE_ITEM: &str = r#"
    DELETE FROM sync_queue WHERE id = ?1
"#;

pub(super) const RECORD_SYNC_QUEUE_FAILURE: &str = r#"
    UPDATE sync_queue
    SET attempts = attempts + 1,
        last_attempt_at = ?2,
        last_error = ?3
    WHERE id = ?1
    RETURNING attempts
"#;

pub(super) const CLEAR_SYNC_QUEUE: &str = r#"
    DELETE FROM sync_queue
"#;
