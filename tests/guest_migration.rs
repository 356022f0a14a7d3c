mod common;

use common::{put_record, setup_engine};
use liftlog_sync::domain::value_objects::{EntityKind, OwnerId, SyncOperation};
use liftlog_sync::{AuthLifecycleEvent, MigrationOutcome, MigrationPhase, TrainingRecordRepository};
use serde_json::json;

async fn seed_guest_records(engine: &liftlog_sync::SyncEngine) {
    let guest = OwnerId::guest();
    put_record(engine, EntityKind::Workout, guest.clone(), json!({"name": "Guest push"})).await;
    put_record(engine, EntityKind::Template, guest.clone(), json!({"name": "PPL"})).await;
    put_record(engine, EntityKind::PersonalRecord, guest, json!({"kg": 140})).await;
}

#[tokio::test]
async fn sign_up_migrates_guest_data_and_pushes_it() {
    let ctx = setup_engine(false).await;
    seed_guest_records(&ctx.engine).await;
    let migration = ctx.engine.migration_service.clone();

    let summary = migration.get_migration_summary().await.unwrap();
    assert_eq!(summary.total(), 3);

    let outcome = migration
        .handle_auth_event(&AuthLifecycleEvent::sign_up("user-42"))
        .await;
    let MigrationOutcome::Migrated(summary) = outcome else {
        panic!("expected migration, got {outcome:?}");
    };
    assert_eq!(summary.workouts, 1);
    assert_eq!(summary.templates, 1);
    assert_eq!(summary.personal_records, 1);
    assert_eq!(migration.phase(), MigrationPhase::Idle);
    assert!(!migration.has_local_data().await.unwrap());

    let dispatcher = ctx.engine.dispatcher.clone();
    let pending = dispatcher.get_pending_items().await.unwrap();
    assert_eq!(pending.len(), 2, "personal records are not pushed");
    assert!(pending.iter().all(|item| item.operation == SyncOperation::Create));

    ctx.engine.connectivity.set_online(true);
    dispatcher.sync_now().await.unwrap();

    let mut methods = ctx.remote.methods();
    methods.sort_unstable();
    assert_eq!(methods, vec!["create_template", "create_workout"]);
    assert!(ctx
        .remote
        .calls()
        .iter()
        .all(|call| call.payload.as_ref().unwrap()["user_id"] == "user-42"));

    let owner = OwnerId::user("user-42").unwrap();
    let workouts = ctx
        .engine
        .repository
        .list_by_owner(EntityKind::Workout, &owner)
        .await
        .unwrap();
    assert_eq!(workouts.len(), 1);
    assert!(workouts[0].synced);
}

#[tokio::test]
async fn repeated_sign_in_does_not_duplicate_queue_items() {
    let ctx = setup_engine(false).await;
    seed_guest_records(&ctx.engine).await;
    let migration = ctx.engine.migration_service.clone();

    let first = migration
        .migrate_local_data_to_user("user-7")
        .await
        .unwrap();
    assert_eq!(first.total(), 3);

    let outcome = migration
        .handle_auth_event(&AuthLifecycleEvent::sign_in("user-7"))
        .await;
    assert_eq!(outcome, MigrationOutcome::NothingToMigrate);

    let again = migration
        .migrate_local_data_to_user("user-7")
        .await
        .unwrap();
    assert!(again.is_empty());
    assert_eq!(ctx.engine.dispatcher.get_all_items().await.unwrap().len(), 2);
}

#[tokio::test]
async fn auth_event_for_guest_sentinel_fails_open() {
    let ctx = setup_engine(false).await;
    seed_guest_records(&ctx.engine).await;

    let outcome = ctx
        .engine
        .migration_service
        .handle_auth_event(&AuthLifecycleEvent::sign_in("guest"))
        .await;

    assert!(matches!(outcome, MigrationOutcome::Failed(_)));
    assert!(ctx.engine.migration_service.has_local_data().await.unwrap());
    assert!(ctx.engine.dispatcher.get_all_items().await.unwrap().is_empty());
}
