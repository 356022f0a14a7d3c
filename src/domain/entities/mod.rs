mod migration_summary;
mod sync_command;
mod sync_queue_item;
mod training_record;
mod workout_set;

pub use migration_summary::MigrationSummary;
pub use sync_command::SyncCommand;
pub use sync_queue_item::{SyncQueueItem, SyncQueueItemDraft};
pub use training_record::TrainingRecord;
pub use workout_set::WorkoutSet;
