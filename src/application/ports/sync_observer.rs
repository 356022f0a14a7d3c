use crate::domain::entities::SyncQueueItem;

/// Notified when a queue item exhausts its retry budget.
///
/// Parked items stay in the queue; this hook only lets the host surface them.
pub trait ParkedItemObserver: Send + Sync {
    fn on_parked(&self, item: &SyncQueueItem);
}
