use crate::application::ports::ConnectivityProbe;
use crate::application::services::sync_dispatcher::SyncDispatcher;
use crate::infrastructure::network::{ConnectivityEvent, ConnectivityState};
use futures::{Stream, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

const LOG_TARGET: &str = "sync::network";

/// Translates platform connectivity signals into engine state.
pub struct NetworkMonitor {
    connectivity: Arc<ConnectivityState>,
    dispatcher: Arc<SyncDispatcher>,
    pending_poll_interval: Duration,
}

impl NetworkMonitor {
    pub fn new(
        connectivity: Arc<ConnectivityState>,
        dispatcher: Arc<SyncDispatcher>,
        pending_poll_interval: Duration,
    ) -> Self {
        Self {
            connectivity,
            dispatcher,
            pending_poll_interval,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.connectivity.is_offline()
    }

    /// Records the new connectivity and, on offline to online, requests a pass.
    /// The returned handle belongs to that pass, if one was requested.
    pub fn handle_connectivity_change(&self, event: ConnectivityEvent) -> Option<JoinHandle<()>> {
        let online = event.is_online();
        let was_online = self.connectivity.set_online(online);

        match (was_online, online) {
            (false, true) => {
                tracing::info!(target: LOG_TARGET, "connectivity restored, resuming sync");
                Some(self.dispatcher.request_sync())
            }
            (true, false) => {
                tracing::info!(target: LOG_TARGET, "connectivity lost, queueing locally");
                None
            }
            _ => None,
        }
    }

    /// Feeds a platform event stream into the monitor until it ends.
    pub fn attach<S>(self: &Arc<Self>, events: S) -> JoinHandle<()>
    where
        S: Stream<Item = ConnectivityEvent> + Send + 'static,
    {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            futures::pin_mut!(events);
            while let Some(event) = events.next().await {
                monitor.handle_connectivity_change(event);
            }
            tracing::debug!(target: LOG_TARGET, "connectivity stream ended");
        })
    }

    pub fn subscribe(&self) -> NetworkStatusSubscription {
        let (pending_tx, pending_rx) = watch::channel(0u64);
        let dispatcher = Arc::clone(&self.dispatcher);
        let poll_interval = self.pending_poll_interval;

        let poller = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            loop {
                ticker.tick().await;
                match dispatcher.get_pending_count().await {
                    Ok(count) => {
                        pending_tx.send_replace(count);
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: LOG_TARGET,
                            error = %err,
                            "failed to read pending sync count"
                        );
                    }
                }
                if pending_tx.is_closed() {
                    break;
                }
            }
        });

        NetworkStatusSubscription {
            online: self.connectivity.subscribe(),
            pending_sync_count: pending_rx,
            poller: Some(poller),
        }
    }
}

/// Live view of `is_offline` and the pending queue depth. Polling stops when
/// the subscription is dropped or unsubscribed.
pub struct NetworkStatusSubscription {
    online: watch::Receiver<bool>,
    pending_sync_count: watch::Receiver<u64>,
    poller: Option<JoinHandle<()>>,
}

impl NetworkStatusSubscription {
    pub fn is_offline(&self) -> bool {
        !*self.online.borrow()
    }

    pub fn pending_sync_count(&self) -> u64 {
        *self.pending_sync_count.borrow()
    }

    pub fn online_receiver(&self) -> watch::Receiver<bool> {
        self.online.clone()
    }

    pub fn pending_receiver(&self) -> watch::Receiver<u64> {
        self.pending_sync_count.clone()
    }

    /// Waits for the next connectivity change and returns the new `is_offline`.
    pub async fn offline_changed(&mut self) -> Option<bool> {
        self.online.changed().await.ok()?;
        Some(!*self.online.borrow_and_update())
    }

    /// Waits for the next queue depth sample.
    pub async fn pending_changed(&mut self) -> Option<u64> {
        self.pending_sync_count.changed().await.ok()?;
        Some(*self.pending_sync_count.borrow_and_update())
    }

    pub fn is_active(&self) -> bool {
        self.poller
            .as_ref()
            .is_some_and(|poller| !poller.is_finished())
    }

    pub fn unsubscribe(&mut self) {
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

impl Drop for NetworkStatusSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
