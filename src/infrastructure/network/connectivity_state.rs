use crate::application::ports::connectivity::ConnectivityProbe;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// Platform connectivity signal as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

impl ConnectivityEvent {
    pub fn is_online(&self) -> bool {
        matches!(self, ConnectivityEvent::Online)
    }
}

impl From<bool> for ConnectivityEvent {
    fn from(online: bool) -> Self {
        if online {
            ConnectivityEvent::Online
        } else {
            ConnectivityEvent::Offline
        }
    }
}

/// Shared online/offline cell. The monitor writes it, everyone else reads.
#[derive(Debug)]
pub struct ConnectivityState {
    online: watch::Sender<bool>,
}

impl ConnectivityState {
    pub fn new(initially_online: bool) -> Self {
        let (online, _) = watch::channel(initially_online);
        Self { online }
    }

    /// Stores the new value and returns the previous one.
    pub fn set_online(&self, online: bool) -> bool {
        self.online.send_replace(online)
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.online.subscribe()
    }
}

impl Default for ConnectivityState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ConnectivityProbe for ConnectivityState {
    fn is_online(&self) -> bool {
        *self.online.borrow()
    }
}
