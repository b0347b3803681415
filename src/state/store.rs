//! Roster event store
//!
//! A publish/subscribe hub carrying typed roster events. External change
//! notifications enter through [`RosterStore::notify_data_changed`]; the
//! pipeline publishes the outcome of every run.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// What kind of backend change triggered a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeCause {
    RegistrationChanged,
    AttendeeChanged,
    ConferenceChanged,
    Manual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RosterEvent {
    /// Backend data changed; listeners re-run the full pipeline
    DataChanged { cause: ChangeCause },
    /// A pipeline run was applied
    ViewUpdated { token: u64, attendees: usize },
    /// A pipeline run failed because the attendee source was unavailable
    RefreshFailed {
        token: u64,
        message: String,
        retryable: bool,
    },
}

/// Broadcast store for [`RosterEvent`]s
#[derive(Clone, Debug)]
pub struct RosterStore {
    sender: broadcast::Sender<RosterEvent>,
}

impl RosterStore {
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a new RosterStore instance
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event, returning how many subscribers received it.
    ///
    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: RosterEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                debug!(event = ?event, "No roster subscribers");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.sender.subscribe()
    }

    pub fn notify_data_changed(&self, cause: ChangeCause) -> usize {
        self.publish(RosterEvent::DataChanged { cause })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for RosterStore {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}
