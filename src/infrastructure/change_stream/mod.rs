use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// One delivery on a snapshot subscription: either the full current record
/// set of the owner's collection, or an error notification. Error events do
/// not end the subscription; the caller decides when to unsubscribe by
/// dropping the receiver.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotEvent<T> {
    Snapshot { records: Vec<T> },
    Error { message: String },
}

/// Fan-out point for owner-scoped snapshot subscriptions. Mutations publish
/// the full record set after every successful write; each owner gets an
/// isolated channel.
pub struct ChangeStreamHub<T> {
    capacity: usize,
    channels: Mutex<HashMap<Uuid, broadcast::Sender<SnapshotEvent<T>>>>,
}

impl<T: Clone> ChangeStreamHub<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            channels: Mutex::new(HashMap::new()),
        }
    }

    pub fn subscribe(&self, owner_id: Uuid) -> broadcast::Receiver<SnapshotEvent<T>> {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        channels
            .entry(owner_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    pub fn publish(&self, owner_id: Uuid, records: Vec<T>) {
        self.send(owner_id, SnapshotEvent::Snapshot { records });
    }

    pub fn publish_error(&self, owner_id: Uuid, message: String) {
        self.send(owner_id, SnapshotEvent::Error { message });
    }

    fn send(&self, owner_id: Uuid, event: SnapshotEvent<T>) {
        let mut channels = self
            .channels
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Drop channels whose last subscriber has gone away.
        channels.retain(|_, sender| sender.receiver_count() > 0);

        if let Some(sender) = channels.get(&owner_id) {
            // Send only fails when there are no receivers, which retain
            // already ruled out; a racing unsubscribe is harmless.
            let _ = sender.send(event);
        } else {
            debug!(%owner_id, "change_stream: no subscribers, snapshot dropped");
        }
    }
}
