//! Change notification fan-out for live subscriptions.

use std::collections::HashMap;

use tokio::sync::{broadcast, RwLock};
use tracing::trace;

use super::CollectionPath;

/// Buffered notifications per collection before receivers start lagging.
const CHANNEL_CAPACITY: usize = 16;

/// Notification that a collection changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub collection: CollectionPath,
}

/// Tracks one broadcast channel per collection path.
pub struct ChangeHub {
    channels: RwLock<HashMap<CollectionPath, broadcast::Sender<ChangeEvent>>>,
}

impl ChangeHub {
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribes to changes under a collection.
    pub async fn subscribe(&self, collection: &CollectionPath) -> broadcast::Receiver<ChangeEvent> {
        let mut channels = self.channels.write().await;

        if let Some(sender) = channels.get(collection) {
            sender.subscribe()
        } else {
            let (sender, receiver) = broadcast::channel(CHANNEL_CAPACITY);
            channels.insert(collection.clone(), sender);
            receiver
        }
    }

    /// Notifies every subscriber of a collection.
    pub async fn notify(&self, collection: &CollectionPath) {
        let channels = self.channels.read().await;

        if let Some(sender) = channels.get(collection) {
            // No receivers left is fine
            let delivered = sender
                .send(ChangeEvent {
                    collection: collection.clone(),
                })
                .unwrap_or(0);
            trace!(collection = %collection, delivered, "change notified");
        }
    }

    /// Notifies every collection that has subscribers.
    pub async fn notify_all(&self) {
        let channels = self.channels.read().await;

        for (collection, sender) in channels.iter() {
            let delivered = sender
                .send(ChangeEvent {
                    collection: collection.clone(),
                })
                .unwrap_or(0);
            trace!(collection = %collection, delivered, "change notified");
        }
    }

    /// Number of live receivers for a collection.
    pub async fn receiver_count(&self, collection: &CollectionPath) -> usize {
        let channels = self.channels.read().await;
        channels
            .get(collection)
            .map(broadcast::Sender::receiver_count)
            .unwrap_or(0)
    }
}

impl Default for ChangeHub {
    fn default() -> Self {
        Self::new()
    }
}
