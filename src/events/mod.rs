use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<InventoryEvent>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<InventoryEvent>) -> Self {
        Self { sender }
    }

    /// Creates a sender together with its receiving end.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<InventoryEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: InventoryEvent) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Changes to stored inventory and catalog data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InventoryEvent {
    InventorySaved {
        date: NaiveDate,
        entries: usize,
    },
    MovedToTrash {
        date: NaiveDate,
        deleted_at: DateTime<Utc>,
    },
    Restored {
        date: NaiveDate,
    },
    Purged {
        date: NaiveDate,
    },
    CatalogChanged {
        products: usize,
    },
}

/// Drains the event channel, logging each event, until every sender is gone.
pub async fn process_events(mut receiver: mpsc::Receiver<InventoryEvent>) {
    info!("Event processor started");
    while let Some(event) = receiver.recv().await {
        debug!(event = ?event, "inventory event");
    }
    info!("Event processor stopped");
}
