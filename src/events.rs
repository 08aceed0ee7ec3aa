use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::BomStatus;

/// Events emitted by the service layer after successful mutations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Material master events
    MaterialsImported {
        imported: usize,
        skipped: usize,
    },
    MaterialUpserted {
        material_code: String,
    },

    // Recipe events
    BomCreated {
        bom_id: Uuid,
        bom_code: String,
        total_cost: Decimal,
    },
    BomUpdated {
        bom_id: Uuid,
    },
    BomStatusChanged {
        bom_id: Uuid,
        old_status: BomStatus,
        new_status: BomStatus,
    },
    LineItemAdded {
        bom_id: Uuid,
        index: usize,
    },
    LineItemRemoved {
        bom_id: Uuid,
        index: usize,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the channel is closed.
    /// Event delivery is best-effort; a dropped event never fails a request.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(err) = self.send(event.clone()).await {
            warn!(?event, "{}", err);
        }
    }
}

/// Background consumer for the event channel. Runs until every sender is
/// dropped.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::BomCreated {
                bom_id,
                bom_code,
                total_cost,
            } => info!(%bom_id, %bom_code, %total_cost, "BOM created"),
            Event::BomStatusChanged {
                bom_id,
                old_status,
                new_status,
            } => info!(%bom_id, %old_status, %new_status, "BOM status changed"),
            other => info!(event = ?other, "event processed"),
        }
    }
    info!("event channel closed; processor exiting");
}
