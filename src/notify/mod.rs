//! Outbound notification obligations.
//!
//! The core only records that a notification is owed; delivery belongs to
//! whoever drains the receiving end of the queue.

use chrono::Utc;
use larder_schema::CollaboratorAssigned;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::types::{Collaborator, PersonId};

/// Sending half of the "collaborator assigned" queue. Cheap to clone.
#[derive(Clone)]
pub struct NotificationQueue {
    tx: mpsc::UnboundedSender<CollaboratorAssigned>,
}

impl NotificationQueue {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CollaboratorAssigned>) {
        let (tx, rx) = mpsc::unbounded_channel::<CollaboratorAssigned>();
        (Self { tx }, rx)
    }

    /// Fire and forget: a closed queue is logged and otherwise ignored.
    pub fn collaborator_assigned(&self, collaborator: &Collaborator, owner_id: PersonId) {
        let event = CollaboratorAssigned {
            resource: collaborator.resource_ref(),
            collaborator_person_id: collaborator.person_id,
            owner_person_id: owner_id,
            queued_at: Utc::now(),
        };

        match self.tx.send(event) {
            Ok(()) => debug!(
                collaborator_id = collaborator.id,
                person_id = collaborator.person_id,
                "collaborator notification queued"
            ),
            Err(mpsc::error::SendError(event)) => warn!(
                resource = %event.resource,
                person_id = event.collaborator_person_id,
                "notification queue closed; dropping collaborator notification"
            ),
        }
    }
}
