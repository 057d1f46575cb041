use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::resource::ResourceRef;

/// Outbound "new collaborator assigned" obligation, one per created collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollaboratorAssigned {
    pub resource: ResourceRef,
    pub collaborator_person_id: i64,
    pub owner_person_id: i64,
    pub queued_at: DateTime<Utc>,
}
