use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CollaboratorId, OrganizationId, PersonId, ResourceId, ResourceKind};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonCreate {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndividualSignatureCreate {
    pub person_id: PersonId,
    pub agreement_version: String,
    pub signed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorporateSignatureCreate {
    pub person_id: PersonId,
    pub organization_id: OrganizationId,
    pub agreement_version: String,
    pub signed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributorCreate {
    pub organization_id: OrganizationId,
    pub person_id: PersonId,
    pub admin: bool,
}

/// One bulk collaborator creation, with group references already expanded.
///
/// Owner/existing filtering happens inside the storage transaction so it sees
/// the same snapshot as the inserts.
#[derive(Debug, Clone)]
pub struct CollaboratorBatch {
    pub acting_person_id: PersonId,
    pub resource_kind: ResourceKind,
    pub resource_id: ResourceId,
    pub expanded_member_ids: Vec<PersonId>,
    pub direct_person_ids: Vec<PersonId>,
}

/// A mutation on an existing collaborator row by `acting_person_id`.
#[derive(Debug, Clone, Copy)]
pub struct CollaboratorAction {
    pub acting_person_id: PersonId,
    pub collaborator_id: CollaboratorId,
}
