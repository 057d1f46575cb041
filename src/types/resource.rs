use chrono::{DateTime, Utc};
use larder_schema::ResourceRef;
use serde::{Deserialize, Serialize};

use super::{CollaboratorId, PersonId, ResourceId};
use crate::error::LarderError;

/// Known kinds of ownable resources.
///
/// Each kind is stored in its own table; [`ResourceKind::table`] is the
/// dispatch table used by the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKind {
    Package,
    Tool,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 2] = [ResourceKind::Package, ResourceKind::Tool];

    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Package => "Package",
            ResourceKind::Tool => "Tool",
        }
    }

    pub(crate) fn table(self) -> &'static str {
        match self {
            ResourceKind::Package => "packages",
            ResourceKind::Tool => "tools",
        }
    }

    /// Exact, case-sensitive match on the wire tag.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == tag)
    }

    /// Resolve an inbound reference; unknown kinds are reported as not found.
    pub fn resolve(reference: &ResourceRef) -> Result<(Self, ResourceId), LarderError> {
        Self::from_tag(&reference.kind)
            .map(|kind| (kind, reference.id))
            .ok_or_else(|| LarderError::NotFound(format!("unknown resource kind {reference}")))
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ownable resource with exactly one current owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub kind: ResourceKind,
    pub id: ResourceId,
    pub name: String,
    pub owner_id: PersonId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource {
    pub fn reference(&self) -> ResourceRef {
        ResourceRef::new(self.kind.as_str(), self.id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceCreate {
    pub kind: ResourceKind,
    pub name: String,
    pub owner_id: PersonId,
}

/// A non-owner person granted access to one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: CollaboratorId,
    pub person_id: PersonId,
    pub resource_kind: ResourceKind,
    pub resource_id: ResourceId,
    pub created_at: DateTime<Utc>,
}

impl Collaborator {
    pub fn resource_ref(&self) -> ResourceRef {
        ResourceRef::new(self.resource_kind.as_str(), self.resource_id)
    }
}
