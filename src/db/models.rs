use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::LarderError;
use crate::types::{Collaborator, Resource, ResourceKind};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbPerson {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbAccount {
    pub id: i64,
    pub person_id: i64,
    pub provider: String,
    pub uid: String,
    pub username: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbGroup {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Row shape shared by every per-kind resource table.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbResource {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbResource {
    pub fn into_resource(self, kind: ResourceKind) -> Resource {
        Resource {
            kind,
            id: self.id,
            name: self.name,
            owner_id: self.owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbCollaborator {
    pub id: i64,
    pub person_id: i64,
    pub resource_kind: String,
    pub resource_id: i64,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<DbCollaborator> for Collaborator {
    type Error = LarderError;

    fn try_from(row: DbCollaborator) -> Result<Self, Self::Error> {
        let resource_kind = ResourceKind::from_tag(&row.resource_kind).ok_or_else(|| {
            LarderError::UnexpectedError(format!(
                "collaborator {} has unknown resource kind {:?}",
                row.id, row.resource_kind
            ))
        })?;
        Ok(Collaborator {
            id: row.id,
            person_id: row.person_id,
            resource_kind,
            resource_id: row.resource_id,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbIndividualSignature {
    pub id: i64,
    pub person_id: i64,
    pub agreement_version: String,
    pub signed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbCorporateSignature {
    pub id: i64,
    /// The person who signed on behalf of the organization.
    pub person_id: i64,
    pub organization_id: i64,
    pub agreement_version: String,
    pub signed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbOrganization {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, FromRow)]
pub struct DbContributor {
    pub id: i64,
    pub organization_id: i64,
    pub person_id: i64,
    pub admin: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, FromRow)]
pub struct DbCommitAuthor {
    pub id: i64,
    pub login: String,
    pub repository: String,
    pub created_at: DateTime<Utc>,
}
