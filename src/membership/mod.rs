//! Group management and group-to-member expansion.

use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::debug;

use crate::db::{DbActorHandle, DbGroup};
use crate::error::LarderError;
use crate::types::{GroupId, PersonId};

/// Anything that can expand a group reference into its current members.
///
/// Expansion is a snapshot; no lock is held on the group afterwards.
#[async_trait]
pub trait MembershipResolver: Send + Sync {
    /// Fails with [`LarderError::NotFound`] when the group does not exist.
    async fn expand_group(&self, group_id: GroupId) -> Result<BTreeSet<PersonId>, LarderError>;
}

/// Database-backed groups.
#[derive(Clone)]
pub struct GroupDirectory {
    db: DbActorHandle,
}

impl GroupDirectory {
    pub fn new(db: DbActorHandle) -> Self {
        Self { db }
    }

    /// Names are unique (case-sensitive) and must not be blank.
    pub async fn create_group(&self, name: &str) -> Result<DbGroup, LarderError> {
        self.db.create_group(name).await
    }

    pub async fn add_member(&self, group_id: GroupId, person_id: PersonId) -> Result<(), LarderError> {
        self.db.add_group_member(group_id, person_id).await
    }

    pub async fn remove_member(
        &self,
        group_id: GroupId,
        person_id: PersonId,
    ) -> Result<bool, LarderError> {
        self.db.remove_group_member(group_id, person_id).await
    }
}

#[async_trait]
impl MembershipResolver for GroupDirectory {
    async fn expand_group(&self, group_id: GroupId) -> Result<BTreeSet<PersonId>, LarderError> {
        let members: BTreeSet<PersonId> =
            self.db.group_member_ids(group_id).await?.into_iter().collect();
        debug!(group_id, members = members.len(), "group expanded");
        Ok(members)
    }
}
