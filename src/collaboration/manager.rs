use larder_schema::{CandidateQuery, CollaboratorRequest, ResourceRef};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::debug;

use super::policy;
use crate::config::SearchConfig;
use crate::db::{CollaboratorAction, CollaboratorBatch, DbActorHandle, DbPerson};
use crate::error::LarderError;
use crate::identity::IdentityStore;
use crate::membership::MembershipResolver;
use crate::notify::NotificationQueue;
use crate::types::{Collaborator, CollaboratorId, PersonId, Resource, ResourceCreate, ResourceKind};

/// Authorization core for collaborators on any ownable resource.
#[derive(Clone)]
pub struct CollaborationManager {
    db: DbActorHandle,
    identity: IdentityStore,
    members: Arc<dyn MembershipResolver>,
    notifications: NotificationQueue,
    search: Arc<SearchConfig>,
}

impl CollaborationManager {
    pub fn new(
        db: DbActorHandle,
        identity: IdentityStore,
        members: Arc<dyn MembershipResolver>,
        notifications: NotificationQueue,
        search: Arc<SearchConfig>,
    ) -> Self {
        Self {
            db,
            identity,
            members,
            notifications,
            search,
        }
    }

    pub async fn create_resource(
        &self,
        kind: ResourceKind,
        name: &str,
        owner_id: PersonId,
    ) -> Result<Resource, LarderError> {
        self.db
            .create_resource(ResourceCreate {
                kind,
                name: name.to_string(),
                owner_id,
            })
            .await
    }

    pub async fn resource(&self, reference: &ResourceRef) -> Result<Resource, LarderError> {
        let (kind, id) = ResourceKind::resolve(reference)?;
        self.db.get_resource(kind, id).await
    }

    pub async fn collaborators(&self, reference: &ResourceRef) -> Result<Vec<Collaborator>, LarderError> {
        let (kind, id) = ResourceKind::resolve(reference)?;
        self.db.list_collaborators(kind, id).await
    }

    pub async fn collaborator(&self, id: CollaboratorId) -> Result<Collaborator, LarderError> {
        self.db.get_collaborator(id).await
    }

    /// The person's collaborator row on `reference`, if any.
    pub async fn collaborator_for(
        &self,
        person_id: PersonId,
        reference: &ResourceRef,
    ) -> Result<Option<Collaborator>, LarderError> {
        let (kind, id) = ResourceKind::resolve(reference)?;
        self.db.find_collaborator(person_id, kind, id).await
    }

    /// People who could be added to `reference`: search matches minus the excluded ids
    /// and the current owner.
    pub async fn list_candidates(
        &self,
        reference: &ResourceRef,
        query: &CandidateQuery,
    ) -> Result<Vec<DbPerson>, LarderError> {
        let resource = self.resource(reference).await?;
        let excluded: HashSet<PersonId> = query.excluded_person_ids.iter().copied().collect();

        let candidates: Vec<DbPerson> = self
            .identity
            .search(&query.query)
            .await?
            .into_iter()
            .filter(|p| p.id != resource.owner_id && !excluded.contains(&p.id))
            .take(self.search.limit)
            .collect();

        debug!(
            resource = %reference,
            query = %query.query,
            excluded = excluded.len(),
            candidates = candidates.len(),
            "collaborator candidates listed"
        );
        Ok(candidates)
    }

    /// Add every eligible person named directly or through a group.
    ///
    /// Either all eligible collaborators are created or none are. One notification is
    /// queued per created collaborator; people who already collaborate are skipped.
    pub async fn create_collaborators(
        &self,
        acting_person_id: PersonId,
        request: &CollaboratorRequest,
    ) -> Result<Vec<Collaborator>, LarderError> {
        let (kind, resource_id) = ResourceKind::resolve(&request.resource)?;

        // Authorize before touching groups so non-owners learn nothing about them.
        let resource = self.db.get_resource(kind, resource_id).await?;
        policy::ensure_owner(&resource, acting_person_id)?;

        let mut expanded_member_ids = Vec::new();
        for &group_id in &request.group_ids {
            expanded_member_ids.extend(self.members.expand_group(group_id).await?);
        }

        let created = self
            .db
            .create_collaborators(CollaboratorBatch {
                acting_person_id,
                resource_kind: kind,
                resource_id,
                expanded_member_ids,
                direct_person_ids: request.person_ids.clone(),
            })
            .await?;

        for collaborator in &created {
            self.notifications
                .collaborator_assigned(collaborator, resource.owner_id);
        }
        Ok(created)
    }

    pub async fn remove_collaborator(
        &self,
        acting_person_id: PersonId,
        collaborator_id: CollaboratorId,
    ) -> Result<(), LarderError> {
        self.db
            .remove_collaborator(CollaboratorAction {
                acting_person_id,
                collaborator_id,
            })
            .await?;
        Ok(())
    }

    /// Make the collaborator's person the owner. The previous owner keeps no access.
    pub async fn transfer_ownership(
        &self,
        acting_person_id: PersonId,
        collaborator_id: CollaboratorId,
    ) -> Result<Resource, LarderError> {
        self.db
            .transfer_ownership(CollaboratorAction {
                acting_person_id,
                collaborator_id,
            })
            .await
    }
}
