//! Authorization and eligibility rules for collaborator changes (no IO).

use std::collections::{BTreeSet, HashSet};
use tracing::debug;

use crate::error::LarderError;
use crate::types::{Collaborator, PersonId, Resource};

/// Only the current owner may add collaborators or hand the resource over.
pub fn ensure_owner(resource: &Resource, acting_person_id: PersonId) -> Result<(), LarderError> {
    if resource.owner_id == acting_person_id {
        return Ok(());
    }
    Err(LarderError::Forbidden(format!(
        "person {acting_person_id} does not own {}",
        resource.reference()
    )))
}

/// The owner may remove anyone; a collaborator may remove themself.
pub fn ensure_owner_or_self(
    resource: &Resource,
    collaborator: &Collaborator,
    acting_person_id: PersonId,
) -> Result<(), LarderError> {
    if resource.owner_id == acting_person_id || collaborator.person_id == acting_person_id {
        return Ok(());
    }
    Err(LarderError::Forbidden(format!(
        "person {acting_person_id} may not remove collaborator {}",
        collaborator.id
    )))
}

/// Merge group members with directly named people and keep only those who can
/// become new collaborators.
///
/// Order of filtering: union (group members, then direct ids), drop the owner,
/// drop people already collaborating, drop duplicates. The result is sorted by
/// id so repeated requests produce the same insert order.
pub fn eligible_person_ids(
    expanded_member_ids: &[PersonId],
    direct_person_ids: &[PersonId],
    owner_id: PersonId,
    existing: &HashSet<PersonId>,
) -> Vec<PersonId> {
    let merged = expanded_member_ids
        .iter()
        .chain(direct_person_ids)
        .copied()
        .collect::<Vec<_>>();
    let requested = merged.len();

    let eligible = merged
        .into_iter()
        .filter(|id| *id != owner_id)
        .filter(|id| !existing.contains(id))
        .collect::<BTreeSet<_>>();

    debug!(
        requested,
        eligible = eligible.len(),
        owner_id,
        already_collaborating = existing.len(),
        "collaborator candidates filtered"
    );
    eligible.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceKind;
    use chrono::Utc;

    fn package(owner_id: PersonId) -> Resource {
        Resource {
            kind: ResourceKind::Package,
            id: 1,
            name: "redis".to_string(),
            owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn collaborator(person_id: PersonId) -> Collaborator {
        Collaborator {
            id: 9,
            person_id,
            resource_kind: ResourceKind::Package,
            resource_id: 1,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn owner_is_never_eligible() {
        let ids = eligible_person_ids(&[1, 2], &[1, 3], 1, &HashSet::new());
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn overlapping_sources_and_existing_collaborators_are_collapsed() {
        let existing = HashSet::from([4]);
        let ids = eligible_person_ids(&[5, 4, 2, 5], &[2, 2, 7, 4], 1, &existing);
        assert_eq!(ids, vec![2, 5, 7]);
    }

    #[test]
    fn nothing_requested_yields_nothing() {
        assert!(eligible_person_ids(&[], &[], 1, &HashSet::new()).is_empty());
    }

    #[test]
    fn only_the_owner_passes_the_owner_check() {
        let resource = package(1);
        assert!(ensure_owner(&resource, 1).is_ok());
        assert!(matches!(
            ensure_owner(&resource, 2),
            Err(LarderError::Forbidden(_))
        ));
    }

    #[test]
    fn removal_is_allowed_for_owner_and_self_only() {
        let resource = package(1);
        let collab = collaborator(2);
        assert!(ensure_owner_or_self(&resource, &collab, 1).is_ok());
        assert!(ensure_owner_or_self(&resource, &collab, 2).is_ok());
        assert!(matches!(
            ensure_owner_or_self(&resource, &collab, 3),
            Err(LarderError::Forbidden(_))
        ));
    }
}
