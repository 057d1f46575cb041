//! Resources (dispatched per kind) and the polymorphic collaborator join table.
//!
//! Every mutation here runs inside the caller's transaction and re-reads the
//! resource owner, so authorization and filtering see the same snapshot as
//! the writes.

use chrono::Utc;
use sqlx::SqliteConnection;
use std::collections::HashSet;
use tracing::{debug, info};

use super::create::{CollaboratorAction, CollaboratorBatch};
use super::identity::{get_person, missing_people};
use super::models::{DbCollaborator, DbResource};
use crate::collaboration::policy;
use crate::error::LarderError;
use crate::types::{
    Collaborator, CollaboratorId, PersonId, Resource, ResourceCreate, ResourceId, ResourceKind,
};

const COLLABORATOR_COLUMNS: &str = "id, person_id, resource_kind, resource_id, created_at";

pub(super) async fn insert_resource(
    conn: &mut SqliteConnection,
    create: ResourceCreate,
) -> Result<Resource, LarderError> {
    if create.name.trim().is_empty() {
        return Err(LarderError::Validation(
            "resource name must be present".to_string(),
        ));
    }
    get_person(conn, create.owner_id).await?;

    let now = Utc::now();
    let row = sqlx::query_as::<_, DbResource>(&format!(
        r#"
        INSERT INTO {} (name, owner_id, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, name, owner_id, created_at, updated_at
        "#,
        create.kind.table()
    ))
    .bind(create.name.trim())
    .bind(create.owner_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    info!(kind = %create.kind, resource_id = row.id, owner_id = row.owner_id, "resource created");
    Ok(row.into_resource(create.kind))
}

pub(super) async fn get_resource(
    conn: &mut SqliteConnection,
    kind: ResourceKind,
    id: ResourceId,
) -> Result<Resource, LarderError> {
    let row = sqlx::query_as::<_, DbResource>(&format!(
        "SELECT id, name, owner_id, created_at, updated_at FROM {} WHERE id = ?",
        kind.table()
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| LarderError::NotFound(format!("{kind} {id}")))?;
    Ok(row.into_resource(kind))
}

pub(super) async fn list_collaborators(
    conn: &mut SqliteConnection,
    kind: ResourceKind,
    id: ResourceId,
) -> Result<Vec<Collaborator>, LarderError> {
    let rows = sqlx::query_as::<_, DbCollaborator>(&format!(
        r#"
        SELECT {COLLABORATOR_COLUMNS}
        FROM collaborators
        WHERE resource_kind = ? AND resource_id = ?
        ORDER BY id
        "#
    ))
    .bind(kind.as_str())
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;
    rows.into_iter().map(Collaborator::try_from).collect()
}

pub(super) async fn get_collaborator(
    conn: &mut SqliteConnection,
    id: CollaboratorId,
) -> Result<Collaborator, LarderError> {
    let row = sqlx::query_as::<_, DbCollaborator>(&format!(
        "SELECT {COLLABORATOR_COLUMNS} FROM collaborators WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| LarderError::NotFound(format!("collaborator {id}")))?;
    Collaborator::try_from(row)
}

pub(super) async fn find_collaborator(
    conn: &mut SqliteConnection,
    person_id: PersonId,
    kind: ResourceKind,
    id: ResourceId,
) -> Result<Option<Collaborator>, LarderError> {
    let row = sqlx::query_as::<_, DbCollaborator>(&format!(
        r#"
        SELECT {COLLABORATOR_COLUMNS}
        FROM collaborators
        WHERE person_id = ? AND resource_kind = ? AND resource_id = ?
        "#
    ))
    .bind(person_id)
    .bind(kind.as_str())
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?;
    row.map(Collaborator::try_from).transpose()
}

pub(super) async fn create_collaborators(
    conn: &mut SqliteConnection,
    batch: CollaboratorBatch,
) -> Result<Vec<Collaborator>, LarderError> {
    let resource = get_resource(conn, batch.resource_kind, batch.resource_id).await?;
    policy::ensure_owner(&resource, batch.acting_person_id)?;

    let existing: HashSet<PersonId> = list_collaborators(conn, resource.kind, resource.id)
        .await?
        .into_iter()
        .map(|c| c.person_id)
        .collect();

    let eligible = policy::eligible_person_ids(
        &batch.expanded_member_ids,
        &batch.direct_person_ids,
        resource.owner_id,
        &existing,
    );

    let missing = missing_people(conn, &eligible).await?;
    if !missing.is_empty() {
        return Err(LarderError::NotFound(format!("people {missing:?}")));
    }

    let now = Utc::now();
    let mut created = Vec::with_capacity(eligible.len());
    for person_id in eligible {
        let row = sqlx::query_as::<_, DbCollaborator>(&format!(
            r#"
            INSERT INTO collaborators (person_id, resource_kind, resource_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(person_id, resource_kind, resource_id) DO NOTHING
            RETURNING {COLLABORATOR_COLUMNS}
            "#
        ))
        .bind(person_id)
        .bind(resource.kind.as_str())
        .bind(resource.id)
        .bind(now)
        .fetch_optional(&mut *conn)
        .await?;

        match row {
            Some(row) => created.push(Collaborator::try_from(row)?),
            None => debug!(
                person_id,
                resource = %resource.reference(),
                "already a collaborator, skipping"
            ),
        }
    }

    info!(
        resource = %resource.reference(),
        acting_person_id = batch.acting_person_id,
        created = created.len(),
        "collaborators created"
    );
    Ok(created)
}

pub(super) async fn remove_collaborator(
    conn: &mut SqliteConnection,
    action: CollaboratorAction,
) -> Result<Collaborator, LarderError> {
    let collaborator = get_collaborator(conn, action.collaborator_id).await?;
    let resource =
        get_resource(conn, collaborator.resource_kind, collaborator.resource_id).await?;
    policy::ensure_owner_or_self(&resource, &collaborator, action.acting_person_id)?;

    sqlx::query("DELETE FROM collaborators WHERE id = ?")
        .bind(collaborator.id)
        .execute(&mut *conn)
        .await?;

    info!(
        collaborator_id = collaborator.id,
        person_id = collaborator.person_id,
        resource = %resource.reference(),
        acting_person_id = action.acting_person_id,
        "collaborator removed"
    );
    Ok(collaborator)
}

/// Hand the resource to the collaborator's person and drop their now-redundant row.
/// The outgoing owner is not added as a collaborator.
pub(super) async fn transfer_ownership(
    conn: &mut SqliteConnection,
    action: CollaboratorAction,
) -> Result<Resource, LarderError> {
    let collaborator = get_collaborator(conn, action.collaborator_id).await?;
    let resource =
        get_resource(conn, collaborator.resource_kind, collaborator.resource_id).await?;
    policy::ensure_owner(&resource, action.acting_person_id)?;

    let now = Utc::now();
    let row = sqlx::query_as::<_, DbResource>(&format!(
        r#"
        UPDATE {}
        SET owner_id = ?, updated_at = ?
        WHERE id = ?
        RETURNING id, name, owner_id, created_at, updated_at
        "#,
        resource.kind.table()
    ))
    .bind(collaborator.person_id)
    .bind(now)
    .bind(resource.id)
    .fetch_one(&mut *conn)
    .await?;

    sqlx::query(
        r#"
        DELETE FROM collaborators
        WHERE person_id = ? AND resource_kind = ? AND resource_id = ?
        "#,
    )
    .bind(collaborator.person_id)
    .bind(resource.kind.as_str())
    .bind(resource.id)
    .execute(&mut *conn)
    .await?;

    info!(
        resource = %resource.reference(),
        previous_owner_id = resource.owner_id,
        new_owner_id = row.owner_id,
        "ownership transferred"
    );
    Ok(row.into_resource(resource.kind))
}
