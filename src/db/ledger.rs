//! Append-only agreement signatures, organizations and their contributors.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;

use super::create::{ContributorCreate, CorporateSignatureCreate, IndividualSignatureCreate};
use super::identity::get_person;
use super::models::{DbContributor, DbCorporateSignature, DbIndividualSignature, DbOrganization};
use crate::error::LarderError;
use crate::types::{OrganizationId, PersonId};

/// Which agreement kinds a person has at least one signature for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgreementStatus {
    pub individual: bool,
    pub corporate: bool,
}

fn require_version(version: &str) -> Result<(), LarderError> {
    if version.trim().is_empty() {
        return Err(LarderError::Validation(
            "agreement version must be present".to_string(),
        ));
    }
    Ok(())
}

pub(super) async fn insert_individual_signature(
    conn: &mut SqliteConnection,
    create: IndividualSignatureCreate,
) -> Result<DbIndividualSignature, LarderError> {
    require_version(&create.agreement_version)?;
    get_person(conn, create.person_id).await?;

    let sig = sqlx::query_as::<_, DbIndividualSignature>(
        r#"
        INSERT INTO individual_signatures (person_id, agreement_version, signed_at, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, person_id, agreement_version, signed_at, created_at
        "#,
    )
    .bind(create.person_id)
    .bind(&create.agreement_version)
    .bind(create.signed_at)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    info!(
        person_id = sig.person_id,
        version = %sig.agreement_version,
        "individual agreement signed"
    );
    Ok(sig)
}

pub(super) async fn insert_corporate_signature(
    conn: &mut SqliteConnection,
    create: CorporateSignatureCreate,
) -> Result<DbCorporateSignature, LarderError> {
    require_version(&create.agreement_version)?;
    get_person(conn, create.person_id).await?;
    get_organization(conn, create.organization_id).await?;

    let sig = sqlx::query_as::<_, DbCorporateSignature>(
        r#"
        INSERT INTO corporate_signatures (person_id, organization_id, agreement_version, signed_at, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, person_id, organization_id, agreement_version, signed_at, created_at
        "#,
    )
    .bind(create.person_id)
    .bind(create.organization_id)
    .bind(&create.agreement_version)
    .bind(create.signed_at)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    info!(
        person_id = sig.person_id,
        organization_id = sig.organization_id,
        version = %sig.agreement_version,
        "corporate agreement signed"
    );
    Ok(sig)
}

pub(super) async fn list_individual_signatures(
    conn: &mut SqliteConnection,
    person_id: PersonId,
) -> Result<Vec<DbIndividualSignature>, LarderError> {
    let rows = sqlx::query_as::<_, DbIndividualSignature>(
        r#"
        SELECT id, person_id, agreement_version, signed_at, created_at
        FROM individual_signatures
        WHERE person_id = ?
        ORDER BY id
        "#,
    )
    .bind(person_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Both checks read the same snapshot.
pub(super) async fn agreement_status(
    conn: &mut SqliteConnection,
    person_id: PersonId,
) -> Result<AgreementStatus, LarderError> {
    let (individual, corporate): (bool, bool) = sqlx::query_as(
        r#"
        SELECT
            EXISTS(SELECT 1 FROM individual_signatures WHERE person_id = ?1),
            EXISTS(SELECT 1 FROM corporate_signatures WHERE person_id = ?1)
        "#,
    )
    .bind(person_id)
    .fetch_one(&mut *conn)
    .await?;
    Ok(AgreementStatus {
        individual,
        corporate,
    })
}

pub(super) async fn insert_organization(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<DbOrganization, LarderError> {
    if name.trim().is_empty() {
        return Err(LarderError::Validation(
            "organization name must be present".to_string(),
        ));
    }
    let org = sqlx::query_as::<_, DbOrganization>(
        r#"
        INSERT INTO organizations (name, created_at)
        VALUES (?, ?)
        RETURNING id, name, created_at
        "#,
    )
    .bind(name.trim())
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;
    Ok(org)
}

pub(super) async fn get_organization(
    conn: &mut SqliteConnection,
    id: OrganizationId,
) -> Result<DbOrganization, LarderError> {
    sqlx::query_as::<_, DbOrganization>(
        "SELECT id, name, created_at FROM organizations WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| LarderError::NotFound(format!("organization {id}")))
}

/// Adds a contributor, or updates the admin flag of an existing one.
pub(super) async fn upsert_contributor(
    conn: &mut SqliteConnection,
    create: ContributorCreate,
) -> Result<DbContributor, LarderError> {
    get_organization(conn, create.organization_id).await?;
    get_person(conn, create.person_id).await?;

    let row = sqlx::query_as::<_, DbContributor>(
        r#"
        INSERT INTO contributors (organization_id, person_id, admin, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(organization_id, person_id) DO UPDATE SET
            admin = excluded.admin
        RETURNING id, organization_id, person_id, admin, created_at
        "#,
    )
    .bind(create.organization_id)
    .bind(create.person_id)
    .bind(create.admin)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;
    Ok(row)
}

pub(super) async fn find_contributor(
    conn: &mut SqliteConnection,
    person_id: PersonId,
    organization_id: OrganizationId,
) -> Result<Option<DbContributor>, LarderError> {
    get_organization(conn, organization_id).await?;
    let row = sqlx::query_as::<_, DbContributor>(
        r#"
        SELECT id, organization_id, person_id, admin, created_at
        FROM contributors
        WHERE person_id = ? AND organization_id = ?
        "#,
    )
    .bind(person_id)
    .bind(organization_id)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}
