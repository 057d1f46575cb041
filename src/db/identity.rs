//! People and linked external accounts.

use chrono::Utc;
use larder_schema::ExternalIdentity;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use super::create::PersonCreate;
use super::models::{DbAccount, DbPerson};
use crate::error::LarderError;
use crate::types::PersonId;

const PERSON_COLUMNS: &str = "id, name, email, created_at, updated_at";
const ACCOUNT_COLUMNS: &str =
    "id, person_id, provider, uid, username, token, created_at, updated_at";

pub(super) async fn insert_person(
    conn: &mut SqliteConnection,
    create: PersonCreate,
) -> Result<DbPerson, LarderError> {
    let email = create.email.trim();
    if email.is_empty() {
        return Err(LarderError::Validation("person email must be present".to_string()));
    }

    let now = Utc::now();
    let person = sqlx::query_as::<_, DbPerson>(&format!(
        r#"
        INSERT INTO people (name, email, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING {PERSON_COLUMNS}
        "#
    ))
    .bind(create.name.trim())
    .bind(email)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await?;

    info!(person_id = person.id, "person created");
    Ok(person)
}

pub(super) async fn get_person(
    conn: &mut SqliteConnection,
    id: PersonId,
) -> Result<DbPerson, LarderError> {
    sqlx::query_as::<_, DbPerson>(&format!("SELECT {PERSON_COLUMNS} FROM people WHERE id = ?"))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| LarderError::NotFound(format!("person {id}")))
}

pub(super) async fn list_people(conn: &mut SqliteConnection) -> Result<Vec<DbPerson>, LarderError> {
    let rows = sqlx::query_as::<_, DbPerson>(&format!(
        "SELECT {PERSON_COLUMNS} FROM people ORDER BY id"
    ))
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

/// Returns the subset of `ids` that do not exist.
pub(super) async fn missing_people(
    conn: &mut SqliteConnection,
    ids: &[PersonId],
) -> Result<Vec<PersonId>, LarderError> {
    let mut missing = Vec::new();
    for &id in ids {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM people WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        if found.is_none() {
            missing.push(id);
        }
    }
    Ok(missing)
}

/// Create or update the (person, provider) account. Idempotent for the same provider+uid.
pub(super) async fn upsert_account(
    conn: &mut SqliteConnection,
    person_id: PersonId,
    identity: &ExternalIdentity,
) -> Result<DbAccount, LarderError> {
    if identity.provider.trim().is_empty() || identity.external_uid.trim().is_empty() {
        return Err(LarderError::Validation(
            "external identity requires a provider and uid".to_string(),
        ));
    }
    get_person(conn, person_id).await?;

    let now = Utc::now();
    let account = sqlx::query_as::<_, DbAccount>(&format!(
        r#"
        INSERT INTO accounts (person_id, provider, uid, username, token, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(person_id, provider) DO UPDATE SET
            uid = excluded.uid,
            username = excluded.username,
            token = excluded.token,
            updated_at = excluded.updated_at
        RETURNING {ACCOUNT_COLUMNS}
        "#
    ))
    .bind(person_id)
    .bind(&identity.provider)
    .bind(&identity.external_uid)
    .bind(&identity.username)
    .bind(&identity.token)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| {
        LarderError::from_unique_violation(e, || {
            format!(
                "{} account {} is linked to another person",
                identity.provider, identity.external_uid
            )
        })
    })?;

    debug!(
        person_id,
        provider = %account.provider,
        account_id = account.id,
        "account linked"
    );
    Ok(account)
}

pub(super) async fn find_account_by_uid(
    conn: &mut SqliteConnection,
    provider: &str,
    uid: &str,
) -> Result<Option<DbAccount>, LarderError> {
    let row = sqlx::query_as::<_, DbAccount>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE provider = ? AND uid = ?"
    ))
    .bind(provider)
    .bind(uid)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub(super) async fn find_account(
    conn: &mut SqliteConnection,
    person_id: PersonId,
    provider: &str,
) -> Result<Option<DbAccount>, LarderError> {
    let row = sqlx::query_as::<_, DbAccount>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE person_id = ? AND provider = ?"
    ))
    .bind(person_id)
    .bind(provider)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub(super) async fn list_accounts(
    conn: &mut SqliteConnection,
    person_id: Option<PersonId>,
) -> Result<Vec<DbAccount>, LarderError> {
    let rows = match person_id {
        Some(person_id) => {
            sqlx::query_as::<_, DbAccount>(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE person_id = ? ORDER BY id"
            ))
            .bind(person_id)
            .fetch_all(&mut *conn)
            .await?
        }
        None => {
            sqlx::query_as::<_, DbAccount>(&format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY id"
            ))
            .fetch_all(&mut *conn)
            .await?
        }
    };
    Ok(rows)
}

/// Resolve a provider login to its person; the oldest matching account wins.
pub(super) async fn find_person_by_login(
    conn: &mut SqliteConnection,
    provider: &str,
    username: &str,
) -> Result<Option<DbPerson>, LarderError> {
    let row = sqlx::query_as::<_, DbPerson>(
        r#"
        SELECT p.id, p.name, p.email, p.created_at, p.updated_at
        FROM accounts a
        JOIN people p ON p.id = a.person_id
        WHERE a.provider = ? AND a.username = ?
        ORDER BY a.id
        LIMIT 1
        "#,
    )
    .bind(provider)
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;
    Ok(row)
}

pub(super) async fn unlink_accounts(
    conn: &mut SqliteConnection,
    person_id: PersonId,
) -> Result<u64, LarderError> {
    let res = sqlx::query("DELETE FROM accounts WHERE person_id = ?")
        .bind(person_id)
        .execute(&mut *conn)
        .await?;
    let removed = res.rows_affected();
    info!(person_id, removed, "accounts unlinked");
    Ok(removed)
}

/// Find the person owning `identity`'s account, refreshing their profile and token,
/// or create both person and account.
pub(super) async fn find_or_create_from_identity(
    conn: &mut SqliteConnection,
    identity: &ExternalIdentity,
) -> Result<DbPerson, LarderError> {
    let display_name = identity
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let email = identity
        .email
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if let Some(account) =
        find_account_by_uid(conn, &identity.provider, &identity.external_uid).await?
    {
        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE people
            SET
                name = COALESCE(?, name),
                email = COALESCE(?, email),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(display_name)
        .bind(email)
        .bind(now)
        .bind(account.person_id)
        .execute(&mut *conn)
        .await?;

        upsert_account(conn, account.person_id, identity).await?;
        return get_person(conn, account.person_id).await;
    }

    let email = email.ok_or_else(|| {
        LarderError::Validation("external identity carries no email for a new person".to_string())
    })?;
    let person = insert_person(
        conn,
        PersonCreate {
            name: display_name.unwrap_or(&identity.username).to_string(),
            email: email.to_string(),
        },
    )
    .await?;
    upsert_account(conn, person.id, identity).await?;
    Ok(person)
}
