//! Groups and their members.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::info;

use super::identity::get_person;
use super::models::DbGroup;
use crate::error::LarderError;
use crate::types::{GroupId, PersonId};

pub(super) async fn insert_group(
    conn: &mut SqliteConnection,
    name: &str,
) -> Result<DbGroup, LarderError> {
    if name.trim().is_empty() {
        return Err(LarderError::Validation("group name must be present".to_string()));
    }

    let group = sqlx::query_as::<_, DbGroup>(
        r#"
        INSERT INTO groups (name, created_at)
        VALUES (?, ?)
        RETURNING id, name, created_at
        "#,
    )
    .bind(name)
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| match LarderError::from_unique_violation(e, String::new) {
        LarderError::Conflict(_) => {
            LarderError::Validation(format!("group name {name:?} is already taken"))
        }
        other => other,
    })?;

    info!(group_id = group.id, name = %group.name, "group created");
    Ok(group)
}

pub(super) async fn get_group(
    conn: &mut SqliteConnection,
    id: GroupId,
) -> Result<DbGroup, LarderError> {
    sqlx::query_as::<_, DbGroup>("SELECT id, name, created_at FROM groups WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| LarderError::NotFound(format!("group {id}")))
}

/// Idempotent: adding an existing member is a no-op.
pub(super) async fn add_member(
    conn: &mut SqliteConnection,
    group_id: GroupId,
    person_id: PersonId,
) -> Result<(), LarderError> {
    get_group(conn, group_id).await?;
    get_person(conn, person_id).await?;

    sqlx::query(
        r#"
        INSERT INTO group_members (group_id, person_id, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT(group_id, person_id) DO NOTHING
        "#,
    )
    .bind(group_id)
    .bind(person_id)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub(super) async fn remove_member(
    conn: &mut SqliteConnection,
    group_id: GroupId,
    person_id: PersonId,
) -> Result<bool, LarderError> {
    let res = sqlx::query("DELETE FROM group_members WHERE group_id = ? AND person_id = ?")
        .bind(group_id)
        .bind(person_id)
        .execute(&mut *conn)
        .await?;
    Ok(res.rows_affected() > 0)
}

pub(super) async fn member_ids(
    conn: &mut SqliteConnection,
    group_id: GroupId,
) -> Result<Vec<PersonId>, LarderError> {
    get_group(conn, group_id).await?;
    let ids = sqlx::query_scalar::<_, i64>(
        "SELECT person_id FROM group_members WHERE group_id = ? ORDER BY person_id",
    )
    .bind(group_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(ids)
}
