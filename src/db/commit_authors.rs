//! Commit authors observed per repository.

use chrono::Utc;
use sqlx::SqliteConnection;
use tracing::debug;

use super::models::DbCommitAuthor;
use crate::error::LarderError;

/// Idempotent on (login, repository). Both are stored trimmed, and lookups trim
/// their argument the same way.
pub(super) async fn upsert_commit_author(
    conn: &mut SqliteConnection,
    login: &str,
    repository: &str,
) -> Result<DbCommitAuthor, LarderError> {
    if login.trim().is_empty() || repository.trim().is_empty() {
        return Err(LarderError::Validation(
            "commit author requires a login and a repository".to_string(),
        ));
    }

    let row = sqlx::query_as::<_, DbCommitAuthor>(
        r#"
        INSERT INTO commit_authors (login, repository, created_at)
        VALUES (?, ?, ?)
        ON CONFLICT(login, repository) DO UPDATE SET login = excluded.login
        RETURNING id, login, repository, created_at
        "#,
    )
    .bind(login.trim())
    .bind(repository.trim())
    .bind(Utc::now())
    .fetch_one(&mut *conn)
    .await?;

    debug!(login = %row.login, repository = %row.repository, "commit author recorded");
    Ok(row)
}

pub(super) async fn list_by_repository(
    conn: &mut SqliteConnection,
    repository: &str,
) -> Result<Vec<DbCommitAuthor>, LarderError> {
    let rows = sqlx::query_as::<_, DbCommitAuthor>(
        r#"
        SELECT id, login, repository, created_at
        FROM commit_authors
        WHERE repository = ?
        ORDER BY id
        "#,
    )
    .bind(repository.trim())
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}

pub(super) async fn list_by_login(
    conn: &mut SqliteConnection,
    login: &str,
) -> Result<Vec<DbCommitAuthor>, LarderError> {
    let rows = sqlx::query_as::<_, DbCommitAuthor>(
        r#"
        SELECT id, login, repository, created_at
        FROM commit_authors
        WHERE login = ?
        ORDER BY id
        "#,
    )
    .bind(login.trim())
    .fetch_all(&mut *conn)
    .await?;
    Ok(rows)
}
