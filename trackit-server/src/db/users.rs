//! User lookups and find-or-create registration

use sqlx::SqlitePool;
use trackit_common::db::models::{User, UserRole};
use trackit_common::time::now_iso;
use trackit_common::{Error, Result};

use super::new_id;

pub async fn find_by_id(pool: &SqlitePool, id: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, name, role, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, name, role, created_at FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn exists(pool: &SqlitePool, id: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

/// Return the user with this email, creating it if there is none
///
/// An existing user keeps its stored name and role. The flag is `true`
/// when this call inserted the row; concurrent registrations of one email
/// resolve to the same user.
pub async fn find_or_create(
    pool: &SqlitePool,
    email: &str,
    name: Option<&str>,
    role: UserRole,
) -> Result<(User, bool)> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO users (id, email, name, role, created_at)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(email) DO NOTHING
        "#,
    )
    .bind(new_id())
    .bind(email)
    .bind(name)
    .bind(role.as_str())
    .bind(now_iso())
    .execute(pool)
    .await?;
    let created = inserted.rows_affected() == 1;

    let user = find_by_email(pool, email)
        .await?
        .ok_or_else(|| Error::Inconsistent(format!("user {email} missing after insert")))?;

    if created {
        tracing::info!(user_id = %user.id, role = %user.role, "Registered user");
    }
    Ok((user, created))
}
