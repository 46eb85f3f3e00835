//! Credential store queries.
//!
//! Thin sqlx layer over the `users` table. Emails are stored lowercase;
//! callers normalize before reaching this module. Timestamps are rendered
//! server-side as UTC ISO-8601 strings.

use sqlx::{PgPool, Row};
use uuid::Uuid;

use super::{PublicUser, Role, UserRecord};

const PUBLIC_COLUMNS: &str = r#"
    id::text AS id,
    email,
    name,
    role,
    to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
    to_char(updated_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS updated_at
"#;

/// Partial update; `None` fields are left unchanged.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub name: Option<String>,
    pub hashed_password: Option<String>,
    pub role: Option<Role>,
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
    let row = sqlx::query("SELECT id, email, name, hashed_password, role FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    row.map(record_from_row).transpose()
}

/// Existence and current role, used by the mutation rules.
pub async fn find_role_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Role>, sqlx::Error> {
    let row = sqlx::query("SELECT role FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(|row| parse_role(&row.get::<String, _>("role"))).transpose()
}

pub async fn find_public_by_id(pool: &PgPool, id: Uuid) -> Result<Option<PublicUser>, sqlx::Error> {
    let query = format!("SELECT {PUBLIC_COLUMNS} FROM users WHERE id = $1");
    let row = sqlx::query(&query).bind(id).fetch_optional(pool).await?;

    row.map(public_from_row).transpose()
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<PublicUser>, sqlx::Error> {
    let query = format!("SELECT {PUBLIC_COLUMNS} FROM users ORDER BY created_at DESC");
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    rows.into_iter().map(public_from_row).collect()
}

/// Case-insensitive duplicate check, optionally excluding one row (the
/// target of an update).
pub async fn email_exists(
    pool: &PgPool,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<bool, sqlx::Error> {
    let row = sqlx::query(
        "SELECT 1 FROM users WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2::uuid)",
    )
    .bind(email)
    .bind(exclude)
    .fetch_optional(pool)
    .await?;

    Ok(row.is_some())
}

pub async fn insert(
    pool: &PgPool,
    email: &str,
    name: &str,
    hashed_password: &str,
    role: Role,
) -> Result<PublicUser, sqlx::Error> {
    let query = format!(
        r"
        INSERT INTO users (id, email, name, hashed_password, role, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
        RETURNING {PUBLIC_COLUMNS}
        "
    );
    let row = sqlx::query(&query)
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(hashed_password)
        .bind(role.as_str())
        .fetch_one(pool)
        .await?;

    public_from_row(row)
}

/// Returns `None` when the row vanished under us, e.g. a concurrent delete.
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    changes: &UserChanges,
) -> Result<Option<PublicUser>, sqlx::Error> {
    let query = format!(
        r"
        UPDATE users SET
            email = COALESCE($1::text, email),
            name = COALESCE($2::text, name),
            hashed_password = COALESCE($3::text, hashed_password),
            role = COALESCE($4::text, role),
            updated_at = NOW()
        WHERE id = $5
        RETURNING {PUBLIC_COLUMNS}
        "
    );
    let row = sqlx::query(&query)
        .bind(changes.email.as_deref())
        .bind(changes.name.as_deref())
        .bind(changes.hashed_password.as_deref())
        .bind(changes.role.map(Role::as_str))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(public_from_row).transpose()
}

/// True if a row was removed.
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn record_from_row(row: sqlx::postgres::PgRow) -> Result<UserRecord, sqlx::Error> {
    Ok(UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        hashed_password: row.get("hashed_password"),
        role: parse_role(&row.get::<String, _>("role"))?,
    })
}

fn public_from_row(row: sqlx::postgres::PgRow) -> Result<PublicUser, sqlx::Error> {
    Ok(PublicUser {
        id: row.get("id"),
        email: row.get("email"),
        name: row.get("name"),
        role: parse_role(&row.get::<String, _>("role"))?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// A role outside the enum means a corrupted row; surface it as a decode
// error rather than a panic.
fn parse_role(raw: &str) -> Result<Role, sqlx::Error> {
    raw.parse::<Role>()
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_role_rejects_unknown_value() {
        assert!(parse_role("SUPER_ADMIN").is_ok());
        assert!(matches!(
            parse_role("WHEEL"),
            Err(sqlx::Error::Decode(_))
        ));
    }

    #[test]
    fn test_user_changes_default_is_noop() {
        let changes = UserChanges::default();
        assert!(changes.email.is_none());
        assert!(changes.name.is_none());
        assert!(changes.hashed_password.is_none());
        assert!(changes.role.is_none());
    }
}
