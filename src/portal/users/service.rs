//! RBAC-enforced directory operations.
//!
//! Callers reach this module only after the access guard admitted them
//! (role `ADMIN` or above). The rules here add the per-operation
//! constraints: privileged-role assignment, duplicate emails,
//! self-deletion. Existence is re-checked on every call because a target
//! row may be deleted concurrently.

use regex::Regex;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::store::{self, UserChanges};
use super::{PublicUser, Role};
use crate::portal::auth::guard::AuthUser;
use crate::portal::auth::{normalize_email, password};
use crate::portal::error::Error;

/// Minimum plaintext password length on create and update.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug)]
pub struct CreateUser {
    pub email: String,
    pub name: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Default)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
    pub role: Option<Role>,
}

/// All users, newest created first. Any admin may list.
///
/// # Errors
///
/// [`Error::Store`] when the database is unreachable.
pub async fn list(pool: &PgPool) -> Result<Vec<PublicUser>, Error> {
    Ok(store::list_all(pool).await?)
}

/// # Errors
///
/// [`Error::NotFound`] for an absent id, [`Error::Store`] when the
/// database is unreachable.
pub async fn get(pool: &PgPool, id: Uuid) -> Result<PublicUser, Error> {
    store::find_public_by_id(pool, id)
        .await?
        .ok_or(Error::NotFound)
}

/// Create a user, hashing the password before it is stored.
///
/// # Errors
///
/// [`Error::Validation`] for malformed input, [`Error::DuplicateEmail`]
/// when the normalized email is taken, [`Error::Forbidden`] when a
/// non-`SUPER_ADMIN` caller requests a privileged role.
pub async fn create(
    pool: &PgPool,
    caller: &AuthUser,
    request: CreateUser,
) -> Result<PublicUser, Error> {
    let email = normalize_email(&request.email);
    validate_email(&email)?;
    let name = validate_name(&request.name)?;
    validate_password(&request.password)?;
    ensure_can_assign(caller.role, request.role)?;

    if store::email_exists(pool, &email, None).await? {
        return Err(Error::DuplicateEmail);
    }

    let hashed_password = password::hash_password(&request.password)?;
    let user = store::insert(pool, &email, &name, &hashed_password, request.role).await?;

    info!("User {} created by {}", user.id, caller.user_id);

    Ok(user)
}

/// Apply a partial update; unsupplied fields are unchanged. `updated_at`
/// is refreshed on every successful update.
///
/// # Errors
///
/// [`Error::NotFound`] for an absent id, [`Error::DuplicateEmail`] when a
/// changed email collides with another row, [`Error::Forbidden`] when a
/// non-`SUPER_ADMIN` caller writes a privileged role value.
pub async fn update(
    pool: &PgPool,
    caller: &AuthUser,
    id: Uuid,
    request: UpdateUser,
) -> Result<PublicUser, Error> {
    if store::find_role_by_id(pool, id).await?.is_none() {
        return Err(Error::NotFound);
    }

    let changes = prepare_changes(caller.role, request)?;

    if let Some(email) = &changes.email {
        if store::email_exists(pool, email, Some(id)).await? {
            return Err(Error::DuplicateEmail);
        }
    }

    // The row may have been deleted between the existence check and here;
    // both NotFound outcomes are acceptable to the caller.
    store::update(pool, id, &changes).await?.ok_or(Error::NotFound)
}

/// Validate the supplied fields of a partial update and map them onto the
/// columns to write. Unsupplied fields stay `None` so the store leaves
/// them untouched.
fn prepare_changes(caller_role: Role, request: UpdateUser) -> Result<UserChanges, Error> {
    let mut changes = UserChanges::default();

    if let Some(email) = request.email {
        let email = normalize_email(&email);
        validate_email(&email)?;
        changes.email = Some(email);
    }

    if let Some(name) = request.name {
        changes.name = Some(validate_name(&name)?);
    }

    if let Some(password) = request.password {
        validate_password(&password)?;
        changes.hashed_password = Some(password::hash_password(&password)?);
    }

    if let Some(role) = request.role {
        // Writing a privileged role value, in either direction, is
        // reserved to SUPER_ADMIN callers.
        ensure_can_modify_role(caller_role, role)?;
        changes.role = Some(role);
    }

    Ok(changes)
}

/// Permanently remove a user.
///
/// # Errors
///
/// [`Error::NotFound`] for an absent id, [`Error::SelfDeletion`] when the
/// target is the caller, [`Error::Forbidden`] when a plain `ADMIN` targets
/// a privileged account.
pub async fn delete(pool: &PgPool, caller: &AuthUser, id: Uuid) -> Result<(), Error> {
    let Some(target_role) = store::find_role_by_id(pool, id).await? else {
        return Err(Error::NotFound);
    };

    ensure_can_delete(caller, id, target_role)?;

    if !store::delete(pool, id).await? {
        return Err(Error::NotFound);
    }

    info!("User {id} deleted by {}", caller.user_id);

    Ok(())
}

fn ensure_can_assign(caller: Role, requested: Role) -> Result<(), Error> {
    if requested.is_privileged() && caller != Role::SuperAdmin {
        return Err(Error::Forbidden(
            "Only Super Administrators can create Admin users",
        ));
    }
    Ok(())
}

fn ensure_can_modify_role(caller: Role, new_role: Role) -> Result<(), Error> {
    if new_role.is_privileged() && caller != Role::SuperAdmin {
        return Err(Error::Forbidden(
            "Only Super Administrators can modify Admin roles",
        ));
    }
    Ok(())
}

fn ensure_can_delete(caller: &AuthUser, target_id: Uuid, target_role: Role) -> Result<(), Error> {
    // Self-deletion is always forbidden, regardless of role.
    if caller.user_id == target_id {
        return Err(Error::SelfDeletion);
    }
    if target_role.is_privileged() && caller.role != Role::SuperAdmin {
        return Err(Error::Forbidden(
            "Only Super Administrators can delete Admin users",
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), Error> {
    let well_formed =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email));
    if well_formed {
        Ok(())
    } else {
        Err(Error::Validation("Invalid email address".to_string()))
    }
}

fn validate_name(name: &str) -> Result<String, Error> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Name is required".to_string()));
    }
    Ok(trimmed.to_string())
}

fn validate_password(password: &str) -> Result<(), Error> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(Error::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
