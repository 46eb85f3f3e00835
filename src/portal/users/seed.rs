//! Startup seeding of the initial super admin.

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use tracing::{debug, info};

use super::{store, Role};
use crate::portal::auth::{normalize_email, password};
use crate::portal::error::Error;

/// Ensure a `SUPER_ADMIN` with the given email exists. Existing rows are
/// left untouched, so a changed password here does not rotate a live
/// account.
///
/// # Errors
///
/// [`Error::Store`] on database failure, [`Error::HashingUnavailable`] if
/// the password cannot be hashed.
pub async fn ensure_super_admin(
    pool: &PgPool,
    email: &str,
    password: &SecretString,
) -> Result<(), Error> {
    let email = normalize_email(email);

    if store::find_by_email(pool, &email).await?.is_some() {
        debug!("Super admin already exists, skipping seed");
        return Ok(());
    }

    let hashed_password = password::hash_password(password.expose_secret())?;
    let user = store::insert(pool, &email, "Administrator", &hashed_password, Role::SuperAdmin)
        .await?;

    info!("Seeded super admin {}", user.id);

    Ok(())
}
