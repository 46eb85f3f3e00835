//! Credential verification and session issuance.

use sqlx::PgPool;
use tracing::debug;

use crate::portal::error::Error;
use crate::portal::users::{store, UserRecord};

pub mod guard;
pub mod password;
pub mod token;

/// Successful login: a signed session token plus the matched record. The
/// handler projects the record down to its public fields.
#[derive(Debug)]
pub struct LoginOutcome {
    pub token: String,
    pub user: UserRecord,
}

/// Emails are compared and stored lowercase.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Verify credentials and issue a session token.
///
/// Unknown email and wrong password both fail with
/// [`Error::InvalidCredentials`] so responses do not reveal whether an
/// account exists. Store failures surface as [`Error::Store`] instead.
///
/// # Errors
///
/// See above; additionally [`Error::InvalidHashFormat`] for a corrupted
/// stored hash.
pub async fn login(
    pool: &PgPool,
    issuer: &token::TokenIssuer,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, Error> {
    let email = normalize_email(email);

    let Some(user) = store::find_by_email(pool, &email).await? else {
        debug!("Login attempt for unknown email");
        return Err(Error::InvalidCredentials);
    };

    if !password::verify_password(password, &user.hashed_password)? {
        debug!("Password mismatch for {}", user.id);
        return Err(Error::InvalidCredentials);
    }

    let token = issuer.issue(user.id, &user.email, user.role)?;

    Ok(LoginOutcome { token, user })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  X@Y.Com "), "x@y.com");
        assert_eq!(normalize_email("a@b.com"), "a@b.com");
    }
}
