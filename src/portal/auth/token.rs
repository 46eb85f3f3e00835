//! Session token issuance and verification.
//!
//! Stateless HS256 JWTs binding user id, email and role, expiring exactly
//! 24 hours after issuance. The signing secret is process-wide
//! configuration loaded once at startup; there is no server-side
//! revocation list.

use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::error;
use uuid::Uuid;

use crate::portal::error::Error;
use crate::portal::users::Role;

/// Fixed session lifetime.
pub const TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issue a signed token carrying the user's identity and role.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if signing fails; claims are plain JSON
    /// so this does not happen in practice.
    pub fn issue(&self, user_id: Uuid, email: &str, role: Role) -> Result<String, Error> {
        let iat = now_unix();
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            role,
            iat,
            exp: iat + TOKEN_TTL_SECONDS,
        };

        self.sign(&claims)
    }

    pub(crate) fn sign(&self, claims: &Claims) -> Result<String, Error> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding).map_err(|err| {
            error!("Token signing failed: {err}");
            Error::Internal
        })
    }

    /// Verify signature and expiry, returning the decoded claims.
    ///
    /// # Errors
    ///
    /// [`Error::TokenExpired`] past `exp`, [`Error::TokenInvalid`] for any
    /// structural or signature failure. Verification never mutates state.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        // A token stops being valid exactly at exp, no skew allowance.
        validation.leeway = 0;

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => Error::TokenExpired,
                _ => Error::TokenInvalid,
            })
    }
}

fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&SecretString::from("test-secret".to_string()))
    }

    #[test]
    fn test_round_trip_recovers_claims() {
        let issuer = issuer();
        let user_id = Uuid::new_v4();

        let token = issuer.issue(user_id, "a@b.com", Role::Admin).unwrap();
        let claims = issuer.verify(&token).unwrap();

        assert_eq!(claims.user_id, user_id.to_string());
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp, claims.iat + TOKEN_TTL_SECONDS);
    }

    fn token_expired_seconds_ago(issuer: &TokenIssuer, age: i64) -> String {
        let iat = now_unix() - TOKEN_TTL_SECONDS - age;
        let claims = Claims {
            user_id: Uuid::new_v4().to_string(),
            email: "a@b.com".to_string(),
            role: Role::SuperAdmin,
            iat,
            exp: iat + TOKEN_TTL_SECONDS,
        };
        issuer.sign(&claims).unwrap()
    }

    #[test]
    fn test_expired_token() {
        let issuer = issuer();
        let token = token_expired_seconds_ago(&issuer, 3600);

        assert!(matches!(issuer.verify(&token), Err(Error::TokenExpired)));
    }

    #[test]
    fn test_token_just_past_expiry_is_rejected() {
        // Inside jsonwebtoken's default 60s leeway, which verify disables.
        let issuer = issuer();
        let token = token_expired_seconds_ago(&issuer, 30);

        assert!(matches!(issuer.verify(&token), Err(Error::TokenExpired)));
    }

    #[test]
    fn test_wrong_secret() {
        let token = issuer()
            .issue(Uuid::new_v4(), "a@b.com", Role::User)
            .unwrap();

        let other = TokenIssuer::new(&SecretString::from("another-secret".to_string()));
        assert!(matches!(other.verify(&token), Err(Error::TokenInvalid)));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            issuer().verify("not.a.jwt"),
            Err(Error::TokenInvalid)
        ));
        assert!(matches!(issuer().verify(""), Err(Error::TokenInvalid)));
    }

    #[test]
    fn test_tampered_payload() {
        let issuer = issuer();
        let token = issuer.issue(Uuid::new_v4(), "a@b.com", Role::User).unwrap();

        // Swap the claims segment for another token's.
        let other = issuer
            .issue(Uuid::new_v4(), "c@d.com", Role::SuperAdmin)
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert!(matches!(issuer.verify(&forged), Err(Error::TokenInvalid)));
    }

    #[test]
    fn test_claims_wire_names() {
        let claims = Claims {
            user_id: "abc".to_string(),
            email: "a@b.com".to_string(),
            role: Role::User,
            iat: 0,
            exp: 1,
        };
        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains(r#""userId":"abc""#));
        assert!(json.contains(r#""role":"USER""#));
    }
}
