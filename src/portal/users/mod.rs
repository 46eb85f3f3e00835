//! User records and the role model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

pub mod seed;
pub mod service;
pub mod store;

/// Privilege levels, ordered lowest to highest.
///
/// The derived `Ord` gives the total order `User < Admin < SuperAdmin`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Roles allowed past the admin gate, and whose assignment or removal
    /// is reserved to a `SUPER_ADMIN` caller.
    #[must_use]
    pub const fn is_privileged(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown role: {0}")]
pub struct RoleParseError(String);

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

/// Full row as stored, hash included. Never serialized.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub hashed_password: String,
    pub role: Role,
}

/// The only user shape that ever leaves the service.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_order() {
        assert!(Role::User < Role::Admin);
        assert!(Role::Admin < Role::SuperAdmin);
    }

    #[test]
    fn test_role_privilege() {
        assert!(!Role::User.is_privileged());
        assert!(Role::Admin.is_privileged());
        assert!(Role::SuperAdmin.is_privileged());
    }

    #[test]
    fn test_role_round_trip() {
        for role in [Role::User, Role::Admin, Role::SuperAdmin] {
            assert_eq!(role.as_str().parse::<Role>().unwrap(), role);
        }
        assert!("ROOT".parse::<Role>().is_err());
        assert!("admin".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_wire_format() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            r#""SUPER_ADMIN""#
        );
        let role: Role = serde_json::from_str(r#""ADMIN""#).unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_public_user_never_carries_hash() {
        let user = PublicUser {
            id: Uuid::new_v4().to_string(),
            email: "a@b.com".to_string(),
            name: "A".to_string(),
            role: Role::User,
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: "2026-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(json.contains("createdAt"));
    }
}
