//! # Portal
//!
//! `portal` is the authentication and user management backend for the
//! internal tools portal. It verifies credentials against the users table,
//! issues signed session tokens, and gates the administrative user
//! directory behind role-based access control.
//!
//! ## Roles
//!
//! Every user carries one of three roles: `USER`, `ADMIN` or `SUPER_ADMIN`.
//! Admin routes require `ADMIN` or above; assigning or removing a
//! privileged role and deleting privileged accounts require `SUPER_ADMIN`.
//!
//! ## Sessions
//!
//! Sessions are stateless HS256 JWTs with a fixed 24 hour expiry. There is
//! no server-side revocation list; revoking access means waiting out the
//! expiry or rotating the signing secret.

pub mod cli;
pub mod portal;
