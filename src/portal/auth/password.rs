//! Password hashing.
//!
//! bcrypt at a fixed work factor. Every call to [`hash_password`] salts
//! freshly, so two hashes of the same plaintext never compare equal as
//! strings; only [`verify_password`] can check them.

use tracing::error;

use crate::portal::error::Error;

/// Work factor for new hashes. Matches the cost used by the seeding step.
pub const BCRYPT_COST: u32 = 12;

/// Hash a plaintext password with a fresh random salt.
///
/// # Errors
///
/// Returns [`Error::HashingUnavailable`] if the hash cannot be computed,
/// e.g. the entropy source is unavailable. Callers surface this as a fatal
/// request failure.
pub fn hash_password(plaintext: &str) -> Result<String, Error> {
    bcrypt::hash(plaintext, BCRYPT_COST).map_err(|err| {
        error!("Password hashing failed: {err}");
        Error::HashingUnavailable
    })
}

/// Check a plaintext password against a stored hash.
///
/// # Errors
///
/// Returns [`Error::InvalidHashFormat`] when the stored value does not
/// parse as a bcrypt hash; a plain mismatch is `Ok(false)`, never an error.
pub fn verify_password(plaintext: &str, hash: &str) -> Result<bool, Error> {
    // Verification needs no entropy, so any failure here means the stored
    // value is not a usable bcrypt hash.
    bcrypt::verify(plaintext, hash).map_err(|err| {
        error!("Stored password hash is unusable: {err}");
        Error::InvalidHashFormat
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash).unwrap());
        assert!(!verify_password("hunter3!", &hash).unwrap());
    }

    #[test]
    fn test_fresh_salt_per_call() {
        // Same input, different encoded hashes.
        let a = bcrypt::hash("hunter2!", 4).unwrap();
        let b = bcrypt::hash("hunter2!", 4).unwrap();
        assert_ne!(a, b);
        assert!(verify_password("hunter2!", &a).unwrap());
        assert!(verify_password("hunter2!", &b).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        let result = verify_password("hunter2!", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(Error::InvalidHashFormat)));
    }

    #[test]
    fn test_cost_factor_is_encoded() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(hash.starts_with("$2"));
        assert!(hash.contains("$12$"));
    }
}
