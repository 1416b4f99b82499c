use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use uuid::Uuid;

use crate::modules::error::ServiceError;

/// Hash `password` into an Argon2id PHC string.
///
/// Argon2 is CPU bound; async callers run this on the blocking pool.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    // 16 random bytes from a v4 uuid
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| ServiceError::Upstream(format!("Failed to build salt: {e}")))?;

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Upstream(format!("Failed to hash password: {e}")))
}

/// Check `password` against a stored PHC string. A malformed hash never verifies.
pub fn verify_password(password: &str, phc: &str) -> bool {
    PasswordHash::new(phc)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}
