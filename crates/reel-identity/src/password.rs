//! Argon2 password hashing helpers.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;
use reel_core::{Error, Result};

/// Hash a password into a PHC string, e.g. `$argon2id$v=19$…`.
pub fn hash(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

/// Verify a candidate against a stored PHC string. Parse failures and
/// mismatches are both a plain `false`; callers surface
/// `InvalidCredentials` without differentiating.
pub fn verify(stored: &str, candidate: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(stored) else {
    return false;
  };
  Argon2::default()
    .verify_password(candidate.as_bytes(), &parsed)
    .is_ok()
}
