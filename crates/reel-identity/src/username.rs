//! Username synthesis for accounts created from OAuth profiles.
//!
//! Display names arrive in arbitrary scripts and shapes; a username must fit
//! the stored alphabet (`[a-z0-9_]`, 3–30 chars) and be unique. The caller
//! runs a bounded generate-and-check loop: normalize once, then mint
//! candidates with a fresh random suffix until the store accepts one. The
//! final attempt doubles the suffix length rather than looping forever.

use rand_core::{OsRng, RngCore};
use reel_core::validate::USERNAME_MAX;

pub const SUFFIX_LEN: usize = 6;
pub const SUFFIX_LEN_LONG: usize = 12;

/// Total attempts the resolver makes before giving up with the store's
/// collision error.
pub const MAX_ATTEMPTS: usize = 5;

/// Strip a display name down to the username alphabet. Characters outside
/// `[a-z0-9_]` become underscores after lowercasing; inputs that carry no
/// usable character at all fall back to `"user"`.
pub fn normalize_base(raw: &str) -> String {
  let cleaned: String = raw
    .trim()
    .to_lowercase()
    .chars()
    .map(|c| {
      if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
        c
      } else {
        '_'
      }
    })
    .collect();

  if cleaned.chars().all(|c| c == '_') {
    "user".to_owned()
  } else {
    cleaned
  }
}

/// Mint one `base_suffix` candidate within the length limit.
pub fn candidate(base: &str, suffix_len: usize) -> String {
  let suffix = random_suffix(suffix_len);
  let max_base = USERNAME_MAX - 1 - suffix.len();
  let truncated: String = base.chars().take(max_base).collect();
  format!("{truncated}_{suffix}")
}

fn random_suffix(len: usize) -> String {
  const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

  let mut bytes = vec![0u8; len];
  OsRng.fill_bytes(&mut bytes);
  bytes
    .iter()
    .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use reel_core::validate::validate_username;

  #[test]
  fn normalize_lowers_and_substitutes() {
    assert_eq!(normalize_base("Alice Liddell"), "alice_liddell");
    assert_eq!(normalize_base("  Bob! "), "bob_");
    assert_eq!(normalize_base("日本語"), "user");
    assert_eq!(normalize_base(""), "user");
    assert_eq!(normalize_base("___"), "user");
  }

  #[test]
  fn candidates_fit_the_stored_alphabet() {
    for base in ["alice", "user", &"x".repeat(60)] {
      let c = candidate(base, SUFFIX_LEN);
      assert!(validate_username(&c).is_ok(), "bad candidate {c:?}");
    }
  }

  #[test]
  fn long_suffix_candidates_fit_too() {
    let c = candidate(&"x".repeat(60), SUFFIX_LEN_LONG);
    assert!(validate_username(&c).is_ok());
    assert!(c.len() <= USERNAME_MAX);
  }

  #[test]
  fn candidates_vary() {
    let a = candidate("alice", SUFFIX_LEN);
    let b = candidate("alice", SUFFIX_LEN);
    assert_ne!(a, b);
  }
}
