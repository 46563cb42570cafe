//! Input validation shared by the identity and engagement services.
//!
//! All checks return [`Error::Validation`] with a message that names the
//! offending field, suitable for relaying to the caller verbatim.

use crate::{Error, Result};

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 30;
pub const PASSWORD_MIN: usize = 6;
pub const CHANNEL_DESCRIPTION_MAX: usize = 1000;

/// Lowercase + trim. Applied before any email comparison or write so the
/// store's unique index is effectively case-insensitive.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

/// Usernames are stored normalized: lowercase `[a-z0-9_]`, 3–30 chars.
pub fn validate_username(username: &str) -> Result<()> {
  let len = username.chars().count();
  if !(USERNAME_MIN..=USERNAME_MAX).contains(&len) {
    return Err(Error::Validation(format!(
      "username must be {USERNAME_MIN}-{USERNAME_MAX} characters"
    )));
  }
  if !username
    .chars()
    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
  {
    return Err(Error::Validation(
      "username may only contain a-z, 0-9 and _".to_owned(),
    ));
  }
  Ok(())
}

/// Shape check only: one `@`, a non-empty local part, a dotted domain, no
/// whitespace. Deliverability is not this layer's concern.
pub fn validate_email(email: &str) -> Result<()> {
  let well_formed = match email.split_once('@') {
    Some((local, domain)) => {
      !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
    }
    None => false,
  };
  if !well_formed {
    return Err(Error::Validation(format!("invalid email address: {email:?}")));
  }
  Ok(())
}

pub fn validate_password(password: &str) -> Result<()> {
  if password.chars().count() < PASSWORD_MIN {
    return Err(Error::Validation(format!(
      "password must be at least {PASSWORD_MIN} characters"
    )));
  }
  Ok(())
}

pub fn validate_channel_name(name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::Validation("channel name is required".to_owned()));
  }
  Ok(())
}

pub fn validate_channel_description(description: Option<&str>) -> Result<()> {
  if let Some(d) = description {
    if d.chars().count() > CHANNEL_DESCRIPTION_MAX {
      return Err(Error::Validation(format!(
        "channel description cannot exceed {CHANNEL_DESCRIPTION_MAX} characters"
      )));
    }
  }
  Ok(())
}
