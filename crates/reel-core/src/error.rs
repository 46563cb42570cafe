//! Error types for `reel-core`.
//!
//! Every variant is a recoverable, caller-visible condition; none is fatal.
//! Transport layers map [`ErrorKind`] to their own status codes.

use thiserror::Error;
use uuid::Uuid;

use crate::account::Provider;

#[derive(Debug, Error)]
pub enum Error {
  /// Malformed or missing input. The message names the offending field.
  #[error("validation failed: {0}")]
  Validation(String),

  #[error("account not found: {0}")]
  AccountNotFound(Uuid),

  #[error("video not found: {0}")]
  VideoNotFound(Uuid),

  #[error("email already registered: {0}")]
  EmailTaken(String),

  #[error("username already taken: {0}")]
  UsernameTaken(String),

  /// The `(provider, subject)` pair is attached to a different account.
  #[error("{0} account is already linked to another user")]
  AlreadyLinked(Provider),

  /// Deliberately undifferentiated: never reveals whether the email exists,
  /// whether the account is federated, or which check failed.
  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("cannot subscribe to your own channel")]
  SelfSubscription,

  /// The email belongs to an account already linked to a different provider.
  #[error("email {0} belongs to an account linked to another provider")]
  ProviderConflict(String),

  #[error("no email in {0} profile and the provider allows no placeholder")]
  MissingEmail(Provider),

  #[error("account has no password set; set one before unlinking")]
  PasswordRequired,

  #[error("password hashing error: {0}")]
  PasswordHash(String),

  #[error("storage error: {0}")]
  Storage(String),
}

/// Coarse classification of [`Error`], for status-code mapping by embedding
/// layers without an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  Validation,
  NotFound,
  Conflict,
  InvalidCredentials,
  SelfSubscription,
  ProviderConflict,
  MissingEmail,
  PasswordRequired,
  Internal,
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::Validation(_) => ErrorKind::Validation,
      Self::AccountNotFound(_) | Self::VideoNotFound(_) => ErrorKind::NotFound,
      Self::EmailTaken(_) | Self::UsernameTaken(_) | Self::AlreadyLinked(_) => {
        ErrorKind::Conflict
      }
      Self::InvalidCredentials => ErrorKind::InvalidCredentials,
      Self::SelfSubscription => ErrorKind::SelfSubscription,
      Self::ProviderConflict(_) => ErrorKind::ProviderConflict,
      Self::MissingEmail(_) => ErrorKind::MissingEmail,
      Self::PasswordRequired => ErrorKind::PasswordRequired,
      Self::PasswordHash(_) | Self::Storage(_) => ErrorKind::Internal,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
