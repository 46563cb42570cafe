//! Translation from SQLite failures to the domain error taxonomy.
//!
//! A unique-index or CHECK violation is never surfaced as a generic storage
//! error: the violated constraint is identified from the column list in the
//! SQLite message and mapped to the matching domain condition by the store
//! method that owns the write (which has the input values for context).

use reel_core::Error;

/// Which schema constraint a write violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
  /// `accounts_email_idx`
  Email,
  /// `accounts_username_idx`
  Username,
  /// `accounts_provider_idx` — the federated identity pair.
  ProviderPair,
  /// `engagement_facts` primary key.
  EngagementPair,
  /// `subscription_facts` primary key.
  SubscriptionPair,
  /// `CHECK (subscriber_id != channel_id)`.
  SelfSubscription,
}

/// Identify the constraint behind `err`, if it is a constraint violation.
pub fn violated_constraint(err: &tokio_rusqlite::Error) -> Option<Constraint> {
  let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
    code,
    Some(message),
  )) = err
  else {
    return None;
  };
  if code.code != rusqlite::ErrorCode::ConstraintViolation {
    return None;
  }

  if message.contains("accounts.email") {
    Some(Constraint::Email)
  } else if message.contains("accounts.username") {
    Some(Constraint::Username)
  } else if message.contains("accounts.provider_subject_id") {
    Some(Constraint::ProviderPair)
  } else if message.contains("engagement_facts") {
    Some(Constraint::EngagementPair)
  } else if message.starts_with("CHECK") {
    Some(Constraint::SelfSubscription)
  } else if message.contains("subscription_facts") {
    Some(Constraint::SubscriptionPair)
  } else {
    None
  }
}

/// Fold any remaining backend failure into `Error::Storage`.
pub fn storage(err: tokio_rusqlite::Error) -> Error {
  Error::Storage(err.to_string())
}
