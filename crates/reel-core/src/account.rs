//! Account — the canonical identity record.
//!
//! An account resolves from exactly one credential assertion at a time:
//! either a local password or a federated `(provider, subject)` pair. A
//! local password hash may survive a link as a dormant value so the account
//! can later unlink without losing its way to authenticate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Provider ────────────────────────────────────────────────────────────────

/// External OAuth2 providers the platform federates with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
  Google,
  Facebook,
  Github,
  Twitter,
}

impl Provider {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Google => "google",
      Self::Facebook => "facebook",
      Self::Github => "github",
      Self::Twitter => "twitter",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "google" => Ok(Self::Google),
      "facebook" => Ok(Self::Facebook),
      "github" => Ok(Self::Github),
      "twitter" => Ok(Self::Twitter),
      other => Err(Error::Validation(format!("unknown provider: {other:?}"))),
    }
  }

  /// Whether the provider is known to omit email from its profiles. For
  /// these a deterministic placeholder address is substituted at resolution
  /// time instead of failing with `MissingEmail`.
  pub fn email_optional(&self) -> bool { matches!(self, Self::Twitter) }
}

impl std::fmt::Display for Provider {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── Credential ──────────────────────────────────────────────────────────────

/// How an account authenticates. Exactly one variant is active at a time.
///
/// `Federated::password_hash` is the dormant local password preserved across
/// a link; it is never accepted for login while the federated tag is active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
  Local {
    password_hash: String,
  },
  Federated {
    provider:      Provider,
    subject_id:    String,
    password_hash: Option<String>,
  },
}

impl Credential {
  pub fn is_local(&self) -> bool { matches!(self, Self::Local { .. }) }

  /// The stored password hash, active or dormant.
  pub fn password_hash(&self) -> Option<&str> {
    match self {
      Self::Local { password_hash } => Some(password_hash),
      Self::Federated { password_hash, .. } => password_hash.as_deref(),
    }
  }

  /// The active federated link, if any.
  pub fn provider_link(&self) -> Option<(Provider, &str)> {
    match self {
      Self::Local { .. } => None,
      Self::Federated { provider, subject_id, .. } => {
        Some((*provider, subject_id.as_str()))
      }
    }
  }
}

// ─── Account ─────────────────────────────────────────────────────────────────

/// The canonical identity record.
///
/// `credential` is excluded from serialization: password hashes never leave
/// the process boundary in any response shape.
#[derive(Debug, Clone, Serialize)]
pub struct Account {
  pub account_id:          Uuid,
  pub username:            String,
  pub email:               String,
  #[serde(skip_serializing)]
  pub credential:          Credential,
  pub channel_name:        String,
  pub channel_description: Option<String>,
  pub avatar_url:          Option<String>,
  /// Denormalized aggregate; the subscription fact table is the source of
  /// truth. Floor 0.
  pub subscriber_count:    u64,
  pub created_at:          DateTime<Utc>,
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Input to [`crate::store::PlatformStore::create_account`].
/// `account_id`, `subscriber_count`, and `created_at` are set by the store.
#[derive(Debug, Clone)]
pub struct NewAccount {
  pub username:            String,
  pub email:               String,
  pub credential:          Credential,
  pub channel_name:        String,
  pub channel_description: Option<String>,
  pub avatar_url:          Option<String>,
}

/// Display-profile fields updated independently of credential or counters.
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
  pub channel_name:        Option<String>,
  pub channel_description: Option<String>,
  pub avatar_url:          Option<String>,
}
