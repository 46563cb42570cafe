//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs are hyphenated lowercase, and the
//! credential union is flattened into the `auth_provider` /
//! `provider_subject_id` / `password_hash` column triple.

use chrono::{DateTime, Utc};
use reel_core::{
  Error, Result,
  account::{Account, Credential, Provider},
  engagement::EngagementKind,
  video::Video,
};
use uuid::Uuid;

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Uuid::parse_str(s).map_err(|e| Error::Storage(format!("bad uuid {s:?}: {e}")))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Storage(format!("bad timestamp {s:?}: {e}")))
}

// ─── EngagementKind ──────────────────────────────────────────────────────────

pub fn decode_kind(s: &str) -> Result<EngagementKind> {
  match s {
    "like" => Ok(EngagementKind::Like),
    "dislike" => Ok(EngagementKind::Dislike),
    other => Err(Error::Storage(format!("bad engagement kind {other:?}"))),
  }
}

// ─── Credential ──────────────────────────────────────────────────────────────

/// Flatten a credential into the `(auth_provider, provider_subject_id,
/// password_hash)` column triple.
pub fn encode_credential(
  credential: &Credential,
) -> (String, Option<String>, Option<String>) {
  match credential {
    Credential::Local { password_hash } => {
      ("local".to_owned(), None, Some(password_hash.clone()))
    }
    Credential::Federated { provider, subject_id, password_hash } => (
      provider.as_str().to_owned(),
      Some(subject_id.clone()),
      password_hash.clone(),
    ),
  }
}

fn decode_credential(
  auth_provider: &str,
  subject_id: Option<String>,
  password_hash: Option<String>,
) -> Result<Credential> {
  if auth_provider == "local" {
    let password_hash = password_hash.ok_or_else(|| {
      Error::Storage("local account without password hash".to_owned())
    })?;
    return Ok(Credential::Local { password_hash });
  }

  let provider = Provider::parse(auth_provider)
    .map_err(|_| Error::Storage(format!("bad provider {auth_provider:?}")))?;
  let subject_id = subject_id.ok_or_else(|| {
    Error::Storage("federated account without subject id".to_owned())
  })?;
  Ok(Credential::Federated { provider, subject_id, password_hash })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching [`RawAccount`]; keep the two in sync.
pub const ACCOUNT_COLUMNS: &str = "account_id, username, email, \
   auth_provider, provider_subject_id, password_hash, channel_name, \
   channel_description, avatar_url, subscriber_count, created_at";

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:          String,
  pub username:            String,
  pub email:               String,
  pub auth_provider:       String,
  pub provider_subject_id: Option<String>,
  pub password_hash:       Option<String>,
  pub channel_name:        String,
  pub channel_description: Option<String>,
  pub avatar_url:          Option<String>,
  pub subscriber_count:    i64,
  pub created_at:          String,
}

impl RawAccount {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      account_id:          row.get(0)?,
      username:            row.get(1)?,
      email:               row.get(2)?,
      auth_provider:       row.get(3)?,
      provider_subject_id: row.get(4)?,
      password_hash:       row.get(5)?,
      channel_name:        row.get(6)?,
      channel_description: row.get(7)?,
      avatar_url:          row.get(8)?,
      subscriber_count:    row.get(9)?,
      created_at:          row.get(10)?,
    })
  }

  pub fn into_account(self) -> Result<Account> {
    let credential = decode_credential(
      &self.auth_provider,
      self.provider_subject_id,
      self.password_hash,
    )?;

    Ok(Account {
      account_id:          decode_uuid(&self.account_id)?,
      username:            self.username,
      email:               self.email,
      credential,
      channel_name:        self.channel_name,
      channel_description: self.channel_description,
      avatar_url:          self.avatar_url,
      subscriber_count:    self.subscriber_count.max(0) as u64,
      created_at:          decode_dt(&self.created_at)?,
    })
  }
}

/// Column list matching [`RawVideo`]; keep the two in sync.
pub const VIDEO_COLUMNS: &str =
  "video_id, owner_id, title, likes, dislikes, created_at";

/// Raw strings read directly from a `videos` row.
pub struct RawVideo {
  pub video_id:   String,
  pub owner_id:   String,
  pub title:      String,
  pub likes:      i64,
  pub dislikes:   i64,
  pub created_at: String,
}

impl RawVideo {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      video_id:   row.get(0)?,
      owner_id:   row.get(1)?,
      title:      row.get(2)?,
      likes:      row.get(3)?,
      dislikes:   row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_video(self) -> Result<Video> {
    Ok(Video {
      video_id:   decode_uuid(&self.video_id)?,
      owner_id:   decode_uuid(&self.owner_id)?,
      title:      self.title,
      likes:      self.likes.max(0) as u64,
      dislikes:   self.dislikes.max(0) as u64,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
