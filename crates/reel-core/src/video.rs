//! Video — the counter target for engagement facts.
//!
//! Only the slice the engagement ledger needs lives here; upload,
//! transcoding, and playback metadata belong to other services.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A video record carrying the denormalized like/dislike counters.
/// The engagement fact table is the source of truth; both counters floor 0.
#[derive(Debug, Clone, Serialize)]
pub struct Video {
  pub video_id:   Uuid,
  pub owner_id:   Uuid,
  pub title:      String,
  pub likes:      u64,
  pub dislikes:   u64,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::PlatformStore::create_video`].
/// `video_id`, counters, and `created_at` are set by the store.
#[derive(Debug, Clone)]
pub struct NewVideo {
  pub owner_id: Uuid,
  pub title:    String,
}
