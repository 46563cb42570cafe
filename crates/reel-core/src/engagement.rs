//! Engagement facts and the like/dislike transition table.
//!
//! The transition table is a pure function so storage backends can apply it
//! inside their own transaction and tests can exercise every cell without a
//! database. One fact row exists per `(user, video)` pair; changing its kind
//! is a mutation, not an insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Kind ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementKind {
  Like,
  Dislike,
}

impl EngagementKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Like => "like",
      Self::Dislike => "dislike",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "like" => Ok(Self::Like),
      "dislike" => Ok(Self::Dislike),
      other => Err(Error::Validation(format!(
        "kind must be \"like\" or \"dislike\", got {other:?}"
      ))),
    }
  }
}

// ─── Facts ───────────────────────────────────────────────────────────────────

/// One like/dislike fact. Keyed by `(user_id, video_id)`.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementFact {
  pub user_id:    Uuid,
  pub video_id:   Uuid,
  pub kind:       EngagementKind,
  pub created_at: DateTime<Utc>,
}

/// One subscription fact. Keyed by `(subscriber_id, channel_id)`;
/// presence means subscribed.
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionFact {
  pub subscriber_id: Uuid,
  pub channel_id:    Uuid,
  pub created_at:    DateTime<Utc>,
}

// ─── Results ─────────────────────────────────────────────────────────────────

/// What a toggle did to the fact row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
  Added,
  Removed,
  Switched,
}

/// Result of one like/dislike toggle.
#[derive(Debug, Clone, Serialize)]
pub struct ToggleOutcome {
  pub action:   ToggleAction,
  pub kind:     EngagementKind,
  /// The kind that was replaced or removed, absent on a fresh add.
  pub previous: Option<EngagementKind>,
}

/// Current engagement of one user on one video.
#[derive(Debug, Clone, Serialize)]
pub struct EngagementStatus {
  pub liked:    bool,
  pub disliked: bool,
  pub kind:     Option<EngagementKind>,
}

impl EngagementStatus {
  pub fn from_kind(kind: Option<EngagementKind>) -> Self {
    Self {
      liked:    kind == Some(EngagementKind::Like),
      disliked: kind == Some(EngagementKind::Dislike),
      kind,
    }
  }
}

/// Recount of fact rows for one video — the consistency oracle for the
/// denormalized counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngagementCounts {
  pub likes:    u64,
  pub dislikes: u64,
}

/// Result of one subscription toggle.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SubscriptionToggle {
  pub subscribed: bool,
}

/// How many channels an account follows and how many follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubscriptionStats {
  pub subscriptions: u64,
  pub subscribers:   u64,
}

// ─── Transition table ────────────────────────────────────────────────────────

/// How the fact row changes under a toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactChange {
  Insert,
  UpdateKind,
  Delete,
}

/// Signed counter adjustment applied atomically with the fact change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterDelta {
  pub likes:    i64,
  pub dislikes: i64,
}

impl CounterDelta {
  fn credit(kind: EngagementKind, amount: i64) -> Self {
    match kind {
      EngagementKind::Like => Self { likes: amount, dislikes: 0 },
      EngagementKind::Dislike => Self { likes: 0, dislikes: amount },
    }
  }

  fn plus(self, other: Self) -> Self {
    Self {
      likes:    self.likes + other.likes,
      dislikes: self.dislikes + other.dislikes,
    }
  }
}

/// One fully-determined toggle: the fact change, the counter delta, and the
/// outcome reported to the caller. Fact change and delta must be applied as
/// a single atomic unit.
#[derive(Debug, Clone)]
pub struct ToggleStep {
  pub change:  FactChange,
  pub delta:   CounterDelta,
  pub outcome: ToggleOutcome,
}

impl ToggleStep {
  /// The three-state transition table. Repeating the current kind toggles
  /// the fact off; the opposite kind switches it in place.
  pub fn compute(
    current: Option<EngagementKind>,
    requested: EngagementKind,
  ) -> Self {
    match current {
      None => Self {
        change:  FactChange::Insert,
        delta:   CounterDelta::credit(requested, 1),
        outcome: ToggleOutcome {
          action:   ToggleAction::Added,
          kind:     requested,
          previous: None,
        },
      },
      Some(prev) if prev == requested => Self {
        change:  FactChange::Delete,
        delta:   CounterDelta::credit(requested, -1),
        outcome: ToggleOutcome {
          action:   ToggleAction::Removed,
          kind:     requested,
          previous: Some(prev),
        },
      },
      Some(prev) => Self {
        change:  FactChange::UpdateKind,
        delta:   CounterDelta::credit(prev, -1)
          .plus(CounterDelta::credit(requested, 1)),
        outcome: ToggleOutcome {
          action:   ToggleAction::Switched,
          kind:     requested,
          previous: Some(prev),
        },
      },
    }
  }
}
