//! [`EngagementLedger`] — the toggle surface for likes, dislikes, and
//! subscriptions.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use reel_core::{
  Error, Result,
  engagement::{
    EngagementCounts, EngagementKind, EngagementStatus, SubscriptionStats,
    SubscriptionToggle, ToggleOutcome,
  },
  store::PlatformStore,
};

pub struct EngagementLedger<S> {
  store: Arc<S>,
}

impl<S: PlatformStore> EngagementLedger<S> {
  pub fn new(store: Arc<S>) -> Self { Self { store } }

  // ── Likes & dislikes ──────────────────────────────────────────────────────

  /// Toggle a like or dislike on a video.
  ///
  /// Deliberately not idempotent: repeating the same call flips the state
  /// again, matching toggle-button semantics. Fact row and counters move
  /// together inside the store's transaction.
  pub async fn toggle(
    &self,
    user_id: Uuid,
    video_id: Uuid,
    kind: EngagementKind,
  ) -> Result<ToggleOutcome> {
    let outcome = self.store.toggle_engagement(user_id, video_id, kind).await?;
    debug!(%user_id, %video_id, kind = kind.as_str(),
           action = ?outcome.action, "engagement toggled");
    Ok(outcome)
  }

  /// One user's current engagement on one video. Pure read.
  pub async fn state(
    &self,
    user_id: Uuid,
    video_id: Uuid,
  ) -> Result<EngagementStatus> {
    self.store.engagement_state(user_id, video_id).await
  }

  /// Recount a video's likes and dislikes from the fact table.
  pub async fn counts(&self, video_id: Uuid) -> Result<EngagementCounts> {
    self
      .store
      .get_video(video_id)
      .await?
      .ok_or(Error::VideoNotFound(video_id))?;
    self.store.count_engagements(video_id).await
  }

  /// Drop every engagement fact for a video (used when the video goes
  /// away). Returns the number of facts removed.
  pub async fn purge_video(&self, video_id: Uuid) -> Result<u64> {
    let removed = self.store.purge_video_engagements(video_id).await?;
    debug!(%video_id, removed, "purged video engagements");
    Ok(removed)
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  /// Subscribe if not subscribed, unsubscribe if subscribed.
  pub async fn toggle_subscription(
    &self,
    subscriber_id: Uuid,
    channel_id: Uuid,
  ) -> Result<SubscriptionToggle> {
    if subscriber_id == channel_id {
      return Err(Error::SelfSubscription);
    }
    let toggled = self
      .store
      .toggle_subscription(subscriber_id, channel_id)
      .await?;
    debug!(%subscriber_id, %channel_id, subscribed = toggled.subscribed,
           "subscription toggled");
    Ok(toggled)
  }

  pub async fn is_subscribed(
    &self,
    subscriber_id: Uuid,
    channel_id: Uuid,
  ) -> Result<bool> {
    self.store.is_subscribed(subscriber_id, channel_id).await
  }

  /// How many channels the account follows and how many follow it.
  pub async fn stats(&self, account_id: Uuid) -> Result<SubscriptionStats> {
    self
      .store
      .get_account(account_id)
      .await?
      .ok_or(Error::AccountNotFound(account_id))?;
    self.store.subscription_stats(account_id).await
  }
}
