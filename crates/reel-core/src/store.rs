//! The `PlatformStore` trait.
//!
//! Implemented by storage backends (e.g. `reel-store-sqlite`). The identity
//! and engagement services depend on this abstraction, not on any concrete
//! backend.
//!
//! Methods return the domain [`Result`] directly: implementations translate
//! backend faults — in particular unique-index violations — into the error
//! taxonomy before they cross this boundary, so callers can branch on
//! `EmailTaken` vs. `AlreadyLinked` without knowing the backend. Both toggle
//! operations must apply the fact mutation and the counter adjustment as a
//! single atomic unit; a caller aborted mid-call must never leave the pair
//! half-applied.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes.

use std::future::Future;

use uuid::Uuid;

use crate::{
  Result,
  account::{Account, Credential, NewAccount, ProfilePatch, Provider},
  engagement::{
    EngagementCounts, EngagementKind, EngagementStatus, SubscriptionStats,
    SubscriptionToggle, ToggleOutcome,
  },
  video::{NewVideo, Video},
};

pub trait PlatformStore: Send + Sync {
  // ── Accounts ──────────────────────────────────────────────────────────

  /// Persist a new account. Fails `EmailTaken` / `UsernameTaken` /
  /// `AlreadyLinked` when the corresponding unique index rejects the row.
  fn create_account(
    &self,
    input: NewAccount,
  ) -> impl Future<Output = Result<Account>> + Send + '_;

  /// Retrieve an account by id. Returns `None` if not found.
  fn get_account(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Account>>> + Send + '_;

  /// Look up by normalized (lowercase) email.
  fn find_by_email<'a>(
    &'a self,
    email: &'a str,
  ) -> impl Future<Output = Result<Option<Account>>> + Send + 'a;

  /// Look up by active federated `(provider, subject)` pair.
  fn find_by_provider<'a>(
    &'a self,
    provider: Provider,
    subject_id: &'a str,
  ) -> impl Future<Output = Result<Option<Account>>> + Send + 'a;

  fn username_taken<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<bool>> + Send + 'a;

  /// Replace the credential in place, preserving id, username and counters.
  /// Fails `AlreadyLinked` when a federated pair collides with another
  /// account, `AccountNotFound` when `id` does not resolve.
  fn update_credential(
    &self,
    id: Uuid,
    credential: Credential,
  ) -> impl Future<Output = Result<Account>> + Send + '_;

  /// Apply the `Some` fields of `patch` to the display profile.
  fn update_profile<'a>(
    &'a self,
    id: Uuid,
    patch: &'a ProfilePatch,
  ) -> impl Future<Output = Result<Account>> + Send + 'a;

  // ── Videos ────────────────────────────────────────────────────────────

  fn create_video(
    &self,
    input: NewVideo,
  ) -> impl Future<Output = Result<Video>> + Send + '_;

  fn get_video(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Video>>> + Send + '_;

  // ── Engagement ────────────────────────────────────────────────────────

  /// Apply one like/dislike toggle: fact row write and counter adjustment
  /// in one transaction, with the video-existence check inside it. Fails
  /// `VideoNotFound` when the video does not resolve.
  fn toggle_engagement(
    &self,
    user_id: Uuid,
    video_id: Uuid,
    kind: EngagementKind,
  ) -> impl Future<Output = Result<ToggleOutcome>> + Send + '_;

  /// Pure read of one user's engagement on one video.
  fn engagement_state(
    &self,
    user_id: Uuid,
    video_id: Uuid,
  ) -> impl Future<Output = Result<EngagementStatus>> + Send + '_;

  /// Recount fact rows for a video. The denormalized counters must equal
  /// this at every quiescent point.
  fn count_engagements(
    &self,
    video_id: Uuid,
  ) -> impl Future<Output = Result<EngagementCounts>> + Send + '_;

  /// Delete all engagement facts for a video and zero its counters, in one
  /// transaction. Returns the number of facts removed.
  fn purge_video_engagements(
    &self,
    video_id: Uuid,
  ) -> impl Future<Output = Result<u64>> + Send + '_;

  // ── Subscriptions ─────────────────────────────────────────────────────

  /// Flip the subscription fact and adjust the channel's subscriber count
  /// in one transaction, with the channel-existence check inside it. Fails
  /// `AccountNotFound` when the channel does not resolve.
  fn toggle_subscription(
    &self,
    subscriber_id: Uuid,
    channel_id: Uuid,
  ) -> impl Future<Output = Result<SubscriptionToggle>> + Send + '_;

  fn is_subscribed(
    &self,
    subscriber_id: Uuid,
    channel_id: Uuid,
  ) -> impl Future<Output = Result<bool>> + Send + '_;

  /// Count the account's outgoing subscriptions and incoming subscribers
  /// from the fact table.
  fn subscription_stats(
    &self,
    account_id: Uuid,
  ) -> impl Future<Output = Result<SubscriptionStats>> + Send + '_;
}
