//! Scenario tests for [`EngagementLedger`] against the in-memory SQLite
//! store.

use std::sync::Arc;

use reel_core::{
  Error,
  account::{Credential, NewAccount},
  engagement::{EngagementKind, ToggleAction},
  store::PlatformStore,
  video::NewVideo,
};
use reel_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::EngagementLedger;

use EngagementKind::{Dislike, Like};

async fn ledger() -> (EngagementLedger<SqliteStore>, Arc<SqliteStore>) {
  let store = Arc::new(
    SqliteStore::open_in_memory().await.expect("in-memory store"),
  );
  (EngagementLedger::new(store.clone()), store)
}

async fn account(store: &SqliteStore, username: &str) -> Uuid {
  store
    .create_account(NewAccount {
      username:            username.into(),
      email:               format!("{username}@x.com"),
      credential:          Credential::Local {
        password_hash: "$argon2id$v=19$stub".into(),
      },
      channel_name:        username.into(),
      channel_description: None,
      avatar_url:          None,
    })
    .await
    .expect("account")
    .account_id
}

async fn video(store: &SqliteStore, owner: Uuid) -> Uuid {
  store
    .create_video(NewVideo { owner_id: owner, title: "v".into() })
    .await
    .expect("video")
    .video_id
}

async fn video_counters(store: &SqliteStore, video_id: Uuid) -> (u64, u64) {
  let v = store.get_video(video_id).await.unwrap().unwrap();
  (v.likes, v.dislikes)
}

/// The denormalized counters must equal the fact recount whenever no toggle
/// is in flight.
async fn assert_counters_consistent(store: &SqliteStore, video_id: Uuid) {
  let v = store.get_video(video_id).await.unwrap().unwrap();
  let counts = store.count_engagements(video_id).await.unwrap();
  assert_eq!((v.likes, v.dislikes), (counts.likes, counts.dislikes));
}

// ─── Like/dislike toggles ────────────────────────────────────────────────────

#[tokio::test]
async fn toggle_pair_returns_to_none_and_back() {
  let (l, store) = ledger().await;
  let owner = account(&store, "owner").await;
  let user = account(&store, "user").await;
  let v = video(&store, owner).await;

  // Liked → None → Liked.
  let first = l.toggle(user, v, Like).await.unwrap();
  assert_eq!(first.action, ToggleAction::Added);

  let second = l.toggle(user, v, Like).await.unwrap();
  assert_eq!(second.action, ToggleAction::Removed);
  assert!(!l.state(user, v).await.unwrap().liked);

  let third = l.toggle(user, v, Like).await.unwrap();
  assert_eq!(third.action, ToggleAction::Added);
  assert!(l.state(user, v).await.unwrap().liked);

  assert_counters_consistent(&store, v).await;
}

#[tokio::test]
async fn like_dislike_dislike_scenario() {
  let (l, store) = ledger().await;
  let owner = account(&store, "owner").await;
  let user = account(&store, "user").await;
  let v = video(&store, owner).await;
  assert_eq!(video_counters(&store, v).await, (0, 0));

  l.toggle(user, v, Like).await.unwrap();
  assert_eq!(video_counters(&store, v).await, (1, 0));

  l.toggle(user, v, Dislike).await.unwrap();
  assert_eq!(video_counters(&store, v).await, (0, 1));

  l.toggle(user, v, Dislike).await.unwrap();
  assert_eq!(video_counters(&store, v).await, (0, 0));

  assert_counters_consistent(&store, v).await;
}

#[tokio::test]
async fn switch_updates_state_and_both_counters() {
  let (l, store) = ledger().await;
  let owner = account(&store, "owner").await;
  let user = account(&store, "user").await;
  let v = video(&store, owner).await;

  l.toggle(user, v, Like).await.unwrap();
  let out = l.toggle(user, v, Dislike).await.unwrap();
  assert_eq!(out.action, ToggleAction::Switched);
  assert_eq!(out.previous, Some(Like));

  let state = l.state(user, v).await.unwrap();
  assert!(state.disliked && !state.liked);
  assert_eq!(video_counters(&store, v).await, (0, 1));
}

#[tokio::test]
async fn counters_never_go_negative() {
  let (l, store) = ledger().await;
  let owner = account(&store, "owner").await;
  let user = account(&store, "user").await;
  let v = video(&store, owner).await;

  // A worst-case toggle storm; counters must stay within [0, 1] for a
  // single user and end consistent with the facts.
  for kind in [Like, Like, Dislike, Dislike, Like, Dislike, Like, Like] {
    l.toggle(user, v, kind).await.unwrap();
    let (likes, dislikes) = video_counters(&store, v).await;
    assert!(likes <= 1 && dislikes <= 1);
    assert_counters_consistent(&store, v).await;
  }
}

#[tokio::test]
async fn toggles_by_many_users_accumulate() {
  let (l, store) = ledger().await;
  let owner = account(&store, "owner").await;
  let v = video(&store, owner).await;

  for name in ["u1", "u2", "u3"] {
    let u = account(&store, name).await;
    l.toggle(u, v, Like).await.unwrap();
  }
  let hater = account(&store, "u4").await;
  l.toggle(hater, v, Dislike).await.unwrap();

  assert_eq!(video_counters(&store, v).await, (3, 1));
  assert_counters_consistent(&store, v).await;
}

#[tokio::test]
async fn toggle_unknown_video_fails() {
  let (l, store) = ledger().await;
  let user = account(&store, "user").await;

  let missing = Uuid::new_v4();
  let err = l.toggle(user, missing, Like).await.unwrap_err();
  assert!(matches!(err, Error::VideoNotFound(id) if id == missing));
}

#[tokio::test]
async fn state_is_a_pure_read() {
  let (l, store) = ledger().await;
  let owner = account(&store, "owner").await;
  let user = account(&store, "user").await;
  let v = video(&store, owner).await;

  l.toggle(user, v, Like).await.unwrap();
  for _ in 0..3 {
    let state = l.state(user, v).await.unwrap();
    assert!(state.liked);
  }
  assert_eq!(video_counters(&store, v).await, (1, 0));
}

#[tokio::test]
async fn counts_unknown_video_fails() {
  let (l, _) = ledger().await;
  let err = l.counts(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::VideoNotFound(_)));
}

#[tokio::test]
async fn purge_clears_facts_and_counters() {
  let (l, store) = ledger().await;
  let owner = account(&store, "owner").await;
  let v = video(&store, owner).await;

  for name in ["u1", "u2"] {
    let u = account(&store, name).await;
    l.toggle(u, v, Like).await.unwrap();
  }

  assert_eq!(l.purge_video(v).await.unwrap(), 2);
  assert_eq!(video_counters(&store, v).await, (0, 0));
  assert_counters_consistent(&store, v).await;
}

// ─── Subscriptions ───────────────────────────────────────────────────────────

#[tokio::test]
async fn subscription_double_toggle_round_trips() {
  let (l, store) = ledger().await;
  let subscriber = account(&store, "sub").await;
  let channel = account(&store, "chan").await;

  let t = l.toggle_subscription(subscriber, channel).await.unwrap();
  assert!(t.subscribed);
  assert!(l.is_subscribed(subscriber, channel).await.unwrap());
  let c = store.get_account(channel).await.unwrap().unwrap();
  assert_eq!(c.subscriber_count, 1);

  let t = l.toggle_subscription(subscriber, channel).await.unwrap();
  assert!(!t.subscribed);
  assert!(!l.is_subscribed(subscriber, channel).await.unwrap());
  let c = store.get_account(channel).await.unwrap().unwrap();
  assert_eq!(c.subscriber_count, 0);
}

#[tokio::test]
async fn self_subscription_always_fails_and_writes_nothing() {
  let (l, store) = ledger().await;
  let solo = account(&store, "solo").await;

  for _ in 0..2 {
    let err = l.toggle_subscription(solo, solo).await.unwrap_err();
    assert!(matches!(err, Error::SelfSubscription));
  }

  assert!(!l.is_subscribed(solo, solo).await.unwrap());
  let c = store.get_account(solo).await.unwrap().unwrap();
  assert_eq!(c.subscriber_count, 0);
}

#[tokio::test]
async fn subscription_to_unknown_channel_fails() {
  let (l, store) = ledger().await;
  let subscriber = account(&store, "sub").await;

  let missing = Uuid::new_v4();
  let err = l
    .toggle_subscription(subscriber, missing)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AccountNotFound(id) if id == missing));
}

#[tokio::test]
async fn stats_count_both_directions() {
  let (l, store) = ledger().await;
  let a = account(&store, "a").await;
  let b = account(&store, "b").await;
  let c = account(&store, "c").await;

  l.toggle_subscription(a, b).await.unwrap();
  l.toggle_subscription(a, c).await.unwrap();
  l.toggle_subscription(b, a).await.unwrap();

  let stats = l.stats(a).await.unwrap();
  assert_eq!(stats.subscriptions, 2);
  assert_eq!(stats.subscribers, 1);

  let err = l.stats(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::AccountNotFound(_)));
}
