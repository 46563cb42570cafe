//! Scenario tests for [`IdentityResolver`] against the in-memory SQLite
//! store.

use std::sync::Arc;

use reel_core::{
  Error,
  account::{Credential, Provider},
  store::PlatformStore,
};
use reel_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{IdentityResolver, NewRegistration, OAuthProfile};

async fn resolver() -> (IdentityResolver<SqliteStore>, Arc<SqliteStore>) {
  let store = Arc::new(
    SqliteStore::open_in_memory().await.expect("in-memory store"),
  );
  let resolver = IdentityResolver::new(store.clone()).expect("resolver");
  (resolver, store)
}

fn registration(username: &str, email: &str) -> NewRegistration {
  NewRegistration {
    username:            username.into(),
    email:               email.into(),
    password:            "secret1".into(),
    channel_name:        format!("{username}'s channel"),
    channel_description: None,
  }
}

fn google_profile(subject: &str, email: Option<&str>) -> OAuthProfile {
  OAuthProfile {
    provider:     Provider::Google,
    subject_id:   subject.into(),
    email:        email.map(str::to_owned),
    display_name: "Alice Liddell".into(),
    avatar_url:   Some("https://img.example/alice.png".into()),
  }
}

// ─── Registration & login ────────────────────────────────────────────────────

#[tokio::test]
async fn register_then_login() {
  let (r, _) = resolver().await;

  let account = r.register(registration("alice", "alice@x.com")).await.unwrap();
  assert!(account.credential.is_local());

  let logged_in = r.login("alice@x.com", "secret1").await.unwrap();
  assert_eq!(logged_in.account_id, account.account_id);
}

#[tokio::test]
async fn login_failures_are_undifferentiated() {
  let (r, _) = resolver().await;
  r.register(registration("alice", "alice@x.com")).await.unwrap();

  // Wrong password and unknown email fail identically.
  let err = r.login("alice@x.com", "wrong-password").await.unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));

  let err = r.login("nobody@x.com", "secret1").await.unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));
}

#[tokio::test]
async fn login_is_case_insensitive_on_email() {
  let (r, _) = resolver().await;
  r.register(registration("alice", "Alice@X.com")).await.unwrap();

  assert!(r.login("alice@x.com", "secret1").await.is_ok());
  assert!(r.login("ALICE@x.com", "secret1").await.is_ok());
}

#[tokio::test]
async fn register_rejects_duplicates() {
  let (r, _) = resolver().await;
  r.register(registration("alice", "alice@x.com")).await.unwrap();

  let err = r
    .register(registration("alice2", "alice@x.com"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::EmailTaken(_)));

  let err = r
    .register(registration("alice", "other@x.com"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UsernameTaken(_)));
}

#[tokio::test]
async fn register_validates_input() {
  let (r, _) = resolver().await;

  let mut bad = registration("alice", "alice@x.com");
  bad.password = "short".into();
  assert!(matches!(
    r.register(bad).await.unwrap_err(),
    Error::Validation(_)
  ));

  let bad = registration("a!", "alice@x.com");
  assert!(matches!(
    r.register(bad).await.unwrap_err(),
    Error::Validation(_)
  ));

  let bad = registration("alice", "not-an-email");
  assert!(matches!(
    r.register(bad).await.unwrap_err(),
    Error::Validation(_)
  ));

  let mut bad = registration("alice", "alice@x.com");
  bad.channel_name = "  ".into();
  assert!(matches!(
    r.register(bad).await.unwrap_err(),
    Error::Validation(_)
  ));
}

#[tokio::test]
async fn register_normalizes_username_case() {
  let (r, _) = resolver().await;
  let account = r.register(registration("Alice_99", "a@x.com")).await.unwrap();
  assert_eq!(account.username, "alice_99");
}

// ─── OAuth resolution ────────────────────────────────────────────────────────

#[tokio::test]
async fn oauth_creates_fresh_federated_account() {
  let (r, _) = resolver().await;

  let account = r
    .resolve_oauth(google_profile("g123", Some("alice@x.com")))
    .await
    .unwrap();

  assert_eq!(
    account.credential.provider_link(),
    Some((Provider::Google, "g123"))
  );
  assert_eq!(account.email, "alice@x.com");
  assert_eq!(account.channel_name, "Alice Liddell");
  assert!(account.username.starts_with("alice_liddell_"));
  assert_eq!(
    account.avatar_url.as_deref(),
    Some("https://img.example/alice.png")
  );
}

#[tokio::test]
async fn oauth_repeat_callback_is_idempotent() {
  let (r, _) = resolver().await;

  let first = r
    .resolve_oauth(google_profile("g123", Some("alice@x.com")))
    .await
    .unwrap();
  let second = r
    .resolve_oauth(google_profile("g123", Some("alice@x.com")))
    .await
    .unwrap();

  assert_eq!(first.account_id, second.account_id);
  assert_eq!(first.username, second.username);
}

#[tokio::test]
async fn oauth_links_existing_local_account_in_place() {
  let (r, _) = resolver().await;
  let local = r.register(registration("alice", "alice@x.com")).await.unwrap();

  let linked = r
    .resolve_oauth(google_profile("g123", Some("alice@x.com")))
    .await
    .unwrap();

  // Same account: id, username, and counters preserved.
  assert_eq!(linked.account_id, local.account_id);
  assert_eq!(linked.username, "alice");
  assert_eq!(linked.subscriber_count, local.subscriber_count);
  assert_eq!(
    linked.credential.provider_link(),
    Some((Provider::Google, "g123"))
  );

  // Subsequent callbacks take the fast path to the same account.
  let again = r
    .resolve_oauth(google_profile("g123", Some("alice@x.com")))
    .await
    .unwrap();
  assert_eq!(again.account_id, local.account_id);
}

#[tokio::test]
async fn oauth_never_overwrites_an_active_link() {
  let (r, _) = resolver().await;
  r.resolve_oauth(OAuthProfile {
    provider:     Provider::Github,
    subject_id:   "gh1".into(),
    email:        Some("alice@x.com".into()),
    display_name: "Alice".into(),
    avatar_url:   None,
  })
  .await
  .unwrap();

  // Same email arriving from a different provider must not steal the account.
  let err = r
    .resolve_oauth(google_profile("g123", Some("alice@x.com")))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::ProviderConflict(e) if e == "alice@x.com"));
}

#[tokio::test]
async fn oauth_missing_email_fails_for_strict_providers() {
  let (r, _) = resolver().await;

  let err = r
    .resolve_oauth(google_profile("g123", None))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::MissingEmail(Provider::Google)));
}

#[tokio::test]
async fn oauth_twitter_without_email_gets_placeholder() {
  let (r, _) = resolver().await;

  let account = r
    .resolve_oauth(OAuthProfile {
      provider:     Provider::Twitter,
      subject_id:   "t42".into(),
      email:        None,
      display_name: "Bird Person".into(),
      avatar_url:   None,
    })
    .await
    .unwrap();

  assert_eq!(account.email, "twitter_t42@placeholder.invalid");

  // And the placeholder identity stays idempotent under retry.
  let again = r
    .resolve_oauth(OAuthProfile {
      provider:     Provider::Twitter,
      subject_id:   "t42".into(),
      email:        None,
      display_name: "Bird Person".into(),
      avatar_url:   None,
    })
    .await
    .unwrap();
  assert_eq!(again.account_id, account.account_id);
}

#[tokio::test]
async fn dormant_password_does_not_authenticate_linked_account() {
  let (r, _) = resolver().await;
  r.register(registration("alice", "alice@x.com")).await.unwrap();
  r.resolve_oauth(google_profile("g123", Some("alice@x.com")))
    .await
    .unwrap();

  // The credential tag is now Federated; the old password is dormant.
  let err = r.login("alice@x.com", "secret1").await.unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));
}

// ─── Provider linking ────────────────────────────────────────────────────────

#[tokio::test]
async fn link_then_unlink_restores_local_login() {
  let (r, _) = resolver().await;
  let account = r.register(registration("alice", "alice@x.com")).await.unwrap();

  let linked = r
    .link_provider(account.account_id, Provider::Github, "gh77")
    .await
    .unwrap();
  assert_eq!(
    linked.credential.provider_link(),
    Some((Provider::Github, "gh77"))
  );

  let unlinked = r.unlink_provider(account.account_id).await.unwrap();
  assert!(unlinked.credential.is_local());
  assert!(r.login("alice@x.com", "secret1").await.is_ok());
}

#[tokio::test]
async fn link_rejects_pair_held_by_another_account() {
  let (r, _) = resolver().await;
  r.resolve_oauth(google_profile("g123", Some("gal@x.com"))).await.unwrap();
  let other = r.register(registration("bob", "bob@x.com")).await.unwrap();

  let err = r
    .link_provider(other.account_id, Provider::Google, "g123")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AlreadyLinked(Provider::Google)));
}

#[tokio::test]
async fn relinking_same_account_is_a_no_op() {
  let (r, _) = resolver().await;
  let account = r.register(registration("alice", "alice@x.com")).await.unwrap();
  r.link_provider(account.account_id, Provider::Github, "gh77")
    .await
    .unwrap();

  let again = r
    .link_provider(account.account_id, Provider::Github, "gh77")
    .await
    .unwrap();
  assert_eq!(again.account_id, account.account_id);
}

#[tokio::test]
async fn unlink_without_password_is_refused() {
  let (r, _) = resolver().await;
  let account = r
    .resolve_oauth(google_profile("g123", Some("gal@x.com")))
    .await
    .unwrap();

  let err = r.unlink_provider(account.account_id).await.unwrap_err();
  assert!(matches!(err, Error::PasswordRequired));
}

#[tokio::test]
async fn unlink_already_local_account_is_a_no_op() {
  let (r, _) = resolver().await;
  let account = r.register(registration("alice", "alice@x.com")).await.unwrap();

  let unlinked = r.unlink_provider(account.account_id).await.unwrap();
  assert!(unlinked.credential.is_local());
}

// ─── Password & profile maintenance ──────────────────────────────────────────

#[tokio::test]
async fn change_password_requires_the_current_one() {
  let (r, _) = resolver().await;
  let account = r.register(registration("alice", "alice@x.com")).await.unwrap();

  let err = r
    .change_password(account.account_id, "wrong", "newsecret")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidCredentials));

  r.change_password(account.account_id, "secret1", "newsecret")
    .await
    .unwrap();
  assert!(r.login("alice@x.com", "newsecret").await.is_ok());
  assert!(r.login("alice@x.com", "secret1").await.is_err());
}

#[tokio::test]
async fn change_password_validates_new_password() {
  let (r, _) = resolver().await;
  let account = r.register(registration("alice", "alice@x.com")).await.unwrap();

  let err = r
    .change_password(account.account_id, "secret1", "short")
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn update_profile_touches_only_display_fields() {
  let (r, store) = resolver().await;
  let account = r.register(registration("alice", "alice@x.com")).await.unwrap();

  let patched = r
    .update_profile(
      account.account_id,
      reel_core::account::ProfilePatch {
        channel_name: Some("Wonderland".into()),
        ..Default::default()
      },
    )
    .await
    .unwrap();

  assert_eq!(patched.channel_name, "Wonderland");
  assert_eq!(patched.username, "alice");

  // Credential untouched: login still works.
  assert!(r.login("alice@x.com", "secret1").await.is_ok());
  let stored = store.get_account(account.account_id).await.unwrap().unwrap();
  assert!(matches!(stored.credential, Credential::Local { .. }));
}

#[tokio::test]
async fn get_account_missing_errors() {
  let (r, _) = resolver().await;
  let missing = Uuid::new_v4();
  let err = r.get_account(missing).await.unwrap_err();
  assert!(matches!(err, Error::AccountNotFound(id) if id == missing));
}
