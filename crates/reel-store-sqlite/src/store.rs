//! [`SqliteStore`] — the SQLite implementation of [`PlatformStore`].
//!
//! Both toggle operations run their existence check, fact mutation, and
//! counter adjustment inside one `Immediate` transaction, so an aborted
//! caller can never observe a fact row without its counter change (or the
//! reverse).

use std::path::Path;

use chrono::Utc;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use reel_core::{
  Error, Result,
  account::{Account, Credential, NewAccount, ProfilePatch, Provider},
  engagement::{
    EngagementCounts, EngagementKind, EngagementStatus, FactChange,
    SubscriptionStats, SubscriptionToggle, ToggleOutcome, ToggleStep,
  },
  store::PlatformStore,
  video::{NewVideo, Video},
};

use crate::{
  encode::{
    ACCOUNT_COLUMNS, RawAccount, RawVideo, VIDEO_COLUMNS, decode_kind,
    encode_credential, encode_dt, encode_uuid,
  },
  error::{self, Constraint},
  schema::SCHEMA,
};

/// Decode the `kind` column inside a rusqlite row closure.
fn kind_from_column(s: &str, idx: usize) -> rusqlite::Result<EngagementKind> {
  match s {
    "like" => Ok(EngagementKind::Like),
    "dislike" => Ok(EngagementKind::Dislike),
    other => Err(rusqlite::Error::FromSqlConversionFailure(
      idx,
      rusqlite::types::Type::Text,
      format!("bad engagement kind {other:?}").into(),
    )),
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Reel platform store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path)
      .await
      .map_err(error::storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory()
      .await
      .map_err(error::storage)?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await
      .map_err(error::storage)
  }

  /// Fetch one account by an equality predicate on a single column.
  /// `column` is compile-time constant in every caller; never caller input.
  async fn account_where(
    &self,
    column: &'static str,
    value: String,
  ) -> Result<Option<Account>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = ?1"
              ),
              rusqlite::params![value],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(error::storage)?;

    raw.map(RawAccount::into_account).transpose()
  }
}

// ─── PlatformStore impl ──────────────────────────────────────────────────────

impl PlatformStore for SqliteStore {
  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_account(&self, input: NewAccount) -> Result<Account> {
    let account = Account {
      account_id:          Uuid::new_v4(),
      username:            input.username,
      email:               input.email,
      credential:          input.credential,
      channel_name:        input.channel_name,
      channel_description: input.channel_description,
      avatar_url:          input.avatar_url,
      subscriber_count:    0,
      created_at:          Utc::now(),
    };

    let (provider_str, subject_str, hash_str) =
      encode_credential(&account.credential);
    let id_str       = encode_uuid(account.account_id);
    let at_str       = encode_dt(account.created_at);
    let username     = account.username.clone();
    let email        = account.email.clone();
    let channel_name = account.channel_name.clone();
    let description  = account.channel_description.clone();
    let avatar_url   = account.avatar_url.clone();

    // Context for constraint translation; the closure consumes the clones.
    let email_ctx    = account.email.clone();
    let username_ctx = account.username.clone();
    let provider_ctx = account.credential.provider_link().map(|(p, _)| p);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (
             account_id, username, email, auth_provider,
             provider_subject_id, password_hash, channel_name,
             channel_description, avatar_url, subscriber_count, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, ?10)",
          rusqlite::params![
            id_str,
            username,
            email,
            provider_str,
            subject_str,
            hash_str,
            channel_name,
            description,
            avatar_url,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| match error::violated_constraint(&e) {
        Some(Constraint::Email) => Error::EmailTaken(email_ctx),
        Some(Constraint::Username) => Error::UsernameTaken(username_ctx),
        Some(Constraint::ProviderPair) => match provider_ctx {
          Some(provider) => Error::AlreadyLinked(provider),
          None => error::storage(e),
        },
        _ => error::storage(e),
      })?;

    Ok(account)
  }

  async fn get_account(&self, id: Uuid) -> Result<Option<Account>> {
    self.account_where("account_id", encode_uuid(id)).await
  }

  async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
    self.account_where("email", email.to_owned()).await
  }

  async fn find_by_provider(
    &self,
    provider: Provider,
    subject_id: &str,
  ) -> Result<Option<Account>> {
    let provider_str = provider.as_str().to_owned();
    let subject_str  = subject_id.to_owned();

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ACCOUNT_COLUMNS} FROM accounts
                 WHERE auth_provider = ?1 AND provider_subject_id = ?2"
              ),
              rusqlite::params![provider_str, subject_str],
              RawAccount::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(error::storage)?;

    raw.map(RawAccount::into_account).transpose()
  }

  async fn username_taken(&self, username: &str) -> Result<bool> {
    let username = username.to_owned();
    self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM accounts WHERE username = ?1",
              rusqlite::params![username],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await
      .map_err(error::storage)
  }

  async fn update_credential(
    &self,
    id: Uuid,
    credential: Credential,
  ) -> Result<Account> {
    let (provider_str, subject_str, hash_str) = encode_credential(&credential);
    let id_str       = encode_uuid(id);
    let provider_ctx = credential.provider_link().map(|(p, _)| p);

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts
           SET auth_provider = ?2, provider_subject_id = ?3, password_hash = ?4
           WHERE account_id = ?1",
          rusqlite::params![id_str, provider_str, subject_str, hash_str],
        )?)
      })
      .await
      .map_err(|e| match error::violated_constraint(&e) {
        Some(Constraint::ProviderPair) => match provider_ctx {
          Some(provider) => Error::AlreadyLinked(provider),
          None => error::storage(e),
        },
        _ => error::storage(e),
      })?;

    if updated == 0 {
      return Err(Error::AccountNotFound(id));
    }
    self.get_account(id).await?.ok_or(Error::AccountNotFound(id))
  }

  async fn update_profile(
    &self,
    id: Uuid,
    patch: &ProfilePatch,
  ) -> Result<Account> {
    let id_str       = encode_uuid(id);
    let channel_name = patch.channel_name.clone();
    let description  = patch.channel_description.clone();
    let avatar_url   = patch.avatar_url.clone();

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts
           SET channel_name        = COALESCE(?2, channel_name),
               channel_description = COALESCE(?3, channel_description),
               avatar_url          = COALESCE(?4, avatar_url)
           WHERE account_id = ?1",
          rusqlite::params![id_str, channel_name, description, avatar_url],
        )?)
      })
      .await
      .map_err(error::storage)?;

    if updated == 0 {
      return Err(Error::AccountNotFound(id));
    }
    self.get_account(id).await?.ok_or(Error::AccountNotFound(id))
  }

  // ── Videos ────────────────────────────────────────────────────────────────

  async fn create_video(&self, input: NewVideo) -> Result<Video> {
    let video = Video {
      video_id:   Uuid::new_v4(),
      owner_id:   input.owner_id,
      title:      input.title,
      likes:      0,
      dislikes:   0,
      created_at: Utc::now(),
    };

    let id_str    = encode_uuid(video.video_id);
    let owner_str = encode_uuid(video.owner_id);
    let title     = video.title.clone();
    let at_str    = encode_dt(video.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO videos (video_id, owner_id, title, likes, dislikes, created_at)
           VALUES (?1, ?2, ?3, 0, 0, ?4)",
          rusqlite::params![id_str, owner_str, title, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(error::storage)?;

    Ok(video)
  }

  async fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
    let id_str = encode_uuid(id);

    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE video_id = ?1"),
              rusqlite::params![id_str],
              RawVideo::from_row,
            )
            .optional()?,
        )
      })
      .await
      .map_err(error::storage)?;

    raw.map(RawVideo::into_video).transpose()
  }

  // ── Engagement ────────────────────────────────────────────────────────────

  async fn toggle_engagement(
    &self,
    user_id: Uuid,
    video_id: Uuid,
    kind: EngagementKind,
  ) -> Result<ToggleOutcome> {
    let user_str  = encode_uuid(user_id);
    let video_str = encode_uuid(video_id);

    let outcome = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let video_exists: bool = tx
          .query_row(
            "SELECT 1 FROM videos WHERE video_id = ?1",
            rusqlite::params![video_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !video_exists {
          return Ok(None);
        }

        let current: Option<EngagementKind> = tx
          .query_row(
            "SELECT kind FROM engagement_facts
             WHERE user_id = ?1 AND video_id = ?2",
            rusqlite::params![user_str, video_str],
            |row| {
              let s: String = row.get(0)?;
              kind_from_column(&s, 0)
            },
          )
          .optional()?;

        let step = ToggleStep::compute(current, kind);

        match step.change {
          FactChange::Insert => {
            tx.execute(
              "INSERT INTO engagement_facts (user_id, video_id, kind, created_at)
               VALUES (?1, ?2, ?3, ?4)",
              rusqlite::params![
                user_str,
                video_str,
                kind.as_str(),
                encode_dt(Utc::now()),
              ],
            )?;
          }
          FactChange::UpdateKind => {
            tx.execute(
              "UPDATE engagement_facts SET kind = ?3
               WHERE user_id = ?1 AND video_id = ?2",
              rusqlite::params![user_str, video_str, kind.as_str()],
            )?;
          }
          FactChange::Delete => {
            tx.execute(
              "DELETE FROM engagement_facts
               WHERE user_id = ?1 AND video_id = ?2",
              rusqlite::params![user_str, video_str],
            )?;
          }
        }

        // Floor 0: a replayed decrement must clamp, never wrap negative.
        tx.execute(
          "UPDATE videos
           SET likes = MAX(likes + ?2, 0), dislikes = MAX(dislikes + ?3, 0)
           WHERE video_id = ?1",
          rusqlite::params![video_str, step.delta.likes, step.delta.dislikes],
        )?;

        tx.commit()?;
        Ok(Some(step.outcome))
      })
      .await
      .map_err(error::storage)?;

    outcome.ok_or(Error::VideoNotFound(video_id))
  }

  async fn engagement_state(
    &self,
    user_id: Uuid,
    video_id: Uuid,
  ) -> Result<EngagementStatus> {
    let user_str  = encode_uuid(user_id);
    let video_str = encode_uuid(video_id);

    let raw: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT kind FROM engagement_facts
               WHERE user_id = ?1 AND video_id = ?2",
              rusqlite::params![user_str, video_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await
      .map_err(error::storage)?;

    let kind = raw.as_deref().map(decode_kind).transpose()?;
    Ok(EngagementStatus::from_kind(kind))
  }

  async fn count_engagements(&self, video_id: Uuid) -> Result<EngagementCounts> {
    let video_str = encode_uuid(video_id);

    let (likes, dislikes): (i64, i64) = self
      .conn
      .call(move |conn| {
        let likes = conn.query_row(
          "SELECT COUNT(*) FROM engagement_facts
           WHERE video_id = ?1 AND kind = 'like'",
          rusqlite::params![video_str],
          |row| row.get(0),
        )?;
        let dislikes = conn.query_row(
          "SELECT COUNT(*) FROM engagement_facts
           WHERE video_id = ?1 AND kind = 'dislike'",
          rusqlite::params![video_str],
          |row| row.get(0),
        )?;
        Ok((likes, dislikes))
      })
      .await
      .map_err(error::storage)?;

    Ok(EngagementCounts { likes: likes as u64, dislikes: dislikes as u64 })
  }

  async fn purge_video_engagements(&self, video_id: Uuid) -> Result<u64> {
    let video_str = encode_uuid(video_id);

    let removed = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let removed = tx.execute(
          "DELETE FROM engagement_facts WHERE video_id = ?1",
          rusqlite::params![video_str],
        )?;
        // Keep the counters honest even if the video row outlives the purge.
        tx.execute(
          "UPDATE videos SET likes = 0, dislikes = 0 WHERE video_id = ?1",
          rusqlite::params![video_str],
        )?;
        tx.commit()?;
        Ok(removed)
      })
      .await
      .map_err(error::storage)?;

    Ok(removed as u64)
  }

  // ── Subscriptions ─────────────────────────────────────────────────────────

  async fn toggle_subscription(
    &self,
    subscriber_id: Uuid,
    channel_id: Uuid,
  ) -> Result<SubscriptionToggle> {
    let sub_str  = encode_uuid(subscriber_id);
    let chan_str = encode_uuid(channel_id);

    let toggled = self
      .conn
      .call(move |conn| {
        let tx =
          conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let channel_exists: bool = tx
          .query_row(
            "SELECT 1 FROM accounts WHERE account_id = ?1",
            rusqlite::params![chan_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !channel_exists {
          return Ok(None);
        }

        let existing: bool = tx
          .query_row(
            "SELECT 1 FROM subscription_facts
             WHERE subscriber_id = ?1 AND channel_id = ?2",
            rusqlite::params![sub_str, chan_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        let subscribed = if existing {
          tx.execute(
            "DELETE FROM subscription_facts
             WHERE subscriber_id = ?1 AND channel_id = ?2",
            rusqlite::params![sub_str, chan_str],
          )?;
          tx.execute(
            "UPDATE accounts
             SET subscriber_count = MAX(subscriber_count - 1, 0)
             WHERE account_id = ?1",
            rusqlite::params![chan_str],
          )?;
          false
        } else {
          tx.execute(
            "INSERT INTO subscription_facts (subscriber_id, channel_id, created_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![sub_str, chan_str, encode_dt(Utc::now())],
          )?;
          tx.execute(
            "UPDATE accounts SET subscriber_count = subscriber_count + 1
             WHERE account_id = ?1",
            rusqlite::params![chan_str],
          )?;
          true
        };

        tx.commit()?;
        Ok(Some(SubscriptionToggle { subscribed }))
      })
      .await
      .map_err(|e| match error::violated_constraint(&e) {
        Some(Constraint::SelfSubscription) => Error::SelfSubscription,
        _ => error::storage(e),
      })?;

    toggled.ok_or(Error::AccountNotFound(channel_id))
  }

  async fn is_subscribed(
    &self,
    subscriber_id: Uuid,
    channel_id: Uuid,
  ) -> Result<bool> {
    let sub_str  = encode_uuid(subscriber_id);
    let chan_str = encode_uuid(channel_id);

    self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM subscription_facts
               WHERE subscriber_id = ?1 AND channel_id = ?2",
              rusqlite::params![sub_str, chan_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await
      .map_err(error::storage)
  }

  async fn subscription_stats(
    &self,
    account_id: Uuid,
  ) -> Result<SubscriptionStats> {
    let id_str = encode_uuid(account_id);

    let (subscriptions, subscribers): (i64, i64) = self
      .conn
      .call(move |conn| {
        let subscriptions = conn.query_row(
          "SELECT COUNT(*) FROM subscription_facts WHERE subscriber_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?;
        let subscribers = conn.query_row(
          "SELECT COUNT(*) FROM subscription_facts WHERE channel_id = ?1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?;
        Ok((subscriptions, subscribers))
      })
      .await
      .map_err(error::storage)?;

    Ok(SubscriptionStats {
      subscriptions: subscriptions as u64,
      subscribers:   subscribers as u64,
    })
  }
}
