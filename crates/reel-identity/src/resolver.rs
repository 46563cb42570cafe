//! [`IdentityResolver`] — credential assertions in, exactly one account out.
//!
//! The store's unique indexes are the last word on every uniqueness
//! invariant here; this layer's pre-checks exist to produce precise errors,
//! not to prevent races. Where a race does slip past a pre-check the
//! store's typed conflict error is caught and resolved (OAuth create) or
//! relayed as-is (registration).

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use reel_core::{
  Error, Result,
  account::{Account, Credential, NewAccount, ProfilePatch, Provider},
  store::PlatformStore,
  validate,
};

use crate::{password, profile::OAuthProfile, username};

/// Input to [`IdentityResolver::register`].
#[derive(Debug, Clone)]
pub struct NewRegistration {
  pub username:            String,
  pub email:               String,
  pub password:            String,
  pub channel_name:        String,
  pub channel_description: Option<String>,
}

pub struct IdentityResolver<S> {
  store:      Arc<S>,
  /// Verified against when a login has no usable stored hash, so every
  /// failure path costs one argon2 comparison and timing does not reveal
  /// whether the email exists.
  dummy_hash: String,
}

impl<S: PlatformStore> IdentityResolver<S> {
  pub fn new(store: Arc<S>) -> Result<Self> {
    let dummy_hash = password::hash("reel-login-timing-pad")?;
    Ok(Self { store, dummy_hash })
  }

  // ── Local credentials ─────────────────────────────────────────────────────

  /// Register a new local account.
  pub async fn register(&self, input: NewRegistration) -> Result<Account> {
    let username = input.username.trim().to_lowercase();
    validate::validate_username(&username)?;
    let email = validate::normalize_email(&input.email);
    validate::validate_email(&email)?;
    validate::validate_password(&input.password)?;
    validate::validate_channel_name(&input.channel_name)?;
    validate::validate_channel_description(
      input.channel_description.as_deref(),
    )?;

    // Friendly duplicate checks; the unique indexes are the race backstop.
    if self.store.find_by_email(&email).await?.is_some() {
      return Err(Error::EmailTaken(email));
    }
    if self.store.username_taken(&username).await? {
      return Err(Error::UsernameTaken(username));
    }

    let password_hash = password::hash(&input.password)?;
    let account = self
      .store
      .create_account(NewAccount {
        username,
        email,
        credential: Credential::Local { password_hash },
        channel_name: input.channel_name,
        channel_description: input.channel_description,
        avatar_url: None,
      })
      .await?;

    info!(account_id = %account.account_id, "registered local account");
    Ok(account)
  }

  /// Authenticate a local account by email and password.
  ///
  /// All failure paths — unknown email, federated-only account, wrong
  /// password — collapse into `InvalidCredentials` after exactly one hash
  /// verification.
  pub async fn login(&self, email: &str, candidate: &str) -> Result<Account> {
    let email = validate::normalize_email(email);
    let account = self.store.find_by_email(&email).await?;

    // Only an *active* local credential is accepted; a dormant hash on a
    // federated account does not authenticate.
    let stored = account.as_ref().and_then(|a| match &a.credential {
      Credential::Local { password_hash } => Some(password_hash.clone()),
      Credential::Federated { .. } => None,
    });

    let subject = stored.as_deref().unwrap_or(&self.dummy_hash);
    let verified = password::verify(subject, candidate);

    match (account, stored) {
      (Some(account), Some(_)) if verified => Ok(account),
      _ => Err(Error::InvalidCredentials),
    }
  }

  /// Change the account's password, verifying the current one first.
  pub async fn change_password(
    &self,
    account_id: Uuid,
    current: &str,
    new: &str,
  ) -> Result<Account> {
    validate::validate_password(new)?;
    let account = self.get_account(account_id).await?;

    let Some(stored) = account.credential.password_hash() else {
      return Err(Error::PasswordRequired);
    };
    if !password::verify(stored, current) {
      return Err(Error::InvalidCredentials);
    }

    let password_hash = password::hash(new)?;
    let credential = match account.credential {
      Credential::Local { .. } => Credential::Local { password_hash },
      Credential::Federated { provider, subject_id, .. } => {
        Credential::Federated {
          provider,
          subject_id,
          password_hash: Some(password_hash),
        }
      }
    };
    self.store.update_credential(account_id, credential).await
  }

  // ── OAuth resolution ──────────────────────────────────────────────────────

  /// Resolve a normalized OAuth profile to exactly one account.
  ///
  /// In order: return the account already holding this `(provider,
  /// subject)` pair; else link a local account carrying the same email;
  /// else create a fresh federated account. Calling twice with the same
  /// pair never creates a second account.
  pub async fn resolve_oauth(&self, profile: OAuthProfile) -> Result<Account> {
    // Fast path: repeat login.
    if let Some(account) = self
      .store
      .find_by_provider(profile.provider, &profile.subject_id)
      .await?
    {
      debug!(account_id = %account.account_id, provider = %profile.provider,
             "repeat federated login");
      return Ok(account);
    }

    let email = match &profile.email {
      Some(e) => validate::normalize_email(e),
      None if profile.provider.email_optional() => format!(
        "{}_{}@placeholder.invalid",
        profile.provider, profile.subject_id
      ),
      None => return Err(Error::MissingEmail(profile.provider)),
    };

    // Link path: a local account already owns this email.
    if let Some(account) = self.store.find_by_email(&email).await? {
      return match account.credential {
        Credential::Local { password_hash } => {
          let linked = self
            .store
            .update_credential(
              account.account_id,
              Credential::Federated {
                provider:      profile.provider,
                subject_id:    profile.subject_id.clone(),
                password_hash: Some(password_hash),
              },
            )
            .await?;
          info!(account_id = %linked.account_id, provider = %profile.provider,
                "linked provider to existing local account");
          Ok(linked)
        }
        // Never overwrite an active link.
        Credential::Federated { .. } => Err(Error::ProviderConflict(email)),
      };
    }

    self.create_from_profile(&profile, email).await
  }

  /// Create a federated account with a synthesized unique username.
  async fn create_from_profile(
    &self,
    profile: &OAuthProfile,
    email: String,
  ) -> Result<Account> {
    let base = username::normalize_base(&profile.display_name);

    let mut attempt = 0;
    loop {
      let suffix_len = if attempt + 1 >= username::MAX_ATTEMPTS {
        username::SUFFIX_LEN_LONG
      } else {
        username::SUFFIX_LEN
      };
      let candidate = username::candidate(&base, suffix_len);
      let channel_name = if profile.display_name.trim().is_empty() {
        candidate.clone()
      } else {
        profile.display_name.clone()
      };

      let created = self
        .store
        .create_account(NewAccount {
          username: candidate,
          email: email.clone(),
          credential: Credential::Federated {
            provider:      profile.provider,
            subject_id:    profile.subject_id.clone(),
            password_hash: None,
          },
          channel_name,
          channel_description: None,
          avatar_url: profile.avatar_url.clone(),
        })
        .await;

      match created {
        Ok(account) => {
          info!(account_id = %account.account_id, provider = %profile.provider,
                "created federated account");
          return Ok(account);
        }
        Err(Error::UsernameTaken(_))
          if attempt + 1 < username::MAX_ATTEMPTS =>
        {
          attempt += 1;
        }
        // Lost a concurrent first-callback race: the winner's row exists
        // now, so return it instead of failing.
        Err(Error::AlreadyLinked(_)) => {
          return self
            .store
            .find_by_provider(profile.provider, &profile.subject_id)
            .await?
            .ok_or(Error::AlreadyLinked(profile.provider));
        }
        Err(e) => return Err(e),
      }
    }
  }

  // ── Provider linking ──────────────────────────────────────────────────────

  /// Attach a federated pair to an existing account.
  pub async fn link_provider(
    &self,
    account_id: Uuid,
    provider: Provider,
    subject_id: &str,
  ) -> Result<Account> {
    let account = self.get_account(account_id).await?;

    if let Some(existing) =
      self.store.find_by_provider(provider, subject_id).await?
    {
      if existing.account_id != account_id {
        return Err(Error::AlreadyLinked(provider));
      }
      // Already linked to this very account; nothing to do.
      return Ok(existing);
    }

    let dormant = account.credential.password_hash().map(str::to_owned);
    let linked = self
      .store
      .update_credential(
        account_id,
        Credential::Federated {
          provider,
          subject_id: subject_id.to_owned(),
          password_hash: dormant,
        },
      )
      .await?;
    info!(account_id = %account_id, provider = %provider, "linked provider");
    Ok(linked)
  }

  /// Detach the federated credential, restoring the dormant local password.
  pub async fn unlink_provider(&self, account_id: Uuid) -> Result<Account> {
    let account = self.get_account(account_id).await?;

    match account.credential {
      // Already local; unlinking is a no-op.
      Credential::Local { .. } => Ok(account),
      Credential::Federated { password_hash: Some(hash), provider, .. } => {
        let unlinked = self
          .store
          .update_credential(
            account_id,
            Credential::Local { password_hash: hash },
          )
          .await?;
        info!(account_id = %account_id, provider = %provider, "unlinked provider");
        Ok(unlinked)
      }
      // Unlinking would strand the account with no way to authenticate.
      Credential::Federated { password_hash: None, .. } => {
        Err(Error::PasswordRequired)
      }
    }
  }

  // ── Profile maintenance ───────────────────────────────────────────────────

  pub async fn update_profile(
    &self,
    account_id: Uuid,
    patch: ProfilePatch,
  ) -> Result<Account> {
    if let Some(name) = &patch.channel_name {
      validate::validate_channel_name(name)?;
    }
    validate::validate_channel_description(
      patch.channel_description.as_deref(),
    )?;
    self.store.update_profile(account_id, &patch).await
  }

  pub async fn get_account(&self, account_id: Uuid) -> Result<Account> {
    self
      .store
      .get_account(account_id)
      .await?
      .ok_or(Error::AccountNotFound(account_id))
  }
}
