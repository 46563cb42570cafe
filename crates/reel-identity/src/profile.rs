//! Provider profile adapters.
//!
//! Every OAuth provider returns a differently-shaped profile document. One
//! pure adapter per provider maps that raw JSON into the single normalized
//! [`OAuthProfile`] before it reaches the resolver, so the resolver never
//! branches on provider-specific shapes. Adapters live in an explicit
//! [`AdapterRegistry`] built at startup and passed by reference — there is
//! no global strategy registry.

use reel_core::{Error, Result, account::Provider};
use serde_json::Value;

// ─── Normalized profile ──────────────────────────────────────────────────────

/// The single normalized shape every adapter produces.
#[derive(Debug, Clone)]
pub struct OAuthProfile {
  pub provider:     Provider,
  pub subject_id:   String,
  pub email:        Option<String>,
  pub display_name: String,
  pub avatar_url:   Option<String>,
}

// ─── Adapter trait ───────────────────────────────────────────────────────────

/// A pure mapping from one provider's raw profile JSON to [`OAuthProfile`].
pub trait ProviderAdapter: Send + Sync {
  fn provider(&self) -> Provider;

  /// Fails `Validation` when the payload lacks a subject id.
  fn normalize(&self, raw: &Value) -> Result<OAuthProfile>;
}

// ─── Field helpers ───────────────────────────────────────────────────────────

/// The subject id; providers disagree on whether it is a string or a number.
fn subject_id(provider: Provider, raw: &Value) -> Result<String> {
  match raw.get("id") {
    Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
    Some(Value::Number(n)) => Ok(n.to_string()),
    _ => Err(Error::Validation(format!("{provider} profile is missing id"))),
  }
}

fn str_field(raw: &Value, key: &str) -> Option<String> {
  raw
    .get(key)
    .and_then(Value::as_str)
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

/// First entry of the `emails: [{value}]` array shape providers share.
fn first_email(raw: &Value) -> Option<String> {
  raw
    .get("emails")?
    .get(0)?
    .get("value")?
    .as_str()
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

/// First entry of the `photos: [{value}]` array.
fn first_photo(raw: &Value) -> Option<String> {
  raw
    .get("photos")?
    .get(0)?
    .get("value")?
    .as_str()
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

fn email_local_part(email: &Option<String>) -> Option<String> {
  email
    .as_deref()
    .and_then(|e| e.split('@').next())
    .filter(|s| !s.is_empty())
    .map(str::to_owned)
}

// ─── Adapters ────────────────────────────────────────────────────────────────

pub struct GoogleAdapter;

impl ProviderAdapter for GoogleAdapter {
  fn provider(&self) -> Provider { Provider::Google }

  fn normalize(&self, raw: &Value) -> Result<OAuthProfile> {
    let subject_id = subject_id(Provider::Google, raw)?;
    let email = first_email(raw);
    let display_name = str_field(raw, "displayName")
      .or_else(|| email_local_part(&email))
      .unwrap_or_else(|| format!("user{subject_id}"));

    Ok(OAuthProfile {
      provider: Provider::Google,
      avatar_url: first_photo(raw),
      subject_id,
      email,
      display_name,
    })
  }
}

pub struct FacebookAdapter;

impl ProviderAdapter for FacebookAdapter {
  fn provider(&self) -> Provider { Provider::Facebook }

  fn normalize(&self, raw: &Value) -> Result<OAuthProfile> {
    let subject_id = subject_id(Provider::Facebook, raw)?;
    let email = first_email(raw);

    // Facebook splits the name into given/family parts.
    let name = raw.get("name");
    let given = name.and_then(|n| str_field(n, "givenName"));
    let family = name.and_then(|n| str_field(n, "familyName"));
    let joined = match (given, family) {
      (Some(g), Some(f)) => Some(format!("{g} {f}")),
      (Some(g), None) => Some(g),
      (None, Some(f)) => Some(f),
      (None, None) => None,
    };
    let display_name = joined
      .or_else(|| email_local_part(&email))
      .unwrap_or_else(|| format!("user{subject_id}"));

    Ok(OAuthProfile {
      provider: Provider::Facebook,
      avatar_url: first_photo(raw),
      subject_id,
      email,
      display_name,
    })
  }
}

pub struct GithubAdapter;

impl ProviderAdapter for GithubAdapter {
  fn provider(&self) -> Provider { Provider::Github }

  fn normalize(&self, raw: &Value) -> Result<OAuthProfile> {
    let subject_id = subject_id(Provider::Github, raw)?;
    let email = first_email(raw);
    let display_name = str_field(raw, "displayName")
      .or_else(|| str_field(raw, "username"))
      .or_else(|| email_local_part(&email))
      .unwrap_or_else(|| format!("user{subject_id}"));

    Ok(OAuthProfile {
      provider: Provider::Github,
      avatar_url: first_photo(raw),
      subject_id,
      email,
      display_name,
    })
  }
}

pub struct TwitterAdapter;

impl ProviderAdapter for TwitterAdapter {
  fn provider(&self) -> Provider { Provider::Twitter }

  fn normalize(&self, raw: &Value) -> Result<OAuthProfile> {
    let subject_id = subject_id(Provider::Twitter, raw)?;
    // Twitter frequently omits email entirely; the resolver substitutes a
    // placeholder rather than refusing the login.
    let email = first_email(raw);
    let display_name = str_field(raw, "displayName")
      .or_else(|| str_field(raw, "username"))
      .unwrap_or_else(|| format!("user{subject_id}"));

    Ok(OAuthProfile {
      provider: Provider::Twitter,
      avatar_url: first_photo(raw),
      subject_id,
      email,
      display_name,
    })
  }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// The adapter set, built once at startup and injected into whatever handles
/// OAuth callbacks.
pub struct AdapterRegistry {
  adapters: Vec<Box<dyn ProviderAdapter>>,
}

impl AdapterRegistry {
  /// Registry with all four built-in providers.
  pub fn with_builtin() -> Self {
    Self {
      adapters: vec![
        Box::new(GoogleAdapter),
        Box::new(FacebookAdapter),
        Box::new(GithubAdapter),
        Box::new(TwitterAdapter),
      ],
    }
  }

  pub fn get(&self, provider: Provider) -> Option<&dyn ProviderAdapter> {
    self
      .adapters
      .iter()
      .find(|a| a.provider() == provider)
      .map(|a| a.as_ref())
  }

  /// Normalize a raw profile with the matching adapter.
  pub fn normalize(&self, provider: Provider, raw: &Value) -> Result<OAuthProfile> {
    self
      .get(provider)
      .ok_or_else(|| {
        Error::Validation(format!("no adapter registered for {provider}"))
      })?
      .normalize(raw)
  }
}

impl Default for AdapterRegistry {
  fn default() -> Self { Self::with_builtin() }
}
