//! Identity resolution for the Reel platform.
//!
//! Maps a credential assertion — a password pair or a normalized OAuth
//! profile — to exactly one account, and owns the account-creation and
//! provider-linking policy. Transport, sessions, and token minting are the
//! caller's responsibility.

pub mod password;
pub mod profile;
pub mod resolver;
pub mod username;

pub use profile::{AdapterRegistry, OAuthProfile, ProviderAdapter};
pub use resolver::{IdentityResolver, NewRegistration};

#[cfg(test)]
mod tests;
