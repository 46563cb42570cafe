//! Domain types for Reel's identity & engagement core: accounts and
//! credentials, engagement facts and the toggle transition table, the error
//! taxonomy, and the [`store::PlatformStore`] abstraction over storage
//! backends.
//!
//! Deliberately free of HTTP and database dependencies; every other crate
//! depends on this one.

pub mod account;
pub mod engagement;
pub mod error;
pub mod store;
pub mod validate;
pub mod video;

pub use error::{Error, ErrorKind, Result};
