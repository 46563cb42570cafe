//! Engagement bookkeeping for the Reel platform.
//!
//! Owns the like/dislike and subscription toggle surface and keeps the
//! denormalized counters on videos and channels exactly consistent with the
//! underlying fact tables. All counter arithmetic happens inside the store's
//! transactions; this layer adds the guards and the typed surface.

pub mod ledger;

pub use ledger::EngagementLedger;

#[cfg(test)]
mod tests;
