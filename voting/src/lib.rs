//! Fee-gated, time-boxed nomination votes.
//!
//! The owner opens a vote instance; each participant pays a fixed fee to cast
//! exactly one vote for a nominee. Once the window (3 days by default) has
//! passed, anyone may conclude the instance: the plurality winner is fixed,
//! with ties going to the nominee that reached the top count first. The pool
//! splits 90% prize / 10% commission, floor-divided independently, and the
//! owner may withdraw the commission once.
//!
//! Mutating operations return a [`VoteEvent`] describing what happened.

pub mod error;
pub mod event;
pub mod instance;
pub mod params;
pub mod payout;
pub mod registry;
pub mod tally;

/// Identifier of a vote instance; dense, starting at 0.
pub type VoteId = u64;

pub use error::VotingError;
pub use event::VoteEvent;
pub use instance::VoteInstance;
pub use params::{RegistryConfig, VotingParams, FIXED_FEE, VOTE_DURATION_SECS};
pub use payout::{split_pool, Payout};
pub use registry::VoteRegistry;
pub use tally::first_max;
