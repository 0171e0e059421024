//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies are abstracted behind traits in `nomvote-types`.
//! This crate provides test-friendly implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//!
//! Usage: swap the system clock for [`NullClock`] in tests, or on a local
//! network where time is advanced by hand.

pub mod clock;

pub use clock::NullClock;
