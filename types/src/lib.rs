//! Fundamental types for the nomination vote.
//!
//! This crate defines the primitives shared across every other crate in the
//! workspace: addresses, amounts, timestamps, the clock abstraction, and the
//! network identifier.

pub mod address;
pub mod amount;
pub mod error;
pub mod network;
pub mod time;

pub use address::Address;
pub use amount::Wei;
pub use error::TypesError;
pub use network::Network;
pub use time::{Clock, SystemClock, Timestamp};
