//! Task runner for the nomination vote.
//!
//! Reads a TOML script of tasks (`add-voting`, `vote`, `finish`, `withdraw`
//! and the read-only queries), runs them against a fresh [`VoteRegistry`] and
//! prints what each one produced.
//!
//! [`VoteRegistry`]: nomvote_voting::VoteRegistry

pub mod config;
pub mod error;
pub mod runner;
pub mod script;

pub use config::CliConfig;
pub use error::CliError;
pub use runner::{OutputFormat, RunOptions, RunSummary, Runner};
pub use script::{Script, Task, TaskKind};
