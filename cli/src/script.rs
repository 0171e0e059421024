//! Task scripts: an ordered list of `[[task]]` tables in TOML.
//!
//! ```toml
//! [[task]]
//! kind = "add-voting"
//!
//! [[task]]
//! kind = "vote"
//! from = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
//! voteid = 0
//! nominee = "0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc"
//! fee = "0.01eth"
//! ```

use nomvote_types::{Address, Wei};
use nomvote_voting::VoteId;
use serde::Deserialize;
use std::path::Path;

use crate::CliError;

/// What a task does.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TaskKind {
    /// Open a new vote (owner only).
    AddVoting,
    /// Pay `fee` to vote for `nominee`.
    Vote {
        voteid: VoteId,
        nominee: Address,
        fee: Wei,
    },
    /// Conclude the vote.
    Finish { voteid: VoteId },
    /// Withdraw the commission (owner only).
    Withdraw { voteid: VoteId },
    GetParticipants { voteid: VoteId },
    GetWinner { voteid: VoteId },
    GetIsActive { voteid: VoteId },
    GetTimeRemaining { voteid: VoteId },
    /// Print the full instance as JSON.
    Status { voteid: VoteId },
    /// Move the clock forward. Local network only.
    Advance { secs: u64 },
}

impl TaskKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddVoting => "add-voting",
            Self::Vote { .. } => "vote",
            Self::Finish { .. } => "finish",
            Self::Withdraw { .. } => "withdraw",
            Self::GetParticipants { .. } => "get-participants",
            Self::GetWinner { .. } => "get-winner",
            Self::GetIsActive { .. } => "get-is-active",
            Self::GetTimeRemaining { .. } => "get-time-remaining",
            Self::Status { .. } => "status",
            Self::Advance { .. } => "advance",
        }
    }
}

/// One step of a script.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Task {
    /// Caller identity; the configured owner when absent.
    #[serde(default)]
    pub from: Option<Address>,
    #[serde(flatten)]
    pub kind: TaskKind,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Script {
    #[serde(default, rename = "task")]
    pub tasks: Vec<Task>,
}

impl Script {
    pub fn from_toml_str(s: &str) -> Result<Self, CliError> {
        toml::from_str(s).map_err(|e| CliError::Script(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| CliError::Script(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Whether any task moves the clock.
    pub fn advances_time(&self) -> bool {
        self.tasks
            .iter()
            .any(|t| matches!(t.kind, TaskKind::Advance { .. }))
    }
}
