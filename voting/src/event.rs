//! Events returned by mutating registry operations.

use crate::VoteId;
use nomvote_types::{Address, Wei};
use serde::{Deserialize, Serialize};

/// What a successful mutating operation did.
///
/// Field order matches the positional arguments callers read back, see
/// [`VoteEvent::args`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum VoteEvent {
    /// A vote instance was opened.
    VoteIsCreated { vote_id: VoteId },
    /// A fee-paying vote was accepted.
    VoterHasVoted {
        vote_id: VoteId,
        voter: Address,
        nominee: Address,
    },
    /// A vote was concluded and its winner fixed.
    VoteHasEnded {
        vote_id: VoteId,
        winner: Address,
        prize: Wei,
    },
    /// The owner took the commission of a concluded vote.
    Withdrawal {
        vote_id: VoteId,
        owner: Address,
        commission: Wei,
    },
}

impl VoteEvent {
    pub fn vote_id(&self) -> VoteId {
        match self {
            Self::VoteIsCreated { vote_id }
            | Self::VoterHasVoted { vote_id, .. }
            | Self::VoteHasEnded { vote_id, .. }
            | Self::Withdrawal { vote_id, .. } => *vote_id,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::VoteIsCreated { .. } => "VoteIsCreated",
            Self::VoterHasVoted { .. } => "VoterHasVoted",
            Self::VoteHasEnded { .. } => "VoteHasEnded",
            Self::Withdrawal { .. } => "Withdrawal",
        }
    }

    /// Positional arguments, in declaration order. Amounts are raw wei.
    pub fn args(&self) -> Vec<String> {
        match self {
            Self::VoteIsCreated { vote_id } => vec![vote_id.to_string()],
            Self::VoterHasVoted {
                vote_id,
                voter,
                nominee,
            } => vec![vote_id.to_string(), voter.to_string(), nominee.to_string()],
            Self::VoteHasEnded {
                vote_id,
                winner,
                prize,
            } => vec![vote_id.to_string(), winner.to_string(), prize.raw().to_string()],
            Self::Withdrawal {
                vote_id,
                owner,
                commission,
            } => vec![
                vote_id.to_string(),
                owner.to_string(),
                commission.raw().to_string(),
            ],
        }
    }
}
