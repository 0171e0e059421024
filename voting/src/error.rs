use nomvote_types::{Address, Wei};
use thiserror::Error;

use crate::VoteId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum VotingError {
    #[error("caller {0} is not the registry owner")]
    Unauthorized(Address),

    #[error("vote {0} not found")]
    NotFound(VoteId),

    #[error("vote {0} is closed")]
    VotingClosed(VoteId),

    #[error("{voter} has already voted in vote {vote_id}")]
    DuplicateVote { vote_id: VoteId, voter: Address },

    #[error("wrong fee: paid {paid}, required exactly {required}")]
    WrongFee { paid: Wei, required: Wei },

    #[error("vote {vote_id} cannot be concluded yet: {remaining_secs}s remaining")]
    TooEarly { vote_id: VoteId, remaining_secs: u64 },

    #[error("vote {0} has not been concluded")]
    NotYetConcluded(VoteId),

    #[error("commission for vote {0} has already been withdrawn")]
    AlreadyWithdrawn(VoteId),

    #[error("arithmetic overflow in vote {0}")]
    Overflow(VoteId),

    #[error("invalid voting parameters: {0}")]
    InvalidParams(String),
}
