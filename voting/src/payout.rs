//! Splitting a pool into prize and commission.

use crate::error::VotingError;
use crate::params::VotingParams;
use crate::VoteId;
use nomvote_types::Wei;
use serde::{Deserialize, Serialize};

/// How a pool divides between winner and owner.
///
/// Both shares are floor-divided independently, so
/// `prize + commission + remainder == pool` and the remainder is never paid out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub prize: Wei,
    pub commission: Wei,
    pub remainder: Wei,
}

/// Split `pool` according to `params`, each share the exact floor of `pool * pct / 100`.
pub fn split_pool(
    vote_id: VoteId,
    pool: Wei,
    params: &VotingParams,
) -> Result<Payout, VotingError> {
    let prize = pool
        .mul_div_floor(params.prize_share_pct.into(), 100)
        .ok_or(VotingError::Overflow(vote_id))?;
    let commission = pool
        .mul_div_floor(params.commission_share_pct.into(), 100)
        .ok_or(VotingError::Overflow(vote_id))?;
    let remainder = pool
        .checked_sub(prize)
        .and_then(|rest| rest.checked_sub(commission))
        .ok_or_else(|| {
            VotingError::InvalidParams("prize and commission exceed the pool".into())
        })?;
    Ok(Payout {
        prize,
        commission,
        remainder,
    })
}
