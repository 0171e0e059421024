//! Voting parameters and registry configuration.

use crate::error::VotingError;
use nomvote_types::{Address, Wei};
use serde::{Deserialize, Serialize};

/// Fixed fee per vote: 0.01 ether.
pub const FIXED_FEE: Wei = Wei::new(10_000_000_000_000_000);

/// Length of every vote instance: 3 days.
pub const VOTE_DURATION_SECS: u64 = 3 * 24 * 3600;

/// Share of the pool associated with the winner, in percent.
pub const PRIZE_SHARE_PCT: u8 = 90;

/// Share of the pool withdrawable by the owner, in percent.
pub const COMMISSION_SHARE_PCT: u8 = 10;

/// Parameters shared by every vote instance of a registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingParams {
    /// Exact amount a voter must pay; over- and under-payment are rejected.
    pub fee: Wei,
    /// How long after creation a vote may be concluded.
    pub duration_secs: u64,
    /// Prize share of the pool, floor-divided.
    pub prize_share_pct: u8,
    /// Commission share of the pool, floor-divided.
    pub commission_share_pct: u8,
}

impl VotingParams {
    pub fn validate(&self) -> Result<(), VotingError> {
        if self.duration_secs == 0 {
            return Err(VotingError::InvalidParams(
                "duration_secs must be non-zero".into(),
            ));
        }
        let total = u16::from(self.prize_share_pct) + u16::from(self.commission_share_pct);
        if total > 100 {
            return Err(VotingError::InvalidParams(format!(
                "prize and commission shares sum to {total}%, more than the pool"
            )));
        }
        Ok(())
    }
}

impl Default for VotingParams {
    fn default() -> Self {
        Self {
            fee: FIXED_FEE,
            duration_secs: VOTE_DURATION_SECS,
            prize_share_pct: PRIZE_SHARE_PCT,
            commission_share_pct: COMMISSION_SHARE_PCT,
        }
    }
}

/// Construction-time configuration of a [`crate::VoteRegistry`].
#[derive(Clone, Debug)]
pub struct RegistryConfig {
    /// The only identity allowed to create votes and withdraw commissions.
    pub owner: Address,
    pub params: VotingParams,
}

impl RegistryConfig {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            params: VotingParams::default(),
        }
    }
}
