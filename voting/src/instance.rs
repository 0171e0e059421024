//! A single vote instance and its state transitions.
//!
//! Every transition validates first and writes last: a rejected call leaves
//! the instance exactly as it was.

use crate::error::VotingError;
use crate::params::VotingParams;
use crate::payout::split_pool;
use crate::tally::first_max;
use crate::VoteId;
use nomvote_types::{Address, Timestamp, Wei};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// One fee-gated nomination vote.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VoteInstance {
    /// Position in the registry.
    pub id: VoteId,
    /// When the instance was created.
    pub start_time: Timestamp,
    /// Seconds after `start_time` before the vote may be concluded.
    pub duration_secs: u64,
    /// Every nominee that received a vote, in first-vote order.
    pub nominees: Vec<Address>,
    pub vote_counts: BTreeMap<Address, u64>,
    pub has_voted: BTreeSet<Address>,
    /// Voters in the order they voted.
    pub participants: Vec<Address>,
    /// Fees collected so far.
    pub pool: Wei,
    pub concluded: bool,
    /// Null address until concluded.
    pub winner: Address,
    /// Whether the owner has taken the commission.
    pub withdrawn: bool,
}

impl VoteInstance {
    pub fn new(id: VoteId, start_time: Timestamp, duration_secs: u64) -> Self {
        Self {
            id,
            start_time,
            duration_secs,
            nominees: Vec::new(),
            vote_counts: BTreeMap::new(),
            has_voted: BTreeSet::new(),
            participants: Vec::new(),
            pool: Wei::ZERO,
            concluded: false,
            winner: Address::ZERO,
            withdrawn: false,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.concluded
    }

    pub fn vote_count(&self, nominee: &Address) -> u64 {
        self.vote_counts.get(nominee).copied().unwrap_or(0)
    }

    pub fn total_votes(&self) -> u64 {
        self.vote_counts.values().sum()
    }

    /// Seconds until the vote may be concluded, zero once the window has passed.
    pub fn time_remaining(&self, now: Timestamp) -> u64 {
        self.start_time.remaining(self.duration_secs, now)
    }

    /// Accept one vote from `voter` for `nominee`.
    ///
    /// Checks, in order: not concluded, voter has not voted, fee is exact.
    /// Votes after the window but before conclusion are accepted.
    pub(crate) fn record_vote(
        &mut self,
        voter: Address,
        nominee: Address,
        paid: Wei,
        params: &VotingParams,
    ) -> Result<(), VotingError> {
        if self.concluded {
            return Err(VotingError::VotingClosed(self.id));
        }
        if self.has_voted.contains(&voter) {
            return Err(VotingError::DuplicateVote {
                vote_id: self.id,
                voter,
            });
        }
        if paid != params.fee {
            return Err(VotingError::WrongFee {
                paid,
                required: params.fee,
            });
        }
        let pool = self
            .pool
            .checked_add(params.fee)
            .ok_or(VotingError::Overflow(self.id))?;
        let count = self
            .vote_count(&nominee)
            .checked_add(1)
            .ok_or(VotingError::Overflow(self.id))?;

        self.has_voted.insert(voter);
        self.participants.push(voter);
        if count == 1 {
            self.nominees.push(nominee);
        }
        self.vote_counts.insert(nominee, count);
        self.pool = pool;
        Ok(())
    }

    /// Fix the winner and close the vote. Returns the winner and the prize.
    pub(crate) fn conclude(
        &mut self,
        now: Timestamp,
        params: &VotingParams,
    ) -> Result<(Address, Wei), VotingError> {
        if self.concluded {
            return Err(VotingError::VotingClosed(self.id));
        }
        if !self.start_time.has_expired(self.duration_secs, now) {
            return Err(VotingError::TooEarly {
                vote_id: self.id,
                remaining_secs: self.time_remaining(now),
            });
        }
        let payout = split_pool(self.id, self.pool, params)?;
        let winner = first_max(self.nominees.iter().map(|n| (*n, self.vote_count(n))))
            .map(|(nominee, _)| nominee)
            .unwrap_or(Address::ZERO);

        self.concluded = true;
        self.winner = winner;
        Ok((winner, payout.prize))
    }

    /// Mark the commission as taken. Returns the commission.
    pub(crate) fn withdraw(&mut self, params: &VotingParams) -> Result<Wei, VotingError> {
        if !self.concluded {
            return Err(VotingError::NotYetConcluded(self.id));
        }
        if self.withdrawn {
            return Err(VotingError::AlreadyWithdrawn(self.id));
        }
        let payout = split_pool(self.id, self.pool, params)?;
        self.withdrawn = true;
        Ok(payout.commission)
    }
}
