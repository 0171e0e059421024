//! The vote registry. Owns every vote instance and serializes access to each.

use crate::error::VotingError;
use crate::event::VoteEvent;
use crate::instance::VoteInstance;
use crate::params::{RegistryConfig, VotingParams};
use crate::payout::{split_pool, Payout};
use crate::VoteId;
use nomvote_types::{Address, Clock, Wei};
use nomvote_utils::format_duration;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Holds zero or more vote instances, identified by dense ids from 0.
///
/// Operations on one instance are serialized by that instance's lock;
/// different instances proceed independently. Instances are never removed.
pub struct VoteRegistry {
    owner: Address,
    params: VotingParams,
    clock: Arc<dyn Clock>,
    votes: RwLock<Vec<Arc<Mutex<VoteInstance>>>>,
}

impl VoteRegistry {
    pub fn new(config: RegistryConfig, clock: Arc<dyn Clock>) -> Result<Self, VotingError> {
        config.params.validate()?;
        info!(
            owner = %config.owner,
            fee = %config.params.fee,
            window = %format_duration(config.params.duration_secs),
            "vote registry ready"
        );
        Ok(Self {
            owner: config.owner,
            params: config.params,
            clock,
            votes: RwLock::new(Vec::new()),
        })
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    pub fn params(&self) -> &VotingParams {
        &self.params
    }

    /// The id the next [`create`](Self::create) will allocate.
    pub fn next_vote_id(&self) -> VoteId {
        let votes = self.votes.read().unwrap_or_else(PoisonError::into_inner);
        votes.len() as VoteId
    }

    /// Open a new vote instance. Owner only.
    pub fn create(&self, caller: &Address) -> Result<VoteEvent, VotingError> {
        self.ensure_owner(caller)
            .inspect_err(|e| warn!(%caller, "create rejected: {e}"))?;

        let mut votes = self.votes.write().unwrap_or_else(PoisonError::into_inner);
        let vote_id = votes.len() as VoteId;
        let start_time = self.clock.now();
        votes.push(Arc::new(Mutex::new(VoteInstance::new(
            vote_id,
            start_time,
            self.params.duration_secs,
        ))));
        drop(votes);

        info!(vote_id, %start_time, "vote created");
        Ok(VoteEvent::VoteIsCreated { vote_id })
    }

    /// Cast `caller`'s single vote for `nominee`, paying exactly the fixed fee.
    pub fn cast_vote(
        &self,
        caller: &Address,
        vote_id: VoteId,
        nominee: &Address,
        paid: Wei,
    ) -> Result<VoteEvent, VotingError> {
        self.with_instance(vote_id, |vote| {
            vote.record_vote(*caller, *nominee, paid, &self.params)
        })
        .inspect_err(|e| warn!(vote_id, voter = %caller, "vote rejected: {e}"))?;

        debug!(vote_id, voter = %caller, %nominee, "vote cast");
        Ok(VoteEvent::VoterHasVoted {
            vote_id,
            voter: *caller,
            nominee: *nominee,
        })
    }

    /// Close the vote and fix its winner. Anyone may call this once the
    /// window has elapsed.
    pub fn conclude(&self, caller: &Address, vote_id: VoteId) -> Result<VoteEvent, VotingError> {
        let (winner, prize) = self
            .with_instance(vote_id, |vote| vote.conclude(self.clock.now(), &self.params))
            .inspect_err(|e| warn!(vote_id, %caller, "conclude rejected: {e}"))?;

        info!(vote_id, %caller, %winner, %prize, "vote concluded");
        Ok(VoteEvent::VoteHasEnded {
            vote_id,
            winner,
            prize,
        })
    }

    /// Take the commission of a concluded vote. Owner only, at most once.
    pub fn withdraw(&self, caller: &Address, vote_id: VoteId) -> Result<VoteEvent, VotingError> {
        let commission = self
            .ensure_owner(caller)
            .and_then(|()| self.with_instance(vote_id, |vote| vote.withdraw(&self.params)))
            .inspect_err(|e| warn!(vote_id, %caller, "withdraw rejected: {e}"))?;

        info!(vote_id, owner = %self.owner, %commission, "commission withdrawn");
        Ok(VoteEvent::Withdrawal {
            vote_id,
            owner: self.owner,
            commission,
        })
    }

    /// Everyone who voted, in voting order.
    pub fn participants(&self, vote_id: VoteId) -> Result<Vec<Address>, VotingError> {
        self.read(vote_id, |vote| vote.participants.clone())
    }

    /// The winner, or the null address before conclusion.
    pub fn winner(&self, vote_id: VoteId) -> Result<Address, VotingError> {
        self.read(vote_id, |vote| vote.winner)
    }

    pub fn is_active(&self, vote_id: VoteId) -> Result<bool, VotingError> {
        self.read(vote_id, VoteInstance::is_active)
    }

    /// Seconds until the vote may be concluded; zero once the window has passed.
    pub fn time_remaining(&self, vote_id: VoteId) -> Result<u64, VotingError> {
        self.read(vote_id, |vote| vote.time_remaining(self.clock.now()))
    }

    /// A consistent copy of the instance.
    pub fn snapshot(&self, vote_id: VoteId) -> Result<VoteInstance, VotingError> {
        self.read(vote_id, VoteInstance::clone)
    }

    /// How the instance's current pool would be split.
    pub fn payout(&self, vote_id: VoteId) -> Result<Payout, VotingError> {
        let pool = self.read(vote_id, |vote| vote.pool)?;
        split_pool(vote_id, pool, &self.params)
    }

    fn ensure_owner(&self, caller: &Address) -> Result<(), VotingError> {
        if *caller != self.owner {
            return Err(VotingError::Unauthorized(*caller));
        }
        Ok(())
    }

    fn instance(&self, vote_id: VoteId) -> Result<Arc<Mutex<VoteInstance>>, VotingError> {
        let votes = self.votes.read().unwrap_or_else(PoisonError::into_inner);
        usize::try_from(vote_id)
            .ok()
            .and_then(|index| votes.get(index))
            .cloned()
            .ok_or(VotingError::NotFound(vote_id))
    }

    fn with_instance<R>(
        &self,
        vote_id: VoteId,
        f: impl FnOnce(&mut VoteInstance) -> Result<R, VotingError>,
    ) -> Result<R, VotingError> {
        let handle = self.instance(vote_id)?;
        let mut vote = handle.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut vote)
    }

    fn read<R>(&self, vote_id: VoteId, f: impl FnOnce(&VoteInstance) -> R) -> Result<R, VotingError> {
        self.with_instance(vote_id, |vote| Ok(f(vote)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nomvote_nullables::NullClock;
    use nomvote_types::Timestamp;

    const START: u64 = 1_700_000_000;
    const THREE_DAYS: u64 = 3 * 24 * 3600;

    fn addr(seed: u8) -> Address {
        Address::new([seed; 20])
    }

    fn owner() -> Address {
        addr(0xAA)
    }

    fn setup() -> (Arc<NullClock>, VoteRegistry) {
        let clock = Arc::new(NullClock::new(START));
        let registry = VoteRegistry::new(RegistryConfig::new(owner()), clock.clone()).unwrap();
        (clock, registry)
    }

    fn fee() -> Wei {
        VotingParams::default().fee
    }

    // ── create ──────────────────────────────────────────────────────────

    #[test]
    fn create_allocates_dense_ids() {
        let (_, registry) = setup();
        assert_eq!(registry.next_vote_id(), 0);
        assert_eq!(
            registry.create(&owner()).unwrap(),
            VoteEvent::VoteIsCreated { vote_id: 0 }
        );
        assert_eq!(registry.create(&owner()).unwrap().vote_id(), 1);
        assert_eq!(registry.next_vote_id(), 2);

        let vote = registry.snapshot(1).unwrap();
        assert_eq!(vote.start_time, Timestamp::new(START));
        assert_eq!(vote.duration_secs, THREE_DAYS);
        assert_eq!(vote.winner, Address::ZERO);
        assert!(!vote.concluded && !vote.withdrawn);
    }

    #[test]
    fn create_is_owner_only() {
        let (_, registry) = setup();
        assert_eq!(
            registry.create(&addr(1)).unwrap_err(),
            VotingError::Unauthorized(addr(1))
        );
        assert_eq!(registry.next_vote_id(), 0);
    }

    #[test]
    fn invalid_params_are_rejected_at_construction() {
        let config = RegistryConfig {
            owner: owner(),
            params: VotingParams {
                commission_share_pct: 11,
                ..Default::default()
            },
        };
        let result = VoteRegistry::new(config, Arc::new(NullClock::new(0)));
        assert!(matches!(result, Err(VotingError::InvalidParams(_))));
    }

    // ── cast_vote ───────────────────────────────────────────────────────

    #[test]
    fn vote_on_missing_instance_is_not_found() {
        let (_, registry) = setup();
        assert_eq!(
            registry.cast_vote(&addr(1), 0, &addr(2), fee()).unwrap_err(),
            VotingError::NotFound(0)
        );
        assert_eq!(
            registry
                .cast_vote(&addr(1), u64::MAX, &addr(2), fee())
                .unwrap_err(),
            VotingError::NotFound(u64::MAX)
        );
    }

    #[test]
    fn vote_emits_positional_event() {
        let (_, registry) = setup();
        registry.create(&owner()).unwrap();
        let event = registry.cast_vote(&addr(1), 0, &addr(2), fee()).unwrap();
        assert_eq!(
            event,
            VoteEvent::VoterHasVoted {
                vote_id: 0,
                voter: addr(1),
                nominee: addr(2),
            }
        );
        assert_eq!(registry.participants(0).unwrap(), vec![addr(1)]);
    }

    #[test]
    fn wrong_fee_is_rejected_both_ways() {
        let (_, registry) = setup();
        registry.create(&owner()).unwrap();
        for paid in [Wei::ZERO, Wei::new(fee().raw() - 1), Wei::new(fee().raw() + 1)] {
            assert_eq!(
                registry.cast_vote(&addr(1), 0, &addr(2), paid).unwrap_err(),
                VotingError::WrongFee {
                    paid,
                    required: fee()
                }
            );
        }
        assert!(registry.participants(0).unwrap().is_empty());
        assert_eq!(registry.snapshot(0).unwrap().pool, Wei::ZERO);
    }

    #[test]
    fn second_vote_from_same_voter_is_duplicate() {
        let (_, registry) = setup();
        registry.create(&owner()).unwrap();
        registry.cast_vote(&addr(1), 0, &addr(2), fee()).unwrap();
        assert_eq!(
            registry.cast_vote(&addr(1), 0, &addr(3), fee()).unwrap_err(),
            VotingError::DuplicateVote {
                vote_id: 0,
                voter: addr(1)
            }
        );
    }

    #[test]
    fn voters_are_tracked_per_instance() {
        let (_, registry) = setup();
        registry.create(&owner()).unwrap();
        registry.create(&owner()).unwrap();
        registry.cast_vote(&addr(1), 0, &addr(2), fee()).unwrap();
        registry.cast_vote(&addr(1), 1, &addr(2), fee()).unwrap();
        assert_eq!(registry.participants(1).unwrap(), vec![addr(1)]);
    }

    #[test]
    fn late_votes_are_accepted_until_concluded() {
        let (clock, registry) = setup();
        registry.create(&owner()).unwrap();
        clock.advance(THREE_DAYS * 2);
        assert_eq!(registry.time_remaining(0).unwrap(), 0);
        registry.cast_vote(&addr(1), 0, &addr(2), fee()).unwrap();

        registry.conclude(&addr(5), 0).unwrap();
        assert_eq!(
            registry.cast_vote(&addr(3), 0, &addr(2), fee()).unwrap_err(),
            VotingError::VotingClosed(0)
        );
    }

    // ── conclude ────────────────────────────────────────────────────────

    #[test]
    fn conclude_before_window_is_too_early() {
        let (clock, registry) = setup();
        registry.create(&owner()).unwrap();
        clock.advance(THREE_DAYS - 10);
        assert_eq!(
            registry.conclude(&addr(1), 0).unwrap_err(),
            VotingError::TooEarly {
                vote_id: 0,
                remaining_secs: 10
            }
        );
        assert!(registry.is_active(0).unwrap());
    }

    #[test]
    fn conclude_twice_is_closed() {
        let (clock, registry) = setup();
        registry.create(&owner()).unwrap();
        clock.advance(THREE_DAYS);
        registry.conclude(&addr(1), 0).unwrap();
        assert_eq!(
            registry.conclude(&addr(1), 0).unwrap_err(),
            VotingError::VotingClosed(0)
        );
    }

    #[test]
    fn tie_goes_to_nominee_who_got_there_first() {
        let (clock, registry) = setup();
        registry.create(&owner()).unwrap();
        let (a, b) = (addr(0xA1), addr(0xB2));
        registry.cast_vote(&addr(1), 0, &a, fee()).unwrap();
        registry.cast_vote(&addr(2), 0, &b, fee()).unwrap();
        registry.cast_vote(&addr(3), 0, &b, fee()).unwrap();
        registry.cast_vote(&addr(4), 0, &a, fee()).unwrap();

        assert_eq!(registry.winner(0).unwrap(), Address::ZERO);
        clock.advance(THREE_DAYS);
        let event = registry.conclude(&addr(9), 0).unwrap();
        assert!(matches!(event, VoteEvent::VoteHasEnded { winner, .. } if winner == a));
        assert_eq!(registry.winner(0).unwrap(), a);
    }

    #[test]
    fn empty_vote_concludes_with_null_winner() {
        let (clock, registry) = setup();
        registry.create(&owner()).unwrap();
        clock.advance(THREE_DAYS);
        assert_eq!(
            registry.conclude(&addr(1), 0).unwrap(),
            VoteEvent::VoteHasEnded {
                vote_id: 0,
                winner: Address::ZERO,
                prize: Wei::ZERO,
            }
        );
    }

    // ── withdraw ────────────────────────────────────────────────────────

    #[test]
    fn withdraw_is_owner_only() {
        let (clock, registry) = setup();
        registry.create(&owner()).unwrap();
        clock.advance(THREE_DAYS);
        registry.conclude(&addr(1), 0).unwrap();
        assert_eq!(
            registry.withdraw(&addr(1), 0).unwrap_err(),
            VotingError::Unauthorized(addr(1))
        );
        assert!(!registry.snapshot(0).unwrap().withdrawn);
    }

    #[test]
    fn withdraw_before_conclusion_fails() {
        let (_, registry) = setup();
        registry.create(&owner()).unwrap();
        assert_eq!(
            registry.withdraw(&owner(), 0).unwrap_err(),
            VotingError::NotYetConcluded(0)
        );
        assert_eq!(
            registry.withdraw(&owner(), 3).unwrap_err(),
            VotingError::NotFound(3)
        );
    }

    #[test]
    fn huge_fee_vote_still_concludes_and_pays_out() {
        let clock = Arc::new(NullClock::new(START));
        let config = RegistryConfig {
            owner: owner(),
            params: VotingParams {
                fee: Wei::new(10u128.pow(37)),
                ..Default::default()
            },
        };
        let registry = VoteRegistry::new(config, clock.clone()).unwrap();
        registry.create(&owner()).unwrap();
        registry
            .cast_vote(&addr(1), 0, &addr(2), Wei::new(10u128.pow(37)))
            .unwrap();

        clock.advance(THREE_DAYS * 10);
        assert_eq!(
            registry.conclude(&addr(1), 0).unwrap(),
            VoteEvent::VoteHasEnded {
                vote_id: 0,
                winner: addr(2),
                prize: Wei::new(9 * 10u128.pow(36)),
            }
        );
        assert!(!registry.is_active(0).unwrap());
        assert_eq!(
            registry
                .cast_vote(&addr(3), 0, &addr(2), Wei::new(10u128.pow(37)))
                .unwrap_err(),
            VotingError::VotingClosed(0)
        );
        assert!(matches!(
            registry.withdraw(&owner(), 0).unwrap(),
            VoteEvent::Withdrawal { commission, .. } if commission == Wei::new(10u128.pow(36))
        ));
    }

    // ── end to end ──────────────────────────────────────────────────────

    #[test]
    fn full_lifecycle_pays_ninety_ten() {
        let (clock, registry) = setup();
        let (a, b) = (addr(0xA1), addr(0xB2));
        let vote_id = registry.create(&owner()).unwrap().vote_id();
        registry.cast_vote(&addr(1), vote_id, &a, fee()).unwrap();
        registry.cast_vote(&addr(2), vote_id, &a, fee()).unwrap();
        registry.cast_vote(&addr(3), vote_id, &b, fee()).unwrap();

        let snapshot = registry.snapshot(vote_id).unwrap();
        assert_eq!(snapshot.total_votes(), snapshot.participants.len() as u64);
        assert_eq!(snapshot.pool, Wei::new(30_000_000_000_000_000));

        clock.advance(THREE_DAYS + 1);
        assert_eq!(
            registry.conclude(&addr(7), vote_id).unwrap(),
            VoteEvent::VoteHasEnded {
                vote_id,
                winner: a,
                prize: Wei::new(27_000_000_000_000_000),
            }
        );
        assert!(!registry.is_active(vote_id).unwrap());

        assert_eq!(
            registry.withdraw(&owner(), vote_id).unwrap(),
            VoteEvent::Withdrawal {
                vote_id,
                owner: owner(),
                commission: Wei::new(3_000_000_000_000_000),
            }
        );
        assert_eq!(
            registry.withdraw(&owner(), vote_id).unwrap_err(),
            VotingError::AlreadyWithdrawn(vote_id)
        );

        let payout = registry.payout(vote_id).unwrap();
        assert!(payout.prize.raw() + payout.commission.raw() <= snapshot.pool.raw());
    }

    #[test]
    fn time_remaining_counts_down_and_clamps() {
        let (clock, registry) = setup();
        registry.create(&owner()).unwrap();
        assert_eq!(registry.time_remaining(0).unwrap(), THREE_DAYS);
        clock.advance(3600);
        assert_eq!(registry.time_remaining(0).unwrap(), THREE_DAYS - 3600);
        clock.set(u64::MAX);
        assert_eq!(registry.time_remaining(0).unwrap(), 0);
        assert_eq!(registry.time_remaining(1).unwrap_err(), VotingError::NotFound(1));
    }

    #[test]
    fn concurrent_voters_are_all_recorded() {
        let (_, registry) = setup();
        registry.create(&owner()).unwrap();
        registry.create(&owner()).unwrap();

        std::thread::scope(|s| {
            for seed in 1..=32u8 {
                let registry = &registry;
                s.spawn(move || {
                    let vote_id = u64::from(seed % 2);
                    registry
                        .cast_vote(&addr(seed), vote_id, &addr(seed % 3), fee())
                        .unwrap();
                });
            }
        });

        for vote_id in 0..2 {
            let vote = registry.snapshot(vote_id).unwrap();
            assert_eq!(vote.participants.len(), 16);
            assert_eq!(vote.total_votes(), 16);
            assert_eq!(vote.pool, fee().checked_mul(16).unwrap());
        }
    }

    #[test]
    fn racing_conclude_and_withdraw_succeed_exactly_once() {
        let (clock, registry) = setup();
        registry.create(&owner()).unwrap();
        registry.cast_vote(&addr(1), 0, &addr(2), fee()).unwrap();
        clock.advance(THREE_DAYS);

        let concluded: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8u8)
                .map(|seed| {
                    let registry = &registry;
                    s.spawn(move || registry.conclude(&addr(seed), 0))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(concluded.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(concluded
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| *e == VotingError::VotingClosed(0)));

        let withdrawn: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let registry = &registry;
                    s.spawn(move || registry.withdraw(&owner(), 0))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let ok: Vec<_> = withdrawn.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(ok.len(), 1);
        assert!(matches!(ok[0], VoteEvent::Withdrawal { vote_id: 0, .. }));
        assert_eq!(
            withdrawn
                .iter()
                .filter(|r| **r == Err(VotingError::AlreadyWithdrawn(0)))
                .count(),
            7
        );
        assert!(registry.snapshot(0).unwrap().withdrawn);
    }
}
