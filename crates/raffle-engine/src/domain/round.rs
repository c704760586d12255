//! # Round State Machine
//!
//! The singleton [`Round`] entity cycling OPEN → CALCULATING → OPEN forever.
//!
//! ## Lifecycle
//!
//! 1. `record_entry` appends players while OPEN
//! 2. `close` flips to CALCULATING once the readiness predicate holds
//! 3. `record_request` pins the coordinator-assigned request id
//! 4. `settle` validates a fulfillment and picks the winner (no mutation)
//! 5. `commit_settlement` resets the round after the payout succeeded
//!
//! The settle/commit split is what makes payout and state reset
//! all-or-nothing: the service only commits after the ledger transfer went
//! through, so a rejected transfer leaves the round byte-for-byte as it was.
//!
//! ## Critical Invariants
//!
//! 1. Exactly one of OPEN / CALCULATING holds at any time
//! 2. A successful close implies non-empty players and positive balance
//! 3. Only the most recent unfulfilled request id is accepted for settlement
//! 4. After a committed settlement: players empty, balance zero, state OPEN

use super::{Address, RequestId};
use crate::error::RaffleError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Round state enumeration
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Accepting entries
    Open,
    /// Awaiting randomness; entries rejected
    Calculating,
}

/// Value of each readiness conjunct, plus the combined predicate.
///
/// All four must hold for the round to be eligible for closure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Readiness {
    /// Round state is Open
    pub is_open: bool,
    /// Configured interval has elapsed since the last close
    pub interval_elapsed: bool,
    /// At least one player is entered
    pub has_players: bool,
    /// Round balance is positive
    pub has_balance: bool,
}

impl Readiness {
    /// Combined predicate: true iff all four conjuncts hold
    pub fn ready(&self) -> bool {
        self.is_open && self.interval_elapsed && self.has_players && self.has_balance
    }
}

/// Outcome of a validated fulfillment, computed before any mutation
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settlement {
    /// Selected winner
    pub winner: Address,
    /// Index of the winner in the player list
    pub winner_index: usize,
    /// Full round balance owed to the winner
    pub prize: U256,
    /// Request id this settlement answers
    pub request_id: RequestId,
}

/// The raffle round: singleton state owned by the service
#[derive(Clone, Debug)]
pub struct Round {
    state: RoundState,
    entrance_fee: U256,
    interval_secs: u64,
    players: Vec<Address>,
    balance: U256,
    last_timestamp: u64,
    recent_winner: Option<Address>,
    pending_request: Option<RequestId>,
}

impl Round {
    /// Create a fresh open round.
    ///
    /// `now` seeds `last_timestamp`, so the first close becomes eligible
    /// `interval_secs` after construction.
    pub fn new(entrance_fee: U256, interval_secs: u64, now: u64) -> Self {
        Self {
            state: RoundState::Open,
            entrance_fee,
            interval_secs,
            players: Vec::new(),
            balance: U256::zero(),
            last_timestamp: now,
            recent_winner: None,
            pending_request: None,
        }
    }

    /// Record an entry: append the player and accrue the payment.
    ///
    /// The full sent amount accrues to the balance, so overpaying buys the
    /// same single entry (each appended identity is weighted equally).
    pub fn record_entry(&mut self, player: Address, amount: U256) -> Result<(), RaffleError> {
        if amount < self.entrance_fee {
            return Err(RaffleError::InsufficientPayment {
                sent: amount,
                required: self.entrance_fee,
            });
        }
        if self.state != RoundState::Open {
            return Err(RaffleError::RoundNotOpen);
        }
        self.players.push(player);
        self.balance += amount;
        Ok(())
    }

    /// Evaluate the four-conjunct readiness predicate at `now`
    pub fn readiness(&self, now: u64) -> Readiness {
        Readiness {
            is_open: self.state == RoundState::Open,
            interval_elapsed: now.saturating_sub(self.last_timestamp) >= self.interval_secs,
            has_players: !self.players.is_empty(),
            has_balance: self.balance > U256::zero(),
        }
    }

    /// Close entry: OPEN → CALCULATING, gated on the readiness predicate.
    ///
    /// A second close while CALCULATING fails the `is_open` conjunct, which
    /// is what makes duplicate randomness requests impossible.
    pub fn close(&mut self, now: u64) -> Result<(), RaffleError> {
        let readiness = self.readiness(now);
        if !readiness.ready() {
            return Err(RaffleError::UpkeepNotReady {
                is_open: readiness.is_open,
                interval_elapsed: readiness.interval_elapsed,
                has_players: readiness.has_players,
                has_balance: readiness.has_balance,
            });
        }
        self.state = RoundState::Calculating;
        Ok(())
    }

    /// Reopen after a failed randomness request, undoing `close`.
    ///
    /// Only valid while no request id has been recorded.
    pub fn abort_close(&mut self) {
        debug_assert!(self.pending_request.is_none());
        self.state = RoundState::Open;
    }

    /// Pin the coordinator-assigned id of the outstanding request
    pub fn record_request(&mut self, request_id: RequestId) {
        self.pending_request = Some(request_id);
    }

    /// Validate a fulfillment and select the winner without mutating.
    ///
    /// Rejects ids that were never issued as well as ids already fulfilled;
    /// both fail the single pending-request comparison.
    pub fn settle(
        &self,
        request_id: RequestId,
        random_word: U256,
    ) -> Result<Settlement, RaffleError> {
        if self.pending_request != Some(request_id) {
            return Err(RaffleError::UnknownRequest { request_id });
        }
        // Non-empty players is guaranteed by the close gating.
        let winner_index = (random_word % U256::from(self.players.len())).as_usize();
        Ok(Settlement {
            winner: self.players[winner_index],
            winner_index,
            prize: self.balance,
            request_id,
        })
    }

    /// Reset the round after a successful payout: CALCULATING → OPEN,
    /// players cleared, balance zeroed, timestamp refreshed.
    pub fn commit_settlement(&mut self, settlement: &Settlement, now: u64) {
        self.recent_winner = Some(settlement.winner);
        self.players.clear();
        self.balance = U256::zero();
        self.pending_request = None;
        self.state = RoundState::Open;
        self.last_timestamp = now;
    }

    /// Current state
    pub fn state(&self) -> RoundState {
        self.state
    }

    /// Fixed entrance fee
    pub fn entrance_fee(&self) -> U256 {
        self.entrance_fee
    }

    /// Minimum open duration in seconds
    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    /// Current round balance
    pub fn balance(&self) -> U256 {
        self.balance
    }

    /// Time of the last close (or construction)
    pub fn last_timestamp(&self) -> u64 {
        self.last_timestamp
    }

    /// Most recently paid winner, if any
    pub fn recent_winner(&self) -> Option<Address> {
        self.recent_winner
    }

    /// Outstanding randomness request id, if any
    pub fn pending_request(&self) -> Option<RequestId> {
        self.pending_request
    }

    /// Player at index `index`
    pub fn player(&self, index: usize) -> Result<Address, RaffleError> {
        self.players
            .get(index)
            .copied()
            .ok_or(RaffleError::IndexOutOfRange {
                index,
                count: self.players.len(),
            })
    }

    /// Number of entries in the current round
    pub fn player_count(&self) -> usize {
        self.players.len()
    }
}
