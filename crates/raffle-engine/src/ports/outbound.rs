//! Outbound ports (driven side - SPI)

use crate::domain::{Address, RequestId};
use crate::error::CoordinatorError;
use crate::events::RaffleEvent;
use async_trait::async_trait;
use primitive_types::{H256, U256};
use thiserror::Error;

/// A randomness request handed to the coordinator on round closure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomnessRequest {
    /// Gas-lane key hash (price tier)
    pub gas_lane: H256,

    /// Funded subscription the request is billed to
    pub subscription_id: u64,

    /// Confirmations the coordinator waits before responding
    pub min_confirmations: u16,

    /// Gas budget for the fulfillment callback
    pub callback_gas_budget: u32,

    /// Number of random words requested
    pub num_words: u32,
}

/// Port: Request verifiable randomness from the oracle.
///
/// The coordinator assigns the request id and later delivers exactly one
/// fulfillment for it as an independent `fulfill_randomness` invocation;
/// the engine never awaits the response in-line.
#[async_trait]
pub trait RandomnessCoordinator: Send + Sync {
    /// Issue a randomness request; returns the coordinator-assigned id
    async fn request_random_words(
        &self,
        request: RandomnessRequest,
    ) -> std::result::Result<RequestId, CoordinatorError>;
}

/// Errors from the prize ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The receiving side rejected the transfer
    #[error("transfer rejected: {0}")]
    Rejected(String),

    /// Ledger has less than the requested amount on hand
    #[error("insufficient funds: have {available}, need {required}")]
    InsufficientFunds {
        /// Funds available for disbursement
        available: U256,
        /// Amount requested
        required: U256,
    },
}

/// Port: Fund movement for entries and payouts.
///
/// `receive` records an incoming entry payment; `pay` disburses the prize.
/// A failed `pay` maps to `PayoutFailed` and must leave the round untouched,
/// so the service only resets state after `pay` returns `Ok`.
#[async_trait]
pub trait PrizeLedger: Send + Sync {
    /// Record an incoming entry payment
    async fn receive(&self, player: Address, amount: U256);

    /// Transfer the prize to the winner
    async fn pay(&self, winner: Address, amount: U256) -> std::result::Result<(), LedgerError>;
}

/// Port: Publish success notifications to observers
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a raffle event
    async fn publish(&self, event: RaffleEvent);
}

/// Port: Wall-clock source for readiness gating.
///
/// A one-method seam so tests can drive interval elapse deterministically;
/// production wiring uses [`SystemClock`].
pub trait Clock: Send + Sync {
    /// Current unix time in seconds
    fn unix_now(&self) -> u64;
}

/// System wall clock
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let now = clock.unix_now();
        // Sanity: later than 2020-01-01.
        assert!(now > 1_577_836_800);
    }

    #[test]
    fn test_ledger_error_display() {
        let err = LedgerError::InsufficientFunds {
            available: U256::from(1),
            required: U256::from(2),
        };
        assert_eq!(err.to_string(), "insufficient funds: have 1, need 2");
    }
}
