//! Error types for the raffle engine

use crate::domain::{Address, RequestId};
use primitive_types::U256;
use thiserror::Error;

/// Result type alias for raffle operations
pub type Result<T> = std::result::Result<T, RaffleError>;

/// Errors that can occur while operating a raffle round
#[derive(Debug, Error)]
pub enum RaffleError {
    /// Entry payment below the fixed entrance fee
    #[error("payment below entrance fee: sent {sent}, required {required}")]
    InsufficientPayment {
        /// Amount the player sent
        sent: U256,
        /// Entrance fee required per entry
        required: U256,
    },

    /// Entry attempted while the round is calculating a winner
    #[error("round is not open for entries")]
    RoundNotOpen,

    /// Close attempted while the readiness predicate does not hold.
    /// Carries the value of each conjunct for diagnostics.
    #[error(
        "upkeep not ready: open={is_open}, interval_elapsed={interval_elapsed}, \
         has_players={has_players}, has_balance={has_balance}"
    )]
    UpkeepNotReady {
        /// Round state is Open
        is_open: bool,
        /// Configured interval has elapsed since the last close
        interval_elapsed: bool,
        /// At least one player is entered
        has_players: bool,
        /// Round balance is positive
        has_balance: bool,
    },

    /// Fulfillment carried a request id this round never issued, or one
    /// that was already fulfilled
    #[error("unknown randomness request: {request_id}")]
    UnknownRequest {
        /// Request id the caller presented
        request_id: RequestId,
    },

    /// The ledger rejected the prize transfer. The round is left exactly
    /// as it was before the fulfillment attempt.
    #[error("payout to 0x{} failed: {reason}", hex::encode(.winner))]
    PayoutFailed {
        /// Winner the transfer was addressed to
        winner: Address,
        /// Ledger-reported reason
        reason: String,
    },

    /// Player index query past the end of the player list
    #[error("player index out of range: {index} >= {count}")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Current player count
        count: usize,
    },

    /// Invalid configuration at construction
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Randomness coordinator failure
    #[error("randomness coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),
}

impl RaffleError {
    /// Check if the caller should re-poll and retry rather than give up.
    ///
    /// `UpkeepNotReady` and `RoundNotOpen` clear on their own as the round
    /// progresses; `PayoutFailed` is retryable after external remediation
    /// because the round state is untouched.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UpkeepNotReady { .. } | Self::RoundNotOpen | Self::PayoutFailed { .. }
        )
    }
}

/// Errors from the randomness coordinator collaborator
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Fulfillment attempted for a request the coordinator never issued
    #[error("nonexistent request: {request_id}")]
    NonexistentRequest {
        /// Request id the caller presented
        request_id: RequestId,
    },

    /// Subscription reference is unknown or unfunded
    #[error("invalid subscription: {subscription_id}")]
    InvalidSubscription {
        /// Subscription id from the request
        subscription_id: u64,
    },

    /// Transport or availability failure
    #[error("coordinator unavailable: {0}")]
    Unavailable(String),
}
