//! Inbound ports (driving side - API)

use crate::domain::{Address, Readiness, RequestId, RoundState};
use crate::error::Result;
use async_trait::async_trait;
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Primary port: the Round Manager operations plus the read-only query
/// surface.
///
/// Callers: participants (`enter`), the automation trigger
/// (`check_readiness` / `close_and_request_randomness`), and the randomness
/// coordinator's delivery path (`fulfill_randomness`).
#[async_trait]
pub trait RaffleApi: Send + Sync {
    /// Enter the open round with a payment of at least the entrance fee
    async fn enter(&self, player: Address, amount: U256) -> Result<()>;

    /// Evaluate the four-conjunct closure predicate. Read-only, never errors.
    async fn check_readiness(&self) -> Readiness;

    /// Close entry and request randomness; returns the coordinator-assigned
    /// request id
    async fn close_and_request_randomness(&self) -> Result<RequestId>;

    /// Deliver randomness for an outstanding request: selects the winner,
    /// pays out the full balance, reopens the round. Returns the winner.
    async fn fulfill_randomness(
        &self,
        request_id: RequestId,
        random_words: Vec<U256>,
    ) -> Result<Address>;

    /// Point-in-time view of the round
    async fn snapshot(&self) -> RoundSnapshot;

    /// Player at index `index` in the current round
    async fn player_at(&self, index: usize) -> Result<Address>;

    /// Number of entries in the current round
    async fn player_count(&self) -> usize;
}

/// Read-only view of the round state
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundSnapshot {
    /// Current state
    pub state: RoundState,

    /// Fixed entrance fee
    pub entrance_fee: U256,

    /// Minimum open duration in seconds
    pub interval_secs: u64,

    /// Time of the last close (or construction)
    pub last_timestamp: u64,

    /// Current round balance
    pub balance: U256,

    /// Number of entries
    pub player_count: usize,

    /// Most recently paid winner
    pub recent_winner: Option<Address>,

    /// Outstanding randomness request id
    pub pending_request: Option<RequestId>,
}
