//! # Raffle Engine
//!
//! Round lifecycle engine for an automated, VRF-backed raffle.
//!
//! ## Purpose
//!
//! Participants pay a fixed entrance fee to join the open round. Once the
//! configured interval has elapsed and the round holds at least one player
//! and a positive balance, an automation trigger closes entry and a
//! randomness coordinator is asked for one random word; on delivery a winner
//! is selected by modulo over the player list, paid the entire round
//! balance, and the round resets and reopens.
//!
//! ## Architecture Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Adapters (Outer)                                   │
//! │  - MockVrfCoordinator: request ids + delivery       │
//! │  - InMemoryLedger: entry payments, prize payout     │
//! │  - Event publishers, clocks                         │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Ports (Middle)                                     │
//! │  - Inbound: RaffleApi                               │
//! │  - Outbound: RandomnessCoordinator, PrizeLedger,    │
//! │    EventPublisher, Clock                            │
//! └─────────────────────────────────────────────────────┘
//!                         │
//! ┌─────────────────────────────────────────────────────┐
//! │  Domain (Inner - Pure Logic)                        │
//! │  - Round: the OPEN/CALCULATING state machine        │
//! │  - Readiness: four-conjunct closure predicate       │
//! │  - Settlement: validated winner selection           │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Critical Invariants
//!
//! 1. **Serialized access**: every operation holds the single round lock
//!    for its full duration; no partial-execution visibility
//! 2. **Close gating**: a close succeeds only when open, interval elapsed,
//!    players non-empty, and balance positive all hold
//! 3. **Single outstanding request**: at most one close can succeed before
//!    a matching fulfillment; only the most recent request id is accepted
//! 4. **Exactly-once payout**: payout and round reset are all-or-nothing;
//!    a rejected transfer leaves the round untouched for a retry
//! 5. **Full disbursement**: the winner receives the exact round balance;
//!    after fulfillment the players are cleared and the balance is zero
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use raffle_engine::{
//!     InMemoryLedger, MockVrfCoordinator, RaffleApi, RaffleConfig,
//!     RaffleService, SystemClock, TracingEventPublisher,
//! };
//! use std::sync::Arc;
//!
//! let coordinator = Arc::new(MockVrfCoordinator::new());
//! let service = RaffleService::new(
//!     RaffleConfig::default(),
//!     coordinator.clone(),
//!     Arc::new(InMemoryLedger::new()),
//!     Arc::new(TracingEventPublisher::new()),
//!     Arc::new(SystemClock),
//! )?;
//!
//! service.enter(player, fee).await?;
//! if service.check_readiness().await.ready() {
//!     let request_id = service.close_and_request_randomness().await?;
//!     coordinator.deliver(request_id, words, &service).await?;
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Driven-port adapters (mock coordinator, in-memory ledger, clocks)
pub mod adapters;
/// Domain models and round state machine
pub mod domain;
/// Success notifications
pub mod events;
pub mod ports;
pub mod service;

mod config;
mod error;
mod metrics;

pub use config::{CoordinatorConfig, RaffleConfig};
pub use error::{CoordinatorError, RaffleError, Result};
pub use metrics::Metrics;

// Re-export commonly used types
pub use domain::{Address, Readiness, RequestId, Round, RoundState, Settlement};

pub use ports::{
    Clock, EventPublisher, LedgerError, PrizeLedger, RaffleApi, RandomnessCoordinator,
    RandomnessRequest, RoundSnapshot, SystemClock,
};

pub use events::RaffleEvent;

pub use adapters::{
    BufferingEventPublisher, InMemoryLedger, ManualClock, MockVrfCoordinator,
    TracingEventPublisher,
};

pub use service::RaffleService;

use primitive_types::U256;

/// Default minimum open duration in seconds
pub const DEFAULT_INTERVAL_SECS: u64 = 30;

/// Default gas budget for the randomness callback (500k)
pub const DEFAULT_CALLBACK_GAS_BUDGET: u32 = 500_000;

/// Default confirmations the coordinator waits before responding
pub const DEFAULT_MIN_CONFIRMATIONS: u16 = 3;

/// Default number of random words per request
pub const DEFAULT_NUM_WORDS: u32 = 1;

/// Default gas-lane key hash (30 gwei lane)
pub const DEFAULT_GAS_LANE: [u8; 32] = [
    0x47, 0x4e, 0x34, 0xa0, 0x77, 0xdf, 0x58, 0x80, 0x7d, 0xbe, 0x9c, 0x96, 0xd3, 0xc0, 0x09,
    0xb2, 0x3b, 0x3c, 0x6d, 0x0c, 0xce, 0x43, 0x3e, 0x59, 0xbb, 0xf5, 0xb3, 0x4f, 0x82, 0x3b,
    0xc5, 0x6c,
];

/// Default entrance fee: 0.01 units in the smallest denomination (10^16 wei)
pub fn default_entrance_fee() -> U256 {
    U256::exp10(16)
}
