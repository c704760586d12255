//! Hexagonal architecture ports

mod inbound;
mod outbound;

pub use inbound::{RaffleApi, RoundSnapshot};
pub use outbound::{
    Clock, EventPublisher, LedgerError, PrizeLedger, RandomnessCoordinator, RandomnessRequest,
    SystemClock,
};
