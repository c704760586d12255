//! Domain models and round state machine
//!
//! Pure logic, no I/O: the [`Round`] entity owns every invariant of the
//! entry/close/settle lifecycle and is exercised by the service layer under
//! a single lock.

mod round;

pub use round::{Readiness, Round, RoundState, Settlement};

/// Participant identity (20-byte account address)
pub type Address = [u8; 20];

/// Coordinator-assigned randomness request identifier
pub type RequestId = u64;
