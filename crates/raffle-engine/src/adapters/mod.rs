//! Adapters implementing the driven ports
//!
//! In-process collaborators used by the runtime and the tests: a mock VRF
//! coordinator, an in-memory prize ledger, event publishers, and clocks.

mod clock;
mod coordinator;
mod events;
mod ledger;

pub use clock::ManualClock;
pub use coordinator::MockVrfCoordinator;
pub use events::{BufferingEventPublisher, TracingEventPublisher};
pub use ledger::InMemoryLedger;
