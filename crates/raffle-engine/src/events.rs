//! Notifications published on successful operations
//!
//! Events fire on success only: a rejected entry, an out-of-turn close, or
//! a failed payout publishes nothing.

use crate::domain::{Address, RequestId};
use primitive_types::U256;
use serde::{Deserialize, Serialize};

/// Observer notifications emitted by the raffle service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RaffleEvent {
    /// A player joined the open round
    EnteredRound {
        /// Entering player
        player: Address,
    },

    /// The round closed and a randomness request went out
    RandomnessRequested {
        /// Coordinator-assigned request id
        request_id: RequestId,
    },

    /// A winner was selected and paid
    WinnerPicked {
        /// Paid winner
        winner: Address,
        /// Amount disbursed (the full round balance)
        prize: U256,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_json_shape() {
        let event = RaffleEvent::RandomnessRequested { request_id: 3 };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event\":\"randomness_requested\""));
        assert!(json.contains("\"request_id\":3"));
    }

    #[test]
    fn test_event_round_trips() {
        let event = RaffleEvent::WinnerPicked {
            winner: [7u8; 20],
            prize: U256::exp10(16),
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: RaffleEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
