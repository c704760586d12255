//! Configuration types for the raffle engine

use crate::error::RaffleError;
use primitive_types::{H256, U256};
use serde::Deserialize;

/// Runtime configuration for a raffle, fixed at construction
#[derive(Clone, Debug, Deserialize)]
pub struct RaffleConfig {
    /// Fixed entrance fee per entry (smallest currency unit)
    pub entrance_fee: U256,

    /// Minimum open duration in seconds before a round may close
    pub interval_secs: u64,

    /// Randomness coordinator settings
    pub coordinator: CoordinatorConfig,
}

impl Default for RaffleConfig {
    fn default() -> Self {
        Self {
            entrance_fee: crate::default_entrance_fee(),
            interval_secs: crate::DEFAULT_INTERVAL_SECS,
            coordinator: CoordinatorConfig::default(),
        }
    }
}

impl RaffleConfig {
    /// Validate the configuration before wiring a service
    pub fn validate(&self) -> Result<(), RaffleError> {
        if self.entrance_fee.is_zero() {
            return Err(RaffleError::InvalidConfig(
                "entrance fee must be positive".into(),
            ));
        }
        if self.interval_secs == 0 {
            return Err(RaffleError::InvalidConfig(
                "interval must be at least one second".into(),
            ));
        }
        self.coordinator.validate()
    }
}

/// Randomness request parameters, passed through to the coordinator
#[derive(Clone, Debug, Deserialize)]
pub struct CoordinatorConfig {
    /// Gas-lane key hash (price tier for the randomness callback)
    pub gas_lane: H256,

    /// Funded subscription the request is billed to
    pub subscription_id: u64,

    /// Confirmations the coordinator waits before responding
    pub min_confirmations: u16,

    /// Gas budget for the fulfillment callback
    pub callback_gas_budget: u32,

    /// Number of random words per request (the raffle needs one)
    pub num_words: u32,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            gas_lane: H256(crate::DEFAULT_GAS_LANE),
            subscription_id: 1,
            min_confirmations: crate::DEFAULT_MIN_CONFIRMATIONS,
            callback_gas_budget: crate::DEFAULT_CALLBACK_GAS_BUDGET,
            num_words: crate::DEFAULT_NUM_WORDS,
        }
    }
}

impl CoordinatorConfig {
    /// Validate coordinator parameters
    pub fn validate(&self) -> Result<(), RaffleError> {
        if self.num_words == 0 {
            return Err(RaffleError::InvalidConfig(
                "at least one random word must be requested".into(),
            ));
        }
        if self.callback_gas_budget == 0 {
            return Err(RaffleError::InvalidConfig(
                "callback gas budget must be positive".into(),
            ));
        }
        Ok(())
    }
}
