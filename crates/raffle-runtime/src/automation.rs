//! Automation trigger: the external keeper that polls readiness and closes
//! eligible rounds, plus the simulated randomness delivery that follows.

use primitive_types::U256;
use raffle_engine::{MockVrfCoordinator, RaffleApi, RaffleService};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Periodic keeper loop: `check_readiness` → `close_and_request_randomness`,
/// then (standing in for the oracle network) a delayed randomness delivery.
pub struct AutomationTrigger {
    service: Arc<RaffleService>,
    coordinator: Arc<MockVrfCoordinator>,
    poll_interval: Duration,
    confirmation_delay: Duration,
    shutdown: watch::Receiver<bool>,
}

impl AutomationTrigger {
    /// Create a new trigger
    pub fn new(
        service: Arc<RaffleService>,
        coordinator: Arc<MockVrfCoordinator>,
        poll_interval: Duration,
        confirmation_delay: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            service,
            coordinator,
            poll_interval,
            confirmation_delay,
            shutdown,
        }
    }

    /// Run the poll loop until shutdown
    pub async fn run(mut self) {
        info!(
            "[keeper] Automation trigger started (poll: {:?})",
            self.poll_interval
        );
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {
                    self.tick().await;
                }
                _ = self.shutdown.changed() => {
                    info!("[keeper] Shutdown signal received");
                    break;
                }
            }
        }
    }

    async fn tick(&self) {
        let readiness = self.service.check_readiness().await;
        if !readiness.ready() {
            debug!("[keeper] Upkeep not needed: {:?}", readiness);
            return;
        }

        let request_id = match self.service.close_and_request_randomness().await {
            Ok(id) => id,
            Err(e) if e.is_recoverable() => {
                // Another trigger beat us to it, or the round moved on.
                debug!("[keeper] Close skipped: {}", e);
                return;
            }
            Err(e) => {
                error!("[keeper] Close failed: {}", e);
                return;
            }
        };

        // Simulate the oracle waiting out its confirmations before the
        // fulfillment arrives as an independent invocation.
        tokio::time::sleep(self.confirmation_delay).await;
        let word = U256::from(rand::random::<u128>());
        match self
            .coordinator
            .deliver(request_id, vec![word], self.service.as_ref())
            .await
        {
            Ok(winner) => {
                info!(
                    "[keeper] Round settled, winner 0x{} (request_id: {})",
                    hex::encode(winner),
                    request_id
                );
            }
            Err(e) => {
                // The request stays outstanding; the next delivery attempt
                // or operator intervention can retry.
                error!("[keeper] Delivery failed for request {}: {}", request_id, e);
            }
        }
    }
}
