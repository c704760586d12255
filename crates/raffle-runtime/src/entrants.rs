//! Demo entrant feed: random players entering at a fixed cadence so a
//! standalone run exercises complete rounds.

use primitive_types::U256;
use raffle_engine::{Address, RaffleApi, RaffleService};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Periodically enters freshly generated players with the exact fee
pub struct EntrantFeed {
    service: Arc<RaffleService>,
    entrance_fee: U256,
    cadence: Duration,
    shutdown: watch::Receiver<bool>,
}

impl EntrantFeed {
    /// Create a new feed
    pub fn new(
        service: Arc<RaffleService>,
        entrance_fee: U256,
        cadence: Duration,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            service,
            entrance_fee,
            cadence,
            shutdown,
        }
    }

    /// Run the feed until shutdown
    pub async fn run(mut self) {
        info!("[entrants] Demo feed started (cadence: {:?})", self.cadence);
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.cadence) => {
                    self.enter_one().await;
                }
                _ = self.shutdown.changed() => {
                    info!("[entrants] Shutdown signal received");
                    break;
                }
            }
        }
    }

    async fn enter_one(&self) {
        let mut player: Address = [0u8; 20];
        rand::thread_rng().fill(&mut player[..]);

        match self.service.enter(player, self.entrance_fee).await {
            Ok(()) => debug!("[entrants] 0x{} entered", hex::encode(player)),
            // Expected while a round is calculating; the feed just waits.
            Err(e) if e.is_recoverable() => debug!("[entrants] Entry deferred: {}", e),
            Err(e) => warn!("[entrants] Entry failed: {}", e),
        }
    }
}
