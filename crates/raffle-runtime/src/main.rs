//! # Raffle Node Runtime
//!
//! Standalone simulation wiring the raffle engine to its external
//! collaborators: an automation trigger polling readiness, a mock VRF
//! coordinator delivering randomness after a confirmation delay, an
//! in-memory prize ledger, and a demo entrant feed.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging
//! 2. Load configuration (defaults + env overrides)
//! 3. Wire the service to its adapters
//! 4. Spawn the entrant feed and the automation trigger
//! 5. Run until Ctrl+C, then signal shutdown

mod automation;
mod entrants;

use anyhow::{Context, Result};
use primitive_types::U256;
use raffle_engine::{
    InMemoryLedger, MockVrfCoordinator, RaffleConfig, RaffleService, SystemClock,
    TracingEventPublisher,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::automation::AutomationTrigger;
use crate::entrants::EntrantFeed;

/// Task cadences for the simulated environment
struct RuntimeConfig {
    raffle: RaffleConfig,
    poll_interval: Duration,
    confirmation_delay: Duration,
    entrant_cadence: Duration,
}

/// Load configuration from defaults and environment overrides.
fn load_config() -> Result<RuntimeConfig> {
    let mut raffle = RaffleConfig::default();

    if let Ok(fee) = std::env::var("RAFFLE_ENTRANCE_FEE_WEI") {
        let fee: u128 = fee
            .parse()
            .context("RAFFLE_ENTRANCE_FEE_WEI must be an integer wei amount")?;
        raffle.entrance_fee = U256::from(fee);
    }
    if let Ok(interval) = std::env::var("RAFFLE_INTERVAL_SECS") {
        raffle.interval_secs = interval
            .parse()
            .context("RAFFLE_INTERVAL_SECS must be an integer")?;
    }
    if let Ok(sub) = std::env::var("RAFFLE_SUBSCRIPTION_ID") {
        raffle.coordinator.subscription_id = sub
            .parse()
            .context("RAFFLE_SUBSCRIPTION_ID must be an integer")?;
    }

    let poll_secs: u64 = match std::env::var("RAFFLE_POLL_SECS") {
        Ok(v) => v.parse().context("RAFFLE_POLL_SECS must be an integer")?,
        Err(_) => 5,
    };
    let confirmation_secs: u64 = match std::env::var("RAFFLE_CONFIRMATION_DELAY_SECS") {
        Ok(v) => v
            .parse()
            .context("RAFFLE_CONFIRMATION_DELAY_SECS must be an integer")?,
        Err(_) => 3,
    };
    let entrant_secs: u64 = match std::env::var("RAFFLE_ENTRANT_CADENCE_SECS") {
        Ok(v) => v
            .parse()
            .context("RAFFLE_ENTRANT_CADENCE_SECS must be an integer")?,
        Err(_) => 7,
    };

    Ok(RuntimeConfig {
        raffle,
        poll_interval: Duration::from_secs(poll_secs),
        confirmation_delay: Duration::from_secs(confirmation_secs),
        entrant_cadence: Duration::from_secs(entrant_secs),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("===========================================");
    info!("  Raffle Node Runtime v0.1.0");
    info!("===========================================");

    let config = load_config()?;
    let entrance_fee = config.raffle.entrance_fee;

    // Wire the service to its collaborators.
    let coordinator = Arc::new(MockVrfCoordinator::new());
    let ledger = Arc::new(InMemoryLedger::new());
    let service = Arc::new(RaffleService::new(
        config.raffle,
        coordinator.clone(),
        ledger,
        Arc::new(TracingEventPublisher::new()),
        Arc::new(SystemClock),
    )?);

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Demo entrants keep rounds populated.
    let feed = EntrantFeed::new(
        Arc::clone(&service),
        entrance_fee,
        config.entrant_cadence,
        shutdown_rx.clone(),
    );
    tokio::spawn(feed.run());

    // The keeper closes eligible rounds and the mock oracle answers.
    let trigger = AutomationTrigger::new(
        Arc::clone(&service),
        coordinator,
        config.poll_interval,
        config.confirmation_delay,
        shutdown_rx,
    );
    tokio::spawn(trigger.run());

    info!("Raffle node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c().await?;

    info!("Initiating graceful shutdown...");
    let _ = shutdown_tx.send(true);
    tokio::time::sleep(Duration::from_secs(1)).await;

    let metrics = service.metrics();
    info!(
        "Lifetime: {} entries, {} rounds closed, {} winners paid",
        metrics.get_entries_accepted(),
        metrics.get_rounds_closed(),
        metrics.get_payouts_completed()
    );
    info!("Shutdown complete");

    Ok(())
}
