//! Concrete Raffle Service Implementation
//!
//! This module provides the concrete implementation of the [`RaffleApi`]
//! trait. The service owns the singleton [`Round`] behind a
//! `tokio::sync::Mutex` and holds the lock for the full duration of every
//! operation, so entries, closes, and fulfillments are strictly serialized
//! with no partial-execution visibility.
//!
//! The coordinator request in `close_and_request_randomness` happens while
//! the lock is held: the OPEN→CALCULATING flip and the pending-request-id
//! recording are atomic with respect to every other operation, and a
//! concurrent second close can only ever observe CALCULATING and fail the
//! readiness predicate.

use crate::{
    config::{CoordinatorConfig, RaffleConfig},
    domain::{Address, Readiness, RequestId, Round},
    error::{CoordinatorError, RaffleError, Result},
    events::RaffleEvent,
    metrics::Metrics,
    ports::{
        Clock, EventPublisher, PrizeLedger, RaffleApi, RandomnessCoordinator, RandomnessRequest,
        RoundSnapshot,
    },
};
use async_trait::async_trait;
use primitive_types::U256;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Concrete implementation of [`RaffleApi`]
///
/// Orchestrates the round lifecycle against the driven ports: randomness
/// coordinator, prize ledger, event publisher, and clock.
pub struct RaffleService {
    /// The singleton round, serialized behind one lock
    round: Mutex<Round>,

    /// Randomness oracle collaborator
    coordinator: Arc<dyn RandomnessCoordinator>,

    /// Fund movement collaborator
    ledger: Arc<dyn PrizeLedger>,

    /// Success-notification sink
    events: Arc<dyn EventPublisher>,

    /// Wall-clock source
    clock: Arc<dyn Clock>,

    /// Request parameters passed through on every close
    coordinator_config: CoordinatorConfig,

    /// Lifecycle counters
    metrics: Metrics,
}

impl RaffleService {
    /// Create a new raffle service with a fresh open round.
    ///
    /// Fails with `InvalidConfig` if the configuration does not validate.
    pub fn new(
        config: RaffleConfig,
        coordinator: Arc<dyn RandomnessCoordinator>,
        ledger: Arc<dyn PrizeLedger>,
        events: Arc<dyn EventPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        info!("[raffle] Initializing Raffle Service");
        info!("  Entrance Fee: {}", config.entrance_fee);
        info!("  Interval: {}s", config.interval_secs);
        info!(
            "  Coordinator: sub={}, confirmations={}, callback_gas={}",
            config.coordinator.subscription_id,
            config.coordinator.min_confirmations,
            config.coordinator.callback_gas_budget
        );

        let round = Round::new(config.entrance_fee, config.interval_secs, clock.unix_now());

        Ok(Self {
            round: Mutex::new(round),
            coordinator,
            ledger,
            events,
            clock,
            coordinator_config: config.coordinator,
            metrics: Metrics::new(),
        })
    }

    /// Get the lifecycle metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    fn randomness_request(&self) -> RandomnessRequest {
        RandomnessRequest {
            gas_lane: self.coordinator_config.gas_lane,
            subscription_id: self.coordinator_config.subscription_id,
            min_confirmations: self.coordinator_config.min_confirmations,
            callback_gas_budget: self.coordinator_config.callback_gas_budget,
            num_words: self.coordinator_config.num_words,
        }
    }
}

#[async_trait]
impl RaffleApi for RaffleService {
    async fn enter(&self, player: Address, amount: U256) -> Result<()> {
        let mut round = self.round.lock().await;

        if let Err(e) = round.record_entry(player, amount) {
            self.metrics.record_entry_rejected();
            debug!("[raffle] Entry rejected for 0x{}: {}", hex::encode(player), e);
            return Err(e);
        }

        self.ledger.receive(player, amount).await;
        self.metrics.record_entry_accepted();
        info!(
            "[raffle] Player 0x{} entered (entries: {}, balance: {})",
            hex::encode(player),
            round.player_count(),
            round.balance()
        );

        self.events
            .publish(RaffleEvent::EnteredRound { player })
            .await;
        Ok(())
    }

    async fn check_readiness(&self) -> Readiness {
        let round = self.round.lock().await;
        round.readiness(self.clock.unix_now())
    }

    async fn close_and_request_randomness(&self) -> Result<RequestId> {
        let mut round = self.round.lock().await;
        let now = self.clock.unix_now();

        if let Err(e) = round.close(now) {
            debug!("[raffle] Close rejected: {}", e);
            return Err(e);
        }

        match self
            .coordinator
            .request_random_words(self.randomness_request())
            .await
        {
            Ok(request_id) => {
                round.record_request(request_id);
                self.metrics.record_round_closed();
                info!(
                    "[raffle] Round closed, randomness requested (request_id: {}, entries: {})",
                    request_id,
                    round.player_count()
                );
                self.events
                    .publish(RaffleEvent::RandomnessRequested { request_id })
                    .await;
                Ok(request_id)
            }
            Err(e) => {
                // The round reopens so a later trigger can retry the close.
                round.abort_close();
                warn!("[raffle] Randomness request failed, round reopened: {}", e);
                Err(e.into())
            }
        }
    }

    async fn fulfill_randomness(
        &self,
        request_id: RequestId,
        random_words: Vec<U256>,
    ) -> Result<Address> {
        let mut round = self.round.lock().await;

        let word = random_words.first().copied().ok_or_else(|| {
            RaffleError::Coordinator(CoordinatorError::Unavailable(
                "fulfillment carried no random words".into(),
            ))
        })?;

        let settlement = match round.settle(request_id, word) {
            Ok(settlement) => settlement,
            Err(e) => {
                self.metrics.record_stale_fulfillment();
                warn!("[raffle] Fulfillment rejected: {}", e);
                return Err(e);
            }
        };

        // Payout before reset: a rejected transfer must leave the round
        // exactly as it was, with the request still pending.
        if let Err(e) = self.ledger.pay(settlement.winner, settlement.prize).await {
            self.metrics.record_payout_failure();
            error!(
                "[raffle] Payout of {} to 0x{} failed: {}",
                settlement.prize,
                hex::encode(settlement.winner),
                e
            );
            return Err(RaffleError::PayoutFailed {
                winner: settlement.winner,
                reason: e.to_string(),
            });
        }

        round.commit_settlement(&settlement, self.clock.unix_now());
        self.metrics.record_payout_completed();
        info!(
            "[raffle] Winner 0x{} paid {} (request_id: {})",
            hex::encode(settlement.winner),
            settlement.prize,
            request_id
        );

        self.events
            .publish(RaffleEvent::WinnerPicked {
                winner: settlement.winner,
                prize: settlement.prize,
            })
            .await;
        Ok(settlement.winner)
    }

    async fn snapshot(&self) -> RoundSnapshot {
        let round = self.round.lock().await;
        RoundSnapshot {
            state: round.state(),
            entrance_fee: round.entrance_fee(),
            interval_secs: round.interval_secs(),
            last_timestamp: round.last_timestamp(),
            balance: round.balance(),
            player_count: round.player_count(),
            recent_winner: round.recent_winner(),
            pending_request: round.pending_request(),
        }
    }

    async fn player_at(&self, index: usize) -> Result<Address> {
        let round = self.round.lock().await;
        round.player(index)
    }

    async fn player_count(&self) -> usize {
        let round = self.round.lock().await;
        round.player_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{
        BufferingEventPublisher, InMemoryLedger, ManualClock, MockVrfCoordinator,
    };
    use crate::domain::RoundState;

    const START: u64 = 1_000;

    struct Harness {
        service: RaffleService,
        coordinator: Arc<MockVrfCoordinator>,
        ledger: Arc<InMemoryLedger>,
        events: Arc<BufferingEventPublisher>,
        clock: Arc<ManualClock>,
    }

    fn harness() -> Harness {
        let coordinator = Arc::new(MockVrfCoordinator::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let events = Arc::new(BufferingEventPublisher::new());
        let clock = Arc::new(ManualClock::new(START));

        let service = RaffleService::new(
            RaffleConfig::default(),
            coordinator.clone(),
            ledger.clone(),
            events.clone(),
            clock.clone(),
        )
        .unwrap();

        Harness {
            service,
            coordinator,
            ledger,
            events,
            clock,
        }
    }

    fn fee() -> U256 {
        RaffleConfig::default().entrance_fee
    }

    fn player(n: u8) -> Address {
        [n; 20]
    }

    #[tokio::test]
    async fn test_enter_records_player_and_funds() {
        let h = harness();
        h.service.enter(player(1), fee()).await.unwrap();

        let snapshot = h.service.snapshot().await;
        assert_eq!(snapshot.player_count, 1);
        assert_eq!(snapshot.balance, fee());
        assert_eq!(h.service.player_at(0).await.unwrap(), player(1));
        assert_eq!(h.ledger.pot(), fee());
        assert_eq!(
            h.events.take(),
            vec![RaffleEvent::EnteredRound { player: player(1) }]
        );
    }

    #[tokio::test]
    async fn test_enter_underpayment_rejected() {
        let h = harness();
        let err = h
            .service
            .enter(player(1), fee() - U256::from(1))
            .await
            .unwrap_err();
        assert!(matches!(err, RaffleError::InsufficientPayment { .. }));
        assert_eq!(h.service.player_count().await, 0);
        assert_eq!(h.ledger.pot(), U256::zero());
        assert!(h.events.take().is_empty());
    }

    #[tokio::test]
    async fn test_close_requires_readiness() {
        let h = harness();
        h.service.enter(player(1), fee()).await.unwrap();

        // Interval has not elapsed yet.
        let err = h.service.close_and_request_randomness().await.unwrap_err();
        assert!(matches!(
            err,
            RaffleError::UpkeepNotReady {
                interval_elapsed: false,
                ..
            }
        ));
        assert_eq!(h.coordinator.outstanding_count(), 0);
    }

    #[tokio::test]
    async fn test_close_issues_one_request_and_is_idempotent() {
        let h = harness();
        h.service.enter(player(1), fee()).await.unwrap();
        h.clock.advance(31);

        assert!(h.service.check_readiness().await.ready());
        let request_id = h.service.close_and_request_randomness().await.unwrap();
        assert_eq!(request_id, 1);
        assert_eq!(h.coordinator.outstanding_count(), 1);
        assert_eq!(h.service.snapshot().await.state, RoundState::Calculating);

        // Entry while calculating is rejected.
        let err = h.service.enter(player(2), fee()).await.unwrap_err();
        assert!(matches!(err, RaffleError::RoundNotOpen));

        // A second close fails the state conjunct and issues nothing.
        let err = h.service.close_and_request_randomness().await.unwrap_err();
        assert!(matches!(
            err,
            RaffleError::UpkeepNotReady { is_open: false, .. }
        ));
        assert_eq!(h.coordinator.outstanding_count(), 1);
    }

    #[tokio::test]
    async fn test_close_reopens_on_coordinator_failure() {
        let h = harness();
        h.service.enter(player(1), fee()).await.unwrap();
        h.clock.advance(31);

        h.coordinator.set_fail_requests(true);
        let err = h.service.close_and_request_randomness().await.unwrap_err();
        assert!(matches!(err, RaffleError::Coordinator(_)));
        assert_eq!(h.service.snapshot().await.state, RoundState::Open);

        // Retry succeeds once the coordinator recovers.
        h.coordinator.set_fail_requests(false);
        h.service.close_and_request_randomness().await.unwrap();
    }

    #[tokio::test]
    async fn test_fulfill_unknown_request_rejected() {
        let h = harness();
        h.service.enter(player(1), fee()).await.unwrap();

        let err = h
            .service
            .fulfill_randomness(1, vec![U256::from(0)])
            .await
            .unwrap_err();
        assert!(matches!(err, RaffleError::UnknownRequest { request_id: 1 }));
        assert_eq!(h.service.snapshot().await.player_count, 1);
        assert_eq!(h.service.metrics().get_stale_fulfillments(), 1);
    }

    #[tokio::test]
    async fn test_full_round_pays_winner_and_reopens() {
        let h = harness();
        h.service.enter(player(1), fee()).await.unwrap();
        h.service.enter(player(2), fee()).await.unwrap();
        h.clock.advance(31);

        let request_id = h.service.close_and_request_randomness().await.unwrap();
        let winner = h
            .service
            .fulfill_randomness(request_id, vec![U256::from(3)])
            .await
            .unwrap();

        // 3 % 2 == 1 selects the second player.
        assert_eq!(winner, player(2));
        assert_eq!(h.ledger.balance_of(player(2)), fee() * 2);
        assert_eq!(h.ledger.pot(), U256::zero());

        let snapshot = h.service.snapshot().await;
        assert_eq!(snapshot.state, RoundState::Open);
        assert_eq!(snapshot.player_count, 0);
        assert_eq!(snapshot.balance, U256::zero());
        assert_eq!(snapshot.recent_winner, Some(player(2)));
        assert_eq!(snapshot.last_timestamp, START + 31);
        assert!(snapshot.pending_request.is_none());

        let events = h.events.take();
        assert_eq!(events.len(), 4);
        assert_eq!(
            events[3],
            RaffleEvent::WinnerPicked {
                winner: player(2),
                prize: fee() * 2,
            }
        );
    }

    #[tokio::test]
    async fn test_fulfilled_request_is_stale_afterwards() {
        let h = harness();
        h.service.enter(player(1), fee()).await.unwrap();
        h.clock.advance(31);

        let request_id = h.service.close_and_request_randomness().await.unwrap();
        h.service
            .fulfill_randomness(request_id, vec![U256::from(0)])
            .await
            .unwrap();

        let err = h
            .service
            .fulfill_randomness(request_id, vec![U256::from(0)])
            .await
            .unwrap_err();
        assert!(matches!(err, RaffleError::UnknownRequest { .. }));
    }

    #[tokio::test]
    async fn test_payout_failure_leaves_round_intact() {
        let h = harness();
        h.service.enter(player(1), fee()).await.unwrap();
        h.clock.advance(31);
        let request_id = h.service.close_and_request_randomness().await.unwrap();

        h.ledger.set_reject_payouts(true);
        let err = h
            .service
            .fulfill_randomness(request_id, vec![U256::from(0)])
            .await
            .unwrap_err();
        assert!(matches!(err, RaffleError::PayoutFailed { .. }));

        // Round untouched: still calculating, players and request intact.
        let snapshot = h.service.snapshot().await;
        assert_eq!(snapshot.state, RoundState::Calculating);
        assert_eq!(snapshot.player_count, 1);
        assert_eq!(snapshot.balance, fee());
        assert_eq!(snapshot.pending_request, Some(request_id));
        assert!(snapshot.recent_winner.is_none());

        // No WinnerPicked went out for the failed attempt.
        assert!(!h
            .events
            .take()
            .iter()
            .any(|e| matches!(e, RaffleEvent::WinnerPicked { .. })));

        // External remediation, then the same fulfillment retries cleanly.
        h.ledger.set_reject_payouts(false);
        let winner = h
            .service
            .fulfill_randomness(request_id, vec![U256::from(0)])
            .await
            .unwrap();
        assert_eq!(winner, player(1));
        assert_eq!(h.ledger.balance_of(player(1)), fee());
        assert_eq!(h.service.snapshot().await.state, RoundState::Open);
    }

    #[tokio::test]
    async fn test_empty_random_words_rejected() {
        let h = harness();
        h.service.enter(player(1), fee()).await.unwrap();
        h.clock.advance(31);
        let request_id = h.service.close_and_request_randomness().await.unwrap();

        let err = h
            .service
            .fulfill_randomness(request_id, vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, RaffleError::Coordinator(_)));
        assert_eq!(h.service.snapshot().await.state, RoundState::Calculating);
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let coordinator = Arc::new(MockVrfCoordinator::new());
        let ledger = Arc::new(InMemoryLedger::new());
        let events = Arc::new(BufferingEventPublisher::new());
        let clock = Arc::new(ManualClock::new(START));

        let config = RaffleConfig {
            entrance_fee: U256::zero(),
            ..RaffleConfig::default()
        };
        let result = RaffleService::new(config, coordinator, ledger, events, clock);
        assert!(matches!(result, Err(RaffleError::InvalidConfig(_))));
    }
}
