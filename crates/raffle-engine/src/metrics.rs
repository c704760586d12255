//! Metrics collection for the raffle engine

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for round lifecycle operations
#[derive(Debug, Default)]
pub struct Metrics {
    /// Entries accepted into rounds
    pub entries_accepted: AtomicU64,

    /// Entries rejected (underpayment or closed round)
    pub entries_rejected: AtomicU64,

    /// Rounds closed with a randomness request issued
    pub rounds_closed: AtomicU64,

    /// Winners selected and paid
    pub payouts_completed: AtomicU64,

    /// Payout attempts rejected by the ledger
    pub payout_failures: AtomicU64,

    /// Fulfillments rejected for an unknown or stale request id
    pub stale_fulfillments: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an accepted entry
    pub fn record_entry_accepted(&self) {
        self.entries_accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected entry
    pub fn record_entry_rejected(&self) {
        self.entries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful close
    pub fn record_round_closed(&self) {
        self.rounds_closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a completed payout
    pub fn record_payout_completed(&self) {
        self.payouts_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a ledger-rejected payout
    pub fn record_payout_failure(&self) {
        self.payout_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected fulfillment
    pub fn record_stale_fulfillment(&self) {
        self.stale_fulfillments.fetch_add(1, Ordering::Relaxed);
    }

    /// Get entries accepted
    pub fn get_entries_accepted(&self) -> u64 {
        self.entries_accepted.load(Ordering::Relaxed)
    }

    /// Get rounds closed
    pub fn get_rounds_closed(&self) -> u64 {
        self.rounds_closed.load(Ordering::Relaxed)
    }

    /// Get completed payouts
    pub fn get_payouts_completed(&self) -> u64 {
        self.payouts_completed.load(Ordering::Relaxed)
    }

    /// Get rejected fulfillments
    pub fn get_stale_fulfillments(&self) -> u64 {
        self.stale_fulfillments.load(Ordering::Relaxed)
    }

    /// Average entries per completed round
    pub fn get_avg_entries_per_round(&self) -> f64 {
        let rounds = self.payouts_completed.load(Ordering::Relaxed);
        if rounds == 0 {
            return 0.0;
        }
        let entries = self.entries_accepted.load(Ordering::Relaxed);
        entries as f64 / rounds as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = Metrics::new();

        metrics.record_entry_accepted();
        metrics.record_entry_accepted();
        metrics.record_round_closed();
        metrics.record_payout_completed();

        assert_eq!(metrics.get_entries_accepted(), 2);
        assert_eq!(metrics.get_rounds_closed(), 1);
        assert_eq!(metrics.get_payouts_completed(), 1);
        assert_eq!(metrics.get_avg_entries_per_round(), 2.0);
    }

    #[test]
    fn test_avg_with_no_rounds() {
        let metrics = Metrics::new();
        metrics.record_entry_accepted();
        assert_eq!(metrics.get_avg_entries_per_round(), 0.0);
    }
}
