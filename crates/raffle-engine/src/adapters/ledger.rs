//! In-memory prize ledger
//!
//! Entry payments accrue to a pot; payouts move the pot to the winner's
//! account. A rejection toggle lets tests exercise the payout-failure
//! recovery rule.

use crate::domain::Address;
use crate::ports::{LedgerError, PrizeLedger};
use async_trait::async_trait;
use primitive_types::U256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// In-process fund ledger
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    /// Undisbursed round funds
    pot: Mutex<U256>,

    /// Credited winnings per account
    accounts: Mutex<HashMap<Address, U256>>,

    /// When set, every payout is rejected
    reject_payouts: AtomicBool,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle payout rejection
    pub fn set_reject_payouts(&self, reject: bool) {
        self.reject_payouts.store(reject, Ordering::SeqCst);
    }

    /// Undisbursed pot balance
    pub fn pot(&self) -> U256 {
        *self.pot.lock().unwrap()
    }

    /// Winnings credited to `account`
    pub fn balance_of(&self, account: Address) -> U256 {
        self.accounts
            .lock()
            .unwrap()
            .get(&account)
            .copied()
            .unwrap_or_default()
    }
}

#[async_trait]
impl PrizeLedger for InMemoryLedger {
    async fn receive(&self, player: Address, amount: U256) {
        let mut pot = self.pot.lock().unwrap();
        *pot += amount;
        debug!(
            "[ledger] Received {} from 0x{} (pot: {})",
            amount,
            hex::encode(player),
            *pot
        );
    }

    async fn pay(&self, winner: Address, amount: U256) -> Result<(), LedgerError> {
        if self.reject_payouts.load(Ordering::SeqCst) {
            return Err(LedgerError::Rejected("payouts disabled".into()));
        }

        let mut pot = self.pot.lock().unwrap();
        if *pot < amount {
            return Err(LedgerError::InsufficientFunds {
                available: *pot,
                required: amount,
            });
        }
        *pot -= amount;
        *self
            .accounts
            .lock()
            .unwrap()
            .entry(winner)
            .or_default() += amount;
        debug!(
            "[ledger] Paid {} to 0x{} (pot: {})",
            amount,
            hex::encode(winner),
            *pot
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_receive_and_pay() {
        let ledger = InMemoryLedger::new();
        ledger.receive([1u8; 20], U256::from(100)).await;
        ledger.receive([2u8; 20], U256::from(100)).await;
        assert_eq!(ledger.pot(), U256::from(200));

        ledger.pay([2u8; 20], U256::from(200)).await.unwrap();
        assert_eq!(ledger.pot(), U256::zero());
        assert_eq!(ledger.balance_of([2u8; 20]), U256::from(200));
        assert_eq!(ledger.balance_of([1u8; 20]), U256::zero());
    }

    #[tokio::test]
    async fn test_overdraw_rejected() {
        let ledger = InMemoryLedger::new();
        ledger.receive([1u8; 20], U256::from(50)).await;
        let err = ledger.pay([1u8; 20], U256::from(51)).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(ledger.pot(), U256::from(50));
    }

    #[tokio::test]
    async fn test_rejection_toggle() {
        let ledger = InMemoryLedger::new();
        ledger.receive([1u8; 20], U256::from(50)).await;
        ledger.set_reject_payouts(true);
        assert!(ledger.pay([1u8; 20], U256::from(50)).await.is_err());
        ledger.set_reject_payouts(false);
        assert!(ledger.pay([1u8; 20], U256::from(50)).await.is_ok());
    }
}
