//! Mock randomness coordinator
//!
//! Stands in for the external VRF oracle: assigns sequential request ids,
//! tracks outstanding requests, and delivers random words back to the
//! consumer on demand. Delivery of a request id the coordinator never
//! issued is rejected on the coordinator side, independent of the engine's
//! own pending-request validation.

use crate::domain::{Address, RequestId};
use crate::error::{CoordinatorError, RaffleError};
use crate::ports::{RaffleApi, RandomnessCoordinator, RandomnessRequest};
use async_trait::async_trait;
use primitive_types::U256;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// In-process stand-in for the VRF coordinator
#[derive(Debug, Default)]
pub struct MockVrfCoordinator {
    /// Next request id to assign; ids start at 1
    next_id: AtomicU64,

    /// Requests issued but not yet fulfilled
    outstanding: Mutex<HashMap<RequestId, RandomnessRequest>>,

    /// When set, every request fails as unavailable
    fail_requests: AtomicBool,
}

impl MockVrfCoordinator {
    /// Create a new mock coordinator
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle request failure injection
    pub fn set_fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// Number of issued-but-unfulfilled requests
    pub fn outstanding_count(&self) -> usize {
        self.outstanding.lock().unwrap().len()
    }

    /// Deliver random words for an outstanding request by invoking the
    /// consumer's fulfillment callback. The request stays outstanding until
    /// the consumer accepts it, so a failed payout can be redelivered.
    pub async fn deliver(
        &self,
        request_id: RequestId,
        random_words: Vec<U256>,
        consumer: &dyn RaffleApi,
    ) -> Result<Address, RaffleError> {
        {
            let outstanding = self.outstanding.lock().unwrap();
            if !outstanding.contains_key(&request_id) {
                return Err(CoordinatorError::NonexistentRequest { request_id }.into());
            }
        }

        let winner = consumer.fulfill_randomness(request_id, random_words).await?;
        self.outstanding.lock().unwrap().remove(&request_id);
        debug!("[vrf-mock] Request {} fulfilled", request_id);
        Ok(winner)
    }
}

#[async_trait]
impl RandomnessCoordinator for MockVrfCoordinator {
    async fn request_random_words(
        &self,
        request: RandomnessRequest,
    ) -> Result<RequestId, CoordinatorError> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(CoordinatorError::Unavailable(
                "request failure injected".into(),
            ));
        }

        let request_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            "[vrf-mock] Request {} accepted (sub: {}, words: {})",
            request_id, request.subscription_id, request.num_words
        );
        self.outstanding.lock().unwrap().insert(request_id, request);
        Ok(request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RandomnessRequest {
        RandomnessRequest {
            gas_lane: Default::default(),
            subscription_id: 1,
            min_confirmations: 3,
            callback_gas_budget: 500_000,
            num_words: 1,
        }
    }

    #[tokio::test]
    async fn test_sequential_ids_from_one() {
        let coordinator = MockVrfCoordinator::new();
        let first = coordinator.request_random_words(request()).await.unwrap();
        let second = coordinator.request_random_words(request()).await.unwrap();
        assert_eq!(first, 1);
        assert_eq!(second, 2);
        assert_eq!(coordinator.outstanding_count(), 2);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let coordinator = MockVrfCoordinator::new();
        coordinator.set_fail_requests(true);
        let err = coordinator.request_random_words(request()).await.unwrap_err();
        assert!(matches!(err, CoordinatorError::Unavailable(_)));
        assert_eq!(coordinator.outstanding_count(), 0);
    }
}
