//! Claims Domain Ports
//!
//! Port traits for everything the engine needs from outside: the claim
//! store, the external fraud scorer, and the document store.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_claims::ports::{ClaimStore, FraudScorer, DocumentStore};
//! use std::sync::Arc;
//!
//! let lifecycle = ClaimLifecycle::new(
//!     Arc::new(PgClaimStore::new(pool)),
//!     Arc::new(HttpFraudScorer::new(scorer_config)?),
//!     Arc::new(LocalDocumentStore::new(root, base_url)),
//! );
//! ```

use async_trait::async_trait;

use core_kernel::{ClaimId, DomainPort, HealthCheckable, PortError, UserId};

use crate::claim::{Claim, ClaimStatus};
use crate::fraud::{ScoreResponse, ScoringRequest};

/// The part of a claim a transition rewrites
///
/// Stores write only the fields the change owns, so a transition working
/// from a stale read never reverts fields another transition wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimChange {
    /// Fraud probability and prediction
    Assessment,
    /// Status, rejection reason and reviewer
    Decision,
    /// Bank account number and IFSC code
    PayoutAccount,
}

impl ClaimChange {
    /// Copies the fields this change owns, and `updated_at`, from `source`
    /// onto `target`
    pub fn apply(&self, source: &Claim, target: &mut Claim) {
        match self {
            ClaimChange::Assessment => target.fraud = source.fraud,
            ClaimChange::Decision => {
                target.status = source.status;
                target.rejection_reason = source.rejection_reason.clone();
                target.review = source.review;
            }
            ClaimChange::PayoutAccount => target.payout = source.payout.clone(),
        }
        target.updated_at = source.updated_at;
    }
}

/// Condition a stored claim must satisfy for an update to apply
///
/// Adapters evaluate it atomically with the write and report a failed
/// condition as `PortError::Conflict`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteCondition {
    /// Status the stored claim must still have
    pub status: ClaimStatus,
    /// Require that no payout account is stored yet
    pub payout_unset: bool,
}

impl WriteCondition {
    pub fn status_is(status: ClaimStatus) -> Self {
        Self {
            status,
            payout_unset: false,
        }
    }

    pub fn approved_without_payout() -> Self {
        Self {
            status: ClaimStatus::Approved,
            payout_unset: true,
        }
    }

    /// Evaluates the condition against a stored claim
    pub fn holds_for(&self, stored: &Claim) -> bool {
        stored.status == self.status && (!self.payout_unset || stored.payout.is_none())
    }
}

/// Query parameters for listing claims
#[derive(Debug, Clone, Default)]
pub struct ClaimQuery {
    /// Only claims filed by this holder
    pub policy_holder_id: Option<UserId>,
    pub status: Option<ClaimStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ClaimQuery {
    pub fn by_holder(holder: UserId) -> Self {
        Self {
            policy_holder_id: Some(holder),
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: Option<ClaimStatus>) -> Self {
        self.status = status;
        self
    }

    /// Adds pagination to the query
    pub fn paginate(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }
}

/// Persistence for claims
///
/// `update` must apply the write only if `condition` holds for the stored
/// claim, atomically. This is the optimistic concurrency control every
/// transition relies on.
#[async_trait]
pub trait ClaimStore: DomainPort + HealthCheckable {
    /// Returns the claim or `PortError::NotFound`
    async fn get(&self, id: ClaimId) -> Result<Claim, PortError>;

    async fn insert(&self, claim: &Claim) -> Result<(), PortError>;

    /// Writes the fields `change` owns from `claim` when `condition` holds,
    /// otherwise fails with `PortError::Conflict` (or `NotFound` if the
    /// claim is gone)
    async fn update(
        &self,
        claim: &Claim,
        change: ClaimChange,
        condition: WriteCondition,
    ) -> Result<(), PortError>;

    /// Newest first
    async fn list(&self, query: ClaimQuery) -> Result<Vec<Claim>, PortError>;
}

/// External fraud-scoring model
#[async_trait]
pub trait FraudScorer: DomainPort + HealthCheckable {
    async fn score(&self, request: &ScoringRequest) -> Result<ScoreResponse, PortError>;
}

/// Blob storage for supporting documents
#[async_trait]
pub trait DocumentStore: DomainPort + HealthCheckable {
    /// Stores `bytes` under `path` and returns an opaque URI for them
    async fn put(
        &self,
        path: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, PortError>;

    /// Removes the blob at `path`. Removing a missing blob succeeds.
    async fn delete(&self, path: &str) -> Result<(), PortError>;
}

/// In-memory port implementations for tests
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{Barrier, Mutex, RwLock};

    use core_kernel::{AdapterHealth, HealthCheckResult};

    /// In-memory claim store honouring write conditions
    #[derive(Debug, Default)]
    pub struct MockClaimStore {
        claims: Arc<RwLock<HashMap<ClaimId, Claim>>>,
        write_barrier: Option<Arc<Barrier>>,
        failing_inserts: AtomicBool,
    }

    impl MockClaimStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store
        pub async fn with_claims(claims: Vec<Claim>) -> Self {
            let store = Self::new();
            {
                let mut stored = store.claims.write().await;
                for claim in claims {
                    stored.insert(claim.id, claim);
                }
            }
            store
        }

        /// Makes every `update` wait until `writers` updates are in flight,
        /// so racing transitions all read before any of them writes
        pub fn with_write_barrier(mut self, writers: usize) -> Self {
            self.write_barrier = Some(Arc::new(Barrier::new(writers)));
            self
        }

        /// While set, every `insert` fails with a connection error
        pub fn set_failing_inserts(&self, failing: bool) {
            self.failing_inserts.store(failing, Ordering::SeqCst);
        }

        /// Current stored state of a claim
        pub async fn stored(&self, id: ClaimId) -> Option<Claim> {
            self.claims.read().await.get(&id).cloned()
        }

        pub async fn len(&self) -> usize {
            self.claims.read().await.len()
        }
    }

    impl DomainPort for MockClaimStore {}

    #[async_trait]
    impl HealthCheckable for MockClaimStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::new("mock-claim-store", AdapterHealth::Healthy, 0)
                .with_message("Mock adapter always healthy")
        }
    }

    #[async_trait]
    impl ClaimStore for MockClaimStore {
        async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
            self.claims
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Claim", id))
        }

        async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
            if self.failing_inserts.load(Ordering::SeqCst) {
                return Err(PortError::connection("claim store unreachable"));
            }
            let mut claims = self.claims.write().await;
            if claims.contains_key(&claim.id) {
                return Err(PortError::conflict(format!("claim {} already exists", claim.id)));
            }
            claims.insert(claim.id, claim.clone());
            Ok(())
        }

        async fn update(
            &self,
            claim: &Claim,
            change: ClaimChange,
            condition: WriteCondition,
        ) -> Result<(), PortError> {
            if let Some(barrier) = &self.write_barrier {
                barrier.wait().await;
            }
            let mut claims = self.claims.write().await;
            let stored = claims
                .get_mut(&claim.id)
                .ok_or_else(|| PortError::not_found("Claim", claim.id))?;
            if !condition.holds_for(stored) {
                return Err(PortError::conflict(format!(
                    "claim {} is {}, expected {}",
                    claim.id, stored.status, condition.status
                )));
            }
            change.apply(claim, stored);
            Ok(())
        }

        async fn list(&self, query: ClaimQuery) -> Result<Vec<Claim>, PortError> {
            let claims = self.claims.read().await;
            let mut results: Vec<Claim> = claims
                .values()
                .filter(|c| query.policy_holder_id.map_or(true, |h| c.policy_holder_id == h))
                .filter(|c| query.status.map_or(true, |s| c.status == s))
                .cloned()
                .collect();
            results.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

            let offset = query.offset.unwrap_or(0) as usize;
            let limit = query.limit.map_or(usize::MAX, |l| l as usize);
            Ok(results.into_iter().skip(offset).take(limit).collect())
        }
    }

    /// Scorer that replays scripted outcomes
    ///
    /// Once the script is exhausted every call returns `default_score`.
    #[derive(Debug)]
    pub struct MockFraudScorer {
        script: Mutex<VecDeque<Result<ScoreResponse, PortError>>>,
        requests: Mutex<Vec<ScoringRequest>>,
        default_score: ScoreResponse,
        calls: AtomicUsize,
    }

    impl Default for MockFraudScorer {
        fn default() -> Self {
            Self {
                script: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
                default_score: ScoreResponse { probability: 0.1, prediction: 0 },
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl MockFraudScorer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Always answers with the given score
        pub fn always(probability: f64, prediction: i32) -> Self {
            Self {
                default_score: ScoreResponse { probability, prediction },
                ..Self::default()
            }
        }

        pub async fn push_score(&self, probability: f64, prediction: i32) {
            self.script
                .lock()
                .await
                .push_back(Ok(ScoreResponse { probability, prediction }));
        }

        pub async fn push_failure(&self, error: PortError) {
            self.script.lock().await.push_back(Err(error));
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub async fn requests(&self) -> Vec<ScoringRequest> {
            self.requests.lock().await.clone()
        }
    }

    impl DomainPort for MockFraudScorer {}

    #[async_trait]
    impl HealthCheckable for MockFraudScorer {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::new("mock-fraud-scorer", AdapterHealth::Healthy, 0)
        }
    }

    #[async_trait]
    impl FraudScorer for MockFraudScorer {
        async fn score(&self, request: &ScoringRequest) -> Result<ScoreResponse, PortError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requests.lock().await.push(request.clone());
            match self.script.lock().await.pop_front() {
                Some(outcome) => outcome,
                None => Ok(self.default_score),
            }
        }
    }

    /// Document store keeping blobs in memory
    #[derive(Debug, Default)]
    pub struct MockDocumentStore {
        blobs: Arc<RwLock<HashMap<String, Vec<u8>>>>,
        failing: AtomicBool,
        puts: AtomicUsize,
        put_limit: Option<usize>,
    }

    impl MockDocumentStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// While set, every `put` fails with a connection error
        pub fn set_failing(&self, failing: bool) {
            self.failing.store(failing, Ordering::SeqCst);
        }

        /// Accepts the first `puts` uploads and fails every one after them
        pub fn failing_after(mut self, puts: usize) -> Self {
            self.put_limit = Some(puts);
            self
        }

        pub async fn paths(&self) -> Vec<String> {
            let mut paths: Vec<String> = self.blobs.read().await.keys().cloned().collect();
            paths.sort();
            paths
        }
    }

    impl DomainPort for MockDocumentStore {}

    #[async_trait]
    impl HealthCheckable for MockDocumentStore {
        async fn health_check(&self) -> HealthCheckResult {
            let status = if self.failing.load(Ordering::SeqCst) {
                AdapterHealth::Unhealthy
            } else {
                AdapterHealth::Healthy
            };
            HealthCheckResult::new("mock-document-store", status, 0)
        }
    }

    #[async_trait]
    impl DocumentStore for MockDocumentStore {
        async fn put(
            &self,
            path: &str,
            _content_type: Option<&str>,
            bytes: Vec<u8>,
        ) -> Result<String, PortError> {
            let attempt = self.puts.fetch_add(1, Ordering::SeqCst);
            let over_limit = self.put_limit.map_or(false, |limit| attempt >= limit);
            if self.failing.load(Ordering::SeqCst) || over_limit {
                return Err(PortError::connection("document store unreachable"));
            }
            self.blobs.write().await.insert(path.to_string(), bytes);
            Ok(format!("mem://{}", path))
        }

        async fn delete(&self, path: &str) -> Result<(), PortError> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PortError::connection("document store unreachable"));
            }
            self.blobs.write().await.remove(path);
            Ok(())
        }
    }
}
