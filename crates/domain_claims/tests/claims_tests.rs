//! Lifecycle tests for domain_claims against the in-memory ports

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use std::sync::Arc;

use core_kernel::{ClaimId, PortError, UserId};

use domain_claims::ports::mock::{MockClaimStore, MockDocumentStore, MockFraudScorer};
use domain_claims::{
    Actor, Claim, ClaimChange, ClaimError, ClaimLifecycle, ClaimStatus, ClaimStore,
    ClaimSubmission, DocumentKind, DocumentUpload, FraudTier, InsuranceCompany,
    PreconditionViolation, WriteCondition,
};
use test_utils::{
    assert_claim_invariants, assert_forbidden, assert_newest_first, assert_precondition,
    assert_status, assert_validation_error, ClaimBuilder, FraudFixtures,
};

// ============================================================================
// Fixtures
// ============================================================================

struct Harness {
    lifecycle: Arc<ClaimLifecycle>,
    store: Arc<MockClaimStore>,
    scorer: Arc<MockFraudScorer>,
    documents: Arc<MockDocumentStore>,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(MockClaimStore::new())
    }

    fn with_store(store: MockClaimStore) -> Self {
        Self::with_ports(store, MockDocumentStore::new())
    }

    fn with_ports(store: MockClaimStore, documents: MockDocumentStore) -> Self {
        let store = Arc::new(store);
        let scorer = Arc::new(MockFraudScorer::new());
        let documents = Arc::new(documents);
        let lifecycle = Arc::new(ClaimLifecycle::new(
            store.clone(),
            scorer.clone(),
            documents.clone(),
        ));
        Self {
            lifecycle,
            store,
            scorer,
            documents,
        }
    }

    async fn file(&self, holder: &Actor) -> Claim {
        self.lifecycle
            .create(holder, submission(), Vec::new())
            .await
            .expect("claim should be filed")
    }

    async fn file_and_verify(&self, holder: &Actor, worker: &Actor, probability: f64) -> Claim {
        let claim = self.file(holder).await;
        self.scorer.push_score(probability, 0).await;
        self.lifecycle.verify(worker, claim.id).await.expect("verify should succeed")
    }

    async fn stored(&self, id: ClaimId) -> Claim {
        self.store.stored(id).await.expect("claim should be stored")
    }
}

fn submission() -> ClaimSubmission {
    ClaimSubmission {
        claim_amount: Some(dec!(85000)),
        policy_number: "P/141113/01/2025/012345".to_string(),
        admission_date: NaiveDate::from_ymd_opt(2025, 3, 2),
        discharge_date: NaiveDate::from_ymd_opt(2025, 3, 7),
        hospital_name: "Apollo Hospital".to_string(),
        patient_name: "Meera Shah".to_string(),
        patient_age: Some(58),
        diagnosis: "Coronary artery disease".to_string(),
        treatment_type: "Angioplasty".to_string(),
        doctor_name: "Dr. Kapoor".to_string(),
        ..Default::default()
    }
}

fn holder() -> Actor {
    Actor::policy_holder(UserId::new())
}

fn worker() -> Actor {
    Actor::insurance_worker(UserId::new())
}

// ============================================================================
// Create
// ============================================================================

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_files_claim_under_review() {
        let h = Harness::new();
        let filer = holder();
        let uploads = vec![
            DocumentUpload::new(DocumentKind::IdProof, "aadhaar.png", vec![1, 2]),
            DocumentUpload::new(DocumentKind::PharmacyBill, "bill-1.pdf", vec![3]),
            DocumentUpload::new(DocumentKind::PharmacyBill, "bill-2.pdf", vec![4]),
        ];

        let claim = h.lifecycle.create(&filer, submission(), uploads).await.unwrap();

        assert_status(&claim, ClaimStatus::UnderReview);
        assert_claim_invariants(&claim);
        assert_eq!(claim.policy_holder_id, filer.id);
        assert_eq!(claim.insurance_company, InsuranceCompany::StarHealth);
        assert_eq!(claim.stay_duration_days(), 5);
        assert!(claim.fraud.is_none());
        assert!(claim.review.is_none());
        assert!(claim.rejection_reason.is_none());
        assert_eq!(claim.documents.count(DocumentKind::PharmacyBill), 2);

        let id_proof = claim.documents.id_proof.as_deref().unwrap();
        let prefix = format!("mem://{}/id-proof-", filer.id.as_uuid());
        assert!(id_proof.starts_with(&prefix), "{}", id_proof);
        assert!(id_proof.ends_with("-aadhaar.png"));

        assert_eq!(h.stored(claim.id).await, claim);
        assert_eq!(h.documents.paths().await.len(), 3);
    }

    #[tokio::test]
    async fn test_workers_cannot_file_claims() {
        let h = Harness::new();
        let err = h.lifecycle.create(&worker(), submission(), vec![]).await.unwrap_err();
        assert_forbidden(&err);
        assert_eq!(h.store.len().await, 0);
    }

    #[tokio::test]
    async fn test_validation_runs_before_any_upload() {
        let h = Harness::new();
        let invalid = ClaimSubmission {
            policy_number: "ABC".to_string(),
            ..submission()
        };
        let uploads = vec![DocumentUpload::new(DocumentKind::HospitalBill, "bill.pdf", vec![9])];

        let err = h.lifecycle.create(&holder(), invalid, uploads).await.unwrap_err();

        assert_validation_error(&err, "policy_number");
        assert!(h.documents.paths().await.is_empty());
        assert_eq!(h.store.len().await, 0);
    }

    #[tokio::test]
    async fn test_duplicate_single_kind_upload_is_rejected() {
        let h = Harness::new();
        let uploads = vec![
            DocumentUpload::new(DocumentKind::DischargeSummary, "a.pdf", vec![1]),
            DocumentUpload::new(DocumentKind::DischargeSummary, "b.pdf", vec![2]),
        ];
        let err = h.lifecycle.create(&holder(), submission(), uploads).await.unwrap_err();
        assert_validation_error(&err, "discharge_summary");
        assert!(h.documents.paths().await.is_empty());
    }

    #[tokio::test]
    async fn test_document_store_failure_is_retryable_and_stores_nothing() {
        let h = Harness::new();
        h.documents.set_failing(true);
        let uploads = vec![DocumentUpload::new(DocumentKind::Prescription, "rx.jpg", vec![1])];

        let err = h.lifecycle.create(&holder(), submission(), uploads).await.unwrap_err();

        assert!(matches!(err, ClaimError::Dependency { .. }));
        assert!(err.is_retryable());
        assert_eq!(h.store.len().await, 0);
    }

    #[tokio::test]
    async fn test_failed_upload_removes_documents_already_stored() {
        let h = Harness::with_ports(MockClaimStore::new(), MockDocumentStore::new().failing_after(2));
        let uploads = vec![
            DocumentUpload::new(DocumentKind::HospitalBill, "bill.pdf", vec![1]),
            DocumentUpload::new(DocumentKind::PharmacyBill, "pharmacy.jpg", vec![2]),
            DocumentUpload::new(DocumentKind::Prescription, "rx.jpg", vec![3]),
        ];

        let err = h.lifecycle.create(&holder(), submission(), uploads).await.unwrap_err();

        assert!(err.is_retryable());
        assert!(h.documents.paths().await.is_empty());
        assert_eq!(h.store.len().await, 0);
    }

    #[tokio::test]
    async fn test_failed_insert_removes_uploaded_documents() {
        let h = Harness::new();
        h.store.set_failing_inserts(true);
        let uploads = vec![
            DocumentUpload::new(DocumentKind::IdProof, "pan.png", vec![1]),
            DocumentUpload::new(DocumentKind::DischargeSummary, "summary.pdf", vec![2]),
        ];

        let err = h.lifecycle.create(&holder(), submission(), uploads).await.unwrap_err();

        assert!(matches!(err, ClaimError::Dependency { .. }));
        assert!(h.documents.paths().await.is_empty());
        assert_eq!(h.store.len().await, 0);
    }

    #[tokio::test]
    async fn test_bank_details_may_be_given_at_submission() {
        let h = Harness::new();
        let with_bank = ClaimSubmission {
            account_number: Some("5011002233".to_string()),
            ifsc_code: Some("ICIC0000104".to_string()),
            ..submission()
        };
        let claim = h.lifecycle.create(&holder(), with_bank, vec![]).await.unwrap();
        let payout = claim.payout.as_ref().unwrap();
        assert_eq!(payout.masked_account_number(), "****2233");
    }
}

// ============================================================================
// Verify
// ============================================================================

mod verify_tests {
    use super::*;

    #[tokio::test]
    async fn test_verify_twice_keeps_only_latest_assessment() {
        let h = Harness::new();
        let (filer, reviewer) = (holder(), worker());
        let claim = h.file(&filer).await;

        h.scorer.push_score(0.2, 0).await;
        h.scorer.push_score(0.7, 1).await;
        h.lifecycle.verify(&reviewer, claim.id).await.unwrap();
        let verified = h.lifecycle.verify(&reviewer, claim.id).await.unwrap();

        let stored = h.stored(claim.id).await;
        assert_eq!(stored, verified);
        assert_eq!(stored.fraud.unwrap().probability(), 0.7);
        assert_eq!(stored.fraud_tier(), Some(FraudTier::Suspicious));
        assert_eq!(stored.status, ClaimStatus::UnderReview);
        assert_eq!(h.scorer.calls(), 2);
    }

    #[tokio::test]
    async fn test_scoring_request_carries_claim_attributes() {
        let h = Harness::new();
        let filer = holder();
        let uploads = vec![
            DocumentUpload::new(DocumentKind::DiagnosticReport, "ecg.pdf", vec![1]),
            DocumentUpload::new(DocumentKind::DiagnosticReport, "echo.pdf", vec![2]),
        ];
        let claim = h.lifecycle.create(&filer, submission(), uploads).await.unwrap();

        h.lifecycle.verify(&worker(), claim.id).await.unwrap();

        let requests = h.scorer.requests().await;
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request.claim_id, claim.id);
        assert_eq!(request.claim_amount, dec!(85000));
        assert_eq!(request.stay_duration_days, 5);
        assert_eq!(request.patient_age, 58);
        assert_eq!(request.document_counts.diagnostic_report, 2);
        assert_eq!(request.document_counts.id_proof, 0);
    }

    #[tokio::test]
    async fn test_scorer_failure_leaves_claim_untouched() {
        let h = Harness::new();
        let claim = h.file(&holder()).await;
        h.scorer
            .push_failure(PortError::Timeout {
                operation: "score".to_string(),
                duration_ms: 10_000,
            })
            .await;

        let err = h.lifecycle.verify(&worker(), claim.id).await.unwrap_err();

        assert!(matches!(err, ClaimError::Dependency { .. }));
        assert!(err.is_retryable());
        assert_eq!(h.stored(claim.id).await, claim);
    }

    #[tokio::test]
    async fn test_out_of_range_score_is_a_dependency_failure() {
        let h = Harness::new();
        let claim = h.file(&holder()).await;
        h.scorer.push_score(1.7, 1).await;

        let err = h.lifecycle.verify(&worker(), claim.id).await.unwrap_err();

        assert!(matches!(err, ClaimError::Dependency { .. }));
        assert!(!err.is_retryable());
        assert!(h.stored(claim.id).await.fraud.is_none());
    }

    #[tokio::test]
    async fn test_permanent_scorer_failure_is_not_retryable() {
        let h = Harness::new();
        let claim = h.file(&holder()).await;
        h.scorer
            .push_failure(PortError::internal("model rejected the request"))
            .await;

        let err = h.lifecycle.verify(&worker(), claim.id).await.unwrap_err();

        assert!(matches!(err, ClaimError::Dependency { retryable: false, .. }));
        let stored = h.stored(claim.id).await;
        assert_eq!(stored.status, ClaimStatus::UnderReview);
        assert_eq!(stored, claim);
    }

    #[tokio::test]
    async fn test_holders_cannot_verify() {
        let h = Harness::new();
        let filer = holder();
        let claim = h.file(&filer).await;
        let err = h.lifecycle.verify(&filer, claim.id).await.unwrap_err();
        assert_forbidden(&err);
        assert_eq!(h.scorer.calls(), 0);
    }

    #[tokio::test]
    async fn test_verify_unknown_claim_is_not_found() {
        let h = Harness::new();
        let missing = ClaimId::new();
        let err = h.lifecycle.verify(&worker(), missing).await.unwrap_err();
        assert!(matches!(err, ClaimError::NotFound(id) if id == missing));
    }
}

// ============================================================================
// Decisions
// ============================================================================

mod decision_tests {
    use super::*;

    #[tokio::test]
    async fn test_approve_requires_verification() {
        let h = Harness::new();
        let reviewer = worker();
        let claim = h.file(&holder()).await;

        let err = h.lifecycle.approve(&reviewer, claim.id).await.unwrap_err();
        assert_precondition(&err, &PreconditionViolation::NotVerified);

        h.scorer.push_score(0.82, 1).await;
        h.lifecycle.verify(&reviewer, claim.id).await.unwrap();
        let approved = h.lifecycle.approve(&reviewer, claim.id).await.unwrap();

        assert_status(&approved, ClaimStatus::Approved);
        assert_claim_invariants(&approved);
        let review = approved.review.unwrap();
        assert_eq!(review.reviewed_by, reviewer.id);
        assert_eq!(h.stored(claim.id).await.status, ClaimStatus::Approved);
    }

    #[tokio::test]
    async fn test_holders_cannot_approve() {
        let h = Harness::new();
        let filer = holder();
        let claim = h.file_and_verify(&filer, &worker(), 0.1).await;
        let err = h.lifecycle.approve(&filer, claim.id).await.unwrap_err();
        assert_forbidden(&err);
        assert_eq!(h.stored(claim.id).await.status, ClaimStatus::UnderReview);
    }

    #[tokio::test]
    async fn test_reject_with_blank_reason_fails_validation() {
        let h = Harness::new();
        let reviewer = worker();
        let claim = h.file_and_verify(&holder(), &reviewer, 0.4).await;

        for reason in ["", "   \n"] {
            let err = h.lifecycle.reject(&reviewer, claim.id, reason).await.unwrap_err();
            assert_validation_error(&err, "rejection_reason");
        }
        assert_status(&h.stored(claim.id).await, ClaimStatus::UnderReview);
    }

    #[tokio::test]
    async fn test_reject_stores_trimmed_reason() {
        let h = Harness::new();
        let reviewer = worker();
        let claim = h.file_and_verify(&holder(), &reviewer, 0.65).await;

        let rejected = h
            .lifecycle
            .reject(&reviewer, claim.id, "  Bill totals do not match  ")
            .await
            .unwrap();

        assert_eq!(rejected.status, ClaimStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("Bill totals do not match"));
        assert_claim_invariants(&h.stored(claim.id).await);
    }

    #[tokio::test]
    async fn test_terminal_claims_admit_no_transition() {
        let h = Harness::new();
        let reviewer = worker();
        let claim = h.file_and_verify(&holder(), &reviewer, 0.1).await;
        h.lifecycle.approve(&reviewer, claim.id).await.unwrap();

        let err = h.lifecycle.reject(&reviewer, claim.id, "changed my mind").await.unwrap_err();
        assert_precondition(
            &err,
            &PreconditionViolation::NotUnderReview {
                status: ClaimStatus::Approved,
                action: "rejected",
            },
        );

        let err = h.lifecycle.verify(&reviewer, claim.id).await.unwrap_err();
        assert!(matches!(err, ClaimError::Precondition(_)));
        assert_eq!(h.scorer.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_decisions_exactly_one_wins() {
        let setup = Harness::new();
        let filer = holder();
        let verified = setup.file_and_verify(&filer, &worker(), 0.35).await;

        let store = MockClaimStore::with_claims(vec![verified.clone()])
            .await
            .with_write_barrier(2);
        let h = Harness::with_store(store);

        let approver = h.lifecycle.clone();
        let rejecter = h.lifecycle.clone();
        let (a, b) = (worker(), worker());
        let id = verified.id;
        let approve = tokio::spawn(async move { approver.approve(&a, id).await });
        let reject = tokio::spawn(async move { rejecter.reject(&b, id, "Duplicate claim").await });

        let results = [approve.await.unwrap(), reject.await.unwrap()];
        let wins = results.iter().filter(|r| r.is_ok()).count();
        let conflicts = results
            .iter()
            .filter(|r| matches!(r, Err(ClaimError::Conflict { .. })))
            .count();
        assert_eq!(wins, 1);
        assert_eq!(conflicts, 1);

        let stored = h.stored(id).await;
        assert!(stored.status.is_terminal());
        assert_claim_invariants(&stored);
    }

    #[tokio::test]
    async fn test_decision_from_stale_read_keeps_newer_assessment() {
        let claim = ClaimBuilder::new().verified(FraudFixtures::genuine()).build();
        let store = MockClaimStore::with_claims(vec![claim.clone()]).await;
        let under_review = WriteCondition::status_is(ClaimStatus::UnderReview);

        let mut rescored = claim.clone();
        rescored
            .record_assessment(FraudFixtures::review(), chrono::Utc::now())
            .unwrap();
        store
            .update(&rescored, ClaimChange::Assessment, under_review)
            .await
            .unwrap();

        let mut stale = claim.clone();
        stale.approve(worker().id, chrono::Utc::now()).unwrap();
        store.update(&stale, ClaimChange::Decision, under_review).await.unwrap();

        let stored = store.stored(claim.id).await.unwrap();
        assert_status(&stored, ClaimStatus::Approved);
        assert_eq!(stored.fraud, Some(FraudFixtures::review()));
        assert_claim_invariants(&stored);
    }
}

// ============================================================================
// Payout account
// ============================================================================

mod payout_tests {
    use super::*;

    async fn approved(h: &Harness, filer: &Actor) -> Claim {
        let reviewer = worker();
        let claim = h.file_and_verify(filer, &reviewer, 0.05).await;
        h.lifecycle.approve(&reviewer, claim.id).await.unwrap()
    }

    #[tokio::test]
    async fn test_second_payout_write_fails_and_keeps_original() {
        let h = Harness::new();
        let filer = holder();
        let claim = approved(&h, &filer).await;

        h.lifecycle
            .add_payout_account(&filer, claim.id, "123456789012", "SBIN0001234")
            .await
            .unwrap();
        let err = h
            .lifecycle
            .add_payout_account(&filer, claim.id, "999999999999", "HDFC0000001")
            .await
            .unwrap_err();

        assert_precondition(&err, &PreconditionViolation::PayoutAlreadySet);
        let payout = h.stored(claim.id).await.payout.unwrap();
        assert_eq!(payout.account_number(), "123456789012");
        assert_eq!(payout.ifsc_code(), "SBIN0001234");
    }

    #[tokio::test]
    async fn test_payout_requires_approval() {
        let h = Harness::new();
        let filer = holder();
        let claim = h.file(&filer).await;

        let err = h
            .lifecycle
            .add_payout_account(&filer, claim.id, "123", "SBIN0001234")
            .await
            .unwrap_err();
        assert_precondition(
            &err,
            &PreconditionViolation::NotApproved {
                status: ClaimStatus::UnderReview,
            },
        );
    }

    #[tokio::test]
    async fn test_only_the_filer_may_add_payout() {
        let h = Harness::new();
        let claim = approved(&h, &holder()).await;

        let err = h
            .lifecycle
            .add_payout_account(&holder(), claim.id, "123", "SBIN0001234")
            .await
            .unwrap_err();
        assert_forbidden(&err);

        let err = h
            .lifecycle
            .add_payout_account(&worker(), claim.id, "123", "SBIN0001234")
            .await
            .unwrap_err();
        assert_forbidden(&err);
        assert!(h.stored(claim.id).await.payout.is_none());
    }

    #[tokio::test]
    async fn test_payout_given_at_submission_cannot_be_replaced() {
        let h = Harness::new();
        let filer = holder();
        let reviewer = worker();
        let with_bank = ClaimSubmission {
            account_number: Some("5011002233".to_string()),
            ifsc_code: Some("ICIC0000104".to_string()),
            ..submission()
        };
        let claim = h.lifecycle.create(&filer, with_bank, vec![]).await.unwrap();
        h.lifecycle.verify(&reviewer, claim.id).await.unwrap();
        h.lifecycle.approve(&reviewer, claim.id).await.unwrap();

        let err = h
            .lifecycle
            .add_payout_account(&filer, claim.id, "1", "X")
            .await
            .unwrap_err();
        assert_precondition(&err, &PreconditionViolation::PayoutAlreadySet);
    }

    #[tokio::test]
    async fn test_payout_fields_are_validated() {
        let h = Harness::new();
        let filer = holder();
        let claim = approved(&h, &filer).await;
        let err = h
            .lifecycle
            .add_payout_account(&filer, claim.id, "   ", "SBIN0001234")
            .await
            .unwrap_err();
        assert_validation_error(&err, "account_number");
    }
}

// ============================================================================
// Reads
// ============================================================================

mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_holders_read_only_their_own_claims() {
        let h = Harness::new();
        let (alice, bob) = (holder(), holder());
        let claim = h.file(&alice).await;

        assert_eq!(h.lifecycle.get(&alice, claim.id).await.unwrap().id, claim.id);
        assert!(h.lifecycle.get(&worker(), claim.id).await.is_ok());
        let err = h.lifecycle.get(&bob, claim.id).await.unwrap_err();
        assert_forbidden(&err);
    }

    #[tokio::test]
    async fn test_list_scopes_by_role_and_status() {
        let h = Harness::new();
        let (alice, bob, reviewer) = (holder(), holder(), worker());
        let first = h.file_and_verify(&alice, &reviewer, 0.1).await;
        h.lifecycle.approve(&reviewer, first.id).await.unwrap();
        h.file(&alice).await;
        h.file(&bob).await;

        assert_eq!(h.lifecycle.list(&alice, None).await.unwrap().len(), 2);
        assert_eq!(h.lifecycle.list(&bob, None).await.unwrap().len(), 1);
        assert_eq!(h.lifecycle.list(&reviewer, None).await.unwrap().len(), 3);

        let approved = h
            .lifecycle
            .list(&reviewer, Some(ClaimStatus::Approved))
            .await
            .unwrap();
        assert_eq!(approved.len(), 1);
        assert_eq!(approved[0].id, first.id);

        assert_newest_first(&h.lifecycle.list(&reviewer, None).await.unwrap());
    }

    #[tokio::test]
    async fn test_health_reports_every_collaborator() {
        let h = Harness::new();
        let results = h.lifecycle.health().await;
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| r.is_healthy()));
    }
}

// ============================================================================
// Property tests: invariants survive any operation sequence
// ============================================================================

mod invariant_properties {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Verify(f64),
        Approve,
        Reject(String),
        Payout(String, String),
        ForeignPayout,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0.0f64..=1.0).prop_map(Op::Verify),
            Just(Op::Approve),
            "[ a-z]{0,12}".prop_map(Op::Reject),
            ("[0-9]{0,22}", "[A-Z0-9]{0,22}").prop_map(|(a, i)| Op::Payout(a, i)),
            Just(Op::ForeignPayout),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_invariants_hold_after_every_operation(ops in prop::collection::vec(op(), 1..12)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let h = Harness::new();
                let (filer, reviewer) = (holder(), worker());
                let claim = h.file(&filer).await;
                let mut decided_as: Option<ClaimStatus> = None;
                let mut payout: Option<(String, String)> = None;

                for op in ops {
                    let _ = match &op {
                        Op::Verify(p) => {
                            h.scorer.push_score(*p, 0).await;
                            h.lifecycle.verify(&reviewer, claim.id).await
                        }
                        Op::Approve => h.lifecycle.approve(&reviewer, claim.id).await,
                        Op::Reject(reason) => h.lifecycle.reject(&reviewer, claim.id, reason).await,
                        Op::Payout(account, ifsc) => {
                            h.lifecycle.add_payout_account(&filer, claim.id, account, ifsc).await
                        }
                        Op::ForeignPayout => {
                            h.lifecycle.add_payout_account(&holder(), claim.id, "1", "X").await
                        }
                    };

                    let stored = h.stored(claim.id).await;
                    assert_claim_invariants(&stored);

                    // terminal states never change once reached
                    if let Some(status) = decided_as {
                        assert_eq!(stored.status, status);
                    } else if stored.status.is_terminal() {
                        decided_as = Some(stored.status);
                    }

                    // the payout account is written at most once
                    let current = stored
                        .payout
                        .as_ref()
                        .map(|p| (p.account_number().to_string(), p.ifsc_code().to_string()));
                    match (&payout, current) {
                        (Some(first), Some(now)) => assert_eq!(first, &now),
                        (Some(_), None) => panic!("payout account was cleared"),
                        (None, now) => payout = now,
                    }
                    if stored.payout.is_some() {
                        assert_eq!(stored.status, ClaimStatus::Approved);
                    }
                }
            });
        }
    }
}

// ============================================================================
// Property tests: generated submissions through create and verify
// ============================================================================

mod generated_submission_properties {
    use super::*;
    use domain_claims::classify;
    use proptest::prelude::*;
    use test_utils::{probability_strategy, valid_submission_strategy};

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn prop_any_valid_submission_files_and_verifies(
            submission in valid_submission_strategy(),
            probability in probability_strategy(),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            runtime.block_on(async {
                let h = Harness::new();
                let (filer, reviewer) = (holder(), worker());
                let expected_company = classify(&submission.policy_number).company;

                let claim = h.lifecycle.create(&filer, submission, Vec::new()).await.unwrap();
                assert_eq!(Some(claim.insurance_company), expected_company);
                assert_status(&claim, ClaimStatus::UnderReview);
                assert_claim_invariants(&claim);

                h.scorer.push_score(probability, i32::from(probability >= 0.6)).await;
                let verified = h.lifecycle.verify(&reviewer, claim.id).await.unwrap();

                assert_eq!(verified.fraud_tier(), Some(FraudTier::from_probability(probability)));
                assert_status(&verified, ClaimStatus::UnderReview);
                assert_claim_invariants(&h.stored(claim.id).await);
            });
        }
    }
}
