//! Claim lifecycle
//!
//! Orchestrates every operation on a claim:
//!
//! ```text
//!   create ──▶ UnderReview ──approve──▶ Approved ──add payout──▶ Approved (+payout)
//!                 │   ▲
//!          verify └───┘ ──reject───▶ Rejected
//! ```
//!
//! Each transition reads the claim, applies the change to the aggregate,
//! checks its invariants, and writes it back conditionally on the status it
//! was read in. A decision that lost a race therefore surfaces as
//! `ClaimError::Conflict` rather than overwriting the winner.

use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, warn};

use core_kernel::{ClaimId, HealthCheckResult, PortError};

use crate::actor::{Actor, Role};
use crate::claim::{validate_rejection_reason, Claim, ClaimStatus};
use crate::documents::{check_uploads, DocumentUpload, SupportingDocuments};
use crate::error::{ClaimError, PreconditionViolation};
use crate::fraud::{FraudAssessment, ScoringRequest};
use crate::payout::PayoutAccountCapture;
use crate::policy_number::{self, PolicyClassification};
use crate::ports::{
    ClaimChange, ClaimQuery, ClaimStore, DocumentStore, FraudScorer, WriteCondition,
};
use crate::submission::{ClaimSubmission, ValidatedSubmission};

enum Decision {
    Approve,
    Reject(String),
}

impl Decision {
    fn name(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject(_) => "reject",
        }
    }
}

/// The claims adjudication engine
pub struct ClaimLifecycle {
    store: Arc<dyn ClaimStore>,
    scorer: Arc<dyn FraudScorer>,
    documents: Arc<dyn DocumentStore>,
    payout: PayoutAccountCapture,
}

impl ClaimLifecycle {
    pub fn new(
        store: Arc<dyn ClaimStore>,
        scorer: Arc<dyn FraudScorer>,
        documents: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            payout: PayoutAccountCapture::new(store.clone()),
            store,
            scorer,
            documents,
        }
    }

    /// Live policy-number feedback. Pure; touches no collaborator.
    pub fn classify_policy_number(&self, raw: &str) -> PolicyClassification {
        policy_number::classify(raw)
    }

    /// Files a new claim
    ///
    /// All fields are validated before any document is uploaded.
    pub async fn create(
        &self,
        actor: &Actor,
        submission: ClaimSubmission,
        uploads: Vec<DocumentUpload>,
    ) -> Result<Claim, ClaimError> {
        actor.require(Role::PolicyHolder, "filing a claim")?;

        let validated = submission.validate().map_err(|e| {
            warn!(actor = %actor.id, field = ?e.field(), "Claim submission rejected: {}", e);
            e
        })?;
        check_uploads(&uploads)?;

        let mut stored_paths = Vec::with_capacity(uploads.len());
        let claim = match self.file(actor, validated, uploads, &mut stored_paths).await {
            Ok(claim) => claim,
            Err(e) => {
                self.discard_documents(&stored_paths).await;
                return Err(e);
            }
        };

        info!(
            claim_id = %claim.id,
            policy_holder = %claim.policy_holder_id,
            insurance_company = %claim.insurance_company,
            amount = %claim.claim_amount,
            "Claim filed"
        );
        Ok(claim)
    }

    /// Scores the claim with the external fraud model and stores the result
    ///
    /// Nothing is written unless the scorer answers with a usable score.
    pub async fn verify(&self, actor: &Actor, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        actor.require(Role::InsuranceWorker, "verifying a claim")?;
        let mut claim = self.load(claim_id).await?;

        if claim.status != ClaimStatus::UnderReview {
            let violation = PreconditionViolation::NotUnderReview {
                status: claim.status,
                action: "verified",
            };
            warn!(claim_id = %claim_id, status = %claim.status, "Verify rejected");
            return Err(violation.into());
        }

        let request = ScoringRequest::for_claim(&claim);
        let response = self.scorer.score(&request).await.map_err(|e| {
            error!(claim_id = %claim_id, error = %e, "Fraud scorer call failed");
            ClaimError::scorer(e)
        })?;
        let assessment = FraudAssessment::try_from(response).map_err(|e| {
            error!(claim_id = %claim_id, error = %e, "Fraud scorer returned an unusable score");
            ClaimError::scorer(PortError::transformation(e.to_string()))
        })?;

        claim.record_assessment(assessment, Utc::now())?;
        claim.check_invariants()?;
        self.store
            .update(
                &claim,
                ClaimChange::Assessment,
                WriteCondition::status_is(ClaimStatus::UnderReview),
            )
            .await
            .map_err(|e| self.write_failed(claim_id, "verify", e))?;

        info!(
            claim_id = %claim_id,
            reviewer = %actor.id,
            probability = assessment.probability(),
            tier = ?assessment.tier(),
            "Claim verified"
        );
        Ok(claim)
    }

    pub async fn approve(&self, actor: &Actor, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        actor.require(Role::InsuranceWorker, "approving a claim")?;
        self.decide(actor, claim_id, Decision::Approve).await
    }

    /// The reason is validated before the store is touched
    pub async fn reject(
        &self,
        actor: &Actor,
        claim_id: ClaimId,
        reason: &str,
    ) -> Result<Claim, ClaimError> {
        actor.require(Role::InsuranceWorker, "rejecting a claim")?;
        let reason = validate_rejection_reason(reason)?;
        self.decide(actor, claim_id, Decision::Reject(reason)).await
    }

    async fn decide(
        &self,
        actor: &Actor,
        claim_id: ClaimId,
        decision: Decision,
    ) -> Result<Claim, ClaimError> {
        let mut claim = self.load(claim_id).await?;
        let action = decision.name();
        let now = Utc::now();

        let applied = match decision {
            Decision::Approve => claim.approve(actor.id, now),
            Decision::Reject(reason) => claim.reject(actor.id, reason, now),
        };
        if let Err(violation) = applied {
            warn!(claim_id = %claim_id, status = %claim.status, %violation, "{} rejected", action);
            return Err(violation.into());
        }
        claim.check_invariants()?;

        self.store
            .update(
                &claim,
                ClaimChange::Decision,
                WriteCondition::status_is(ClaimStatus::UnderReview),
            )
            .await
            .map_err(|e| self.write_failed(claim_id, action, e))?;

        info!(
            claim_id = %claim_id,
            reviewer = %actor.id,
            status = %claim.status,
            "Claim decided"
        );
        Ok(claim)
    }

    /// Holder-only, once, after approval
    pub async fn add_payout_account(
        &self,
        actor: &Actor,
        claim_id: ClaimId,
        account_number: &str,
        ifsc_code: &str,
    ) -> Result<Claim, ClaimError> {
        self.payout
            .capture(actor, claim_id, account_number, ifsc_code)
            .await
    }

    /// Workers read any claim; holders only their own
    pub async fn get(&self, actor: &Actor, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        let claim = self.load(claim_id).await?;
        if !actor.is_reviewer() && claim.policy_holder_id != actor.id {
            warn!(claim_id = %claim_id, actor = %actor.id, "Read of another holder's claim refused");
            return Err(ClaimError::forbidden(format!(
                "claim {} was not filed by {}",
                claim_id, actor.id
            )));
        }
        Ok(claim)
    }

    /// Newest first. Holders only ever see their own claims.
    pub async fn list(
        &self,
        actor: &Actor,
        status: Option<ClaimStatus>,
    ) -> Result<Vec<Claim>, ClaimError> {
        let query = match actor.role {
            Role::InsuranceWorker => ClaimQuery::default(),
            Role::PolicyHolder => ClaimQuery::by_holder(actor.id),
        }
        .with_status(status);

        self.store.list(query).await.map_err(|e| {
            error!(actor = %actor.id, error = %e, "Failed to list claims");
            ClaimError::store(e)
        })
    }

    /// Health of every collaborator
    pub async fn health(&self) -> Vec<HealthCheckResult> {
        vec![
            self.store.health_check().await,
            self.scorer.health_check().await,
            self.documents.health_check().await,
        ]
    }

    /// Uploads the documents and inserts the claim, recording each stored
    /// path in `stored_paths` as it lands
    async fn file(
        &self,
        actor: &Actor,
        validated: ValidatedSubmission,
        uploads: Vec<DocumentUpload>,
        stored_paths: &mut Vec<String>,
    ) -> Result<Claim, ClaimError> {
        let now = Utc::now();
        let mut documents = SupportingDocuments::default();
        for upload in uploads {
            let path = upload.storage_path(actor.id, now);
            let uri = self
                .documents
                .put(&path, upload.content_type.as_deref(), upload.bytes)
                .await
                .map_err(|e| {
                    error!(actor = %actor.id, path = %path, error = %e, "Document upload failed");
                    ClaimError::documents(e)
                })?;
            stored_paths.push(path);
            documents.attach(upload.kind, uri)?;
        }

        let claim = Claim::submit(actor.id, validated, documents, now);
        claim.check_invariants()?;
        self.store.insert(&claim).await.map_err(|e| {
            error!(claim_id = %claim.id, error = %e, "Failed to store new claim");
            ClaimError::from_store_write(claim.id, e)
        })?;
        Ok(claim)
    }

    /// Best-effort removal of uploads left behind by a failed filing
    async fn discard_documents(&self, paths: &[String]) {
        for path in paths {
            if let Err(e) = self.documents.delete(path).await {
                warn!(path = %path, error = %e, "Failed to remove orphaned document");
            }
        }
    }

    async fn load(&self, claim_id: ClaimId) -> Result<Claim, ClaimError> {
        self.store.get(claim_id).await.map_err(|e| {
            if !e.is_not_found() {
                error!(claim_id = %claim_id, error = %e, "Failed to load claim");
            }
            ClaimError::from_store_read(claim_id, e)
        })
    }

    fn write_failed(&self, claim_id: ClaimId, action: &str, e: PortError) -> ClaimError {
        if e.is_conflict() {
            warn!(claim_id = %claim_id, action, "Conditional write lost to a concurrent change");
        } else {
            error!(claim_id = %claim_id, action, error = %e, "Failed to store claim");
        }
        ClaimError::from_store_write(claim_id, e)
    }
}
