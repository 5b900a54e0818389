//! PostgreSQL Claim Store Adapter
//!
//! Implements `domain_claims::ClaimStore` on top of [`ClaimsRepository`].
//!
//! # Error Handling
//!
//! Database errors are translated to `PortError` variants:
//! - `DatabaseError::NotFound` -> `PortError::NotFound`
//! - `DatabaseError::StaleWrite` / `DuplicateEntry` -> `PortError::Conflict`
//! - connection and pool failures -> `PortError::Connection` / `ServiceUnavailable`
//! - a stored row that no longer maps to a valid claim -> `PortError::Transformation`
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PgClaimStore;
//! use domain_claims::ClaimStore;
//! use std::sync::Arc;
//!
//! let store: Arc<dyn ClaimStore> = Arc::new(PgClaimStore::new(pool));
//! let claim = store.get(claim_id).await?;
//! ```

use async_trait::async_trait;
use sqlx::PgPool;
use std::time::Instant;
use tracing::{debug, instrument};

use core_kernel::{
    AdapterHealth, ClaimId, DomainPort, HealthCheckResult, HealthCheckable, PortError, UserId,
};
use domain_claims::{
    Claim, ClaimChange, ClaimQuery, ClaimStatus, ClaimStore, FraudAssessment, FraudPrediction,
    InsuranceCompany, PayoutAccount, Review, SupportingDocuments, WriteCondition,
};

use crate::error::DatabaseError;
use crate::repositories::claims::{ClaimFilter, ClaimRow, ClaimUpdate, ClaimsRepository};

const ADAPTER_ID: &str = "postgres-claim-store";

/// PostgreSQL-backed claim store
#[derive(Debug, Clone)]
pub struct PgClaimStore {
    repository: ClaimsRepository,
}

impl PgClaimStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: ClaimsRepository::new(pool),
        }
    }
}

impl DomainPort for PgClaimStore {}

#[async_trait]
impl HealthCheckable for PgClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = Instant::now();

        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.repository.pool())
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Healthy, latency_ms),
            Err(e) => HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Unhealthy, latency_ms)
                .with_message(format!("Database error: {}", e)),
        }
    }
}

#[async_trait]
impl ClaimStore for PgClaimStore {
    #[instrument(skip(self), fields(claim_id = %id))]
    async fn get(&self, id: ClaimId) -> Result<Claim, PortError> {
        debug!("Fetching claim");
        let row = self.repository.get_by_id(id.into()).await?;
        Ok(claim_from_row(row)?)
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id))]
    async fn insert(&self, claim: &Claim) -> Result<(), PortError> {
        let row = claim_to_row(claim)?;
        self.repository.insert(&row).await?;
        debug!("Claim inserted");
        Ok(())
    }

    #[instrument(skip(self, claim), fields(claim_id = %claim.id, expected = %condition.status))]
    async fn update(
        &self,
        claim: &Claim,
        change: ClaimChange,
        condition: WriteCondition,
    ) -> Result<(), PortError> {
        let update = claim_update(claim, change)?;
        self.repository
            .update_if(
                claim.id.into(),
                &update,
                claim.updated_at,
                condition.status.as_str(),
                condition.payout_unset,
            )
            .await?;
        debug!(?change, status = %claim.status, "Claim updated");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list(&self, query: ClaimQuery) -> Result<Vec<Claim>, PortError> {
        let filter = ClaimFilter {
            policy_holder_id: query.policy_holder_id.map(Into::into),
            status: query.status.map(|s| s.as_str().to_string()),
            limit: query.limit.map(i64::from),
            offset: query.offset.map(i64::from),
        };
        let rows = self.repository.list(&filter).await?;
        debug!(count = rows.len(), "Claims listed");

        rows.into_iter()
            .map(|row| claim_from_row(row).map_err(PortError::from))
            .collect()
    }
}

/// Flattens a claim into its table row
pub fn claim_to_row(claim: &Claim) -> Result<ClaimRow, DatabaseError> {
    let documents = serde_json::to_value(&claim.documents)
        .map_err(|e| DatabaseError::SerializationError(format!("documents: {}", e)))?;

    Ok(ClaimRow {
        claim_id: claim.id.into(),
        policy_holder_id: claim.policy_holder_id.into(),
        policy_number: claim.policy_number.clone(),
        insurance_company: claim.insurance_company.name().to_string(),
        claim_amount: claim.claim_amount,
        admission_date: claim.admission_date,
        discharge_date: claim.discharge_date,
        patient_name: claim.patient_name.clone(),
        patient_age: i16::from(claim.patient_age),
        hospital_name: claim.hospital_name.clone(),
        doctor_name: claim.doctor_name.clone(),
        diagnosis: claim.diagnosis.clone(),
        treatment_type: claim.treatment_type.clone(),
        notes: claim.notes.clone(),
        documents,
        bank_account_number: claim.payout.as_ref().map(|p| p.account_number().to_string()),
        ifsc_code: claim.payout.as_ref().map(|p| p.ifsc_code().to_string()),
        status: claim.status.as_str().to_string(),
        fraud_probability: claim.fraud.map(|f| f.probability()),
        fraud_prediction: claim.fraud.map(|f| f.prediction().code() as i16),
        rejection_reason: claim.rejection_reason.clone(),
        reviewed_by: claim.review.map(|r| r.reviewed_by.into()),
        reviewed_at: claim.review.map(|r| r.reviewed_at),
        created_at: claim.created_at,
        updated_at: claim.updated_at,
    })
}

/// Picks the columns `change` writes out of `claim`
///
/// A change whose fields are still unset on the claim cannot be written.
pub fn claim_update(claim: &Claim, change: ClaimChange) -> Result<ClaimUpdate, DatabaseError> {
    let missing = |what: &str| {
        DatabaseError::SerializationError(format!(
            "claim {} has no {} to write",
            claim.id, what
        ))
    };

    match change {
        ClaimChange::Assessment => {
            let fraud = claim.fraud.ok_or_else(|| missing("fraud assessment"))?;
            Ok(ClaimUpdate::Assessment {
                fraud_probability: fraud.probability(),
                fraud_prediction: fraud.prediction().code() as i16,
            })
        }
        ClaimChange::Decision => {
            let review = claim.review.ok_or_else(|| missing("review"))?;
            Ok(ClaimUpdate::Decision {
                status: claim.status.as_str().to_string(),
                rejection_reason: claim.rejection_reason.clone(),
                reviewed_by: review.reviewed_by.into(),
                reviewed_at: review.reviewed_at,
            })
        }
        ClaimChange::PayoutAccount => {
            let payout = claim.payout.as_ref().ok_or_else(|| missing("payout account"))?;
            Ok(ClaimUpdate::PayoutAccount {
                bank_account_number: payout.account_number().to_string(),
                ifsc_code: payout.ifsc_code().to_string(),
            })
        }
    }
}

/// Rebuilds a claim from its row, refusing rows whose paired columns are
/// half-populated
pub fn claim_from_row(row: ClaimRow) -> Result<Claim, DatabaseError> {
    let corrupt = |what: String| {
        DatabaseError::SerializationError(format!("claim {}: {}", row.claim_id, what))
    };

    let status: ClaimStatus = row.status.parse().map_err(corrupt)?;
    let insurance_company: InsuranceCompany = row.insurance_company.parse().map_err(corrupt)?;
    let patient_age = u8::try_from(row.patient_age)
        .map_err(|_| corrupt(format!("patient age {} out of range", row.patient_age)))?;
    let documents: SupportingDocuments = serde_json::from_value(row.documents.clone())
        .map_err(|e| corrupt(format!("documents: {}", e)))?;

    let fraud = match (row.fraud_probability, row.fraud_prediction) {
        (None, None) => None,
        (Some(probability), Some(code)) => {
            let prediction = FraudPrediction::from_code(i32::from(code))
                .ok_or_else(|| corrupt(format!("fraud prediction {}", code)))?;
            Some(FraudAssessment::new(probability, prediction).map_err(|e| corrupt(e.to_string()))?)
        }
        _ => return Err(corrupt("fraud probability and prediction are not paired".into())),
    };

    let payout = match (&row.bank_account_number, &row.ifsc_code) {
        (None, None) => None,
        (Some(account), Some(ifsc)) => {
            Some(PayoutAccount::new(account, ifsc).map_err(|e| corrupt(e.to_string()))?)
        }
        _ => return Err(corrupt("bank account and IFSC code are not paired".into())),
    };

    let review = match (row.reviewed_by, row.reviewed_at) {
        (None, None) => None,
        (Some(by), Some(at)) => Some(Review {
            reviewed_by: UserId::from_uuid(by),
            reviewed_at: at,
        }),
        _ => return Err(corrupt("reviewer and review time are not paired".into())),
    };

    Ok(Claim {
        id: ClaimId::from_uuid(row.claim_id),
        policy_holder_id: UserId::from_uuid(row.policy_holder_id),
        policy_number: row.policy_number,
        insurance_company,
        claim_amount: row.claim_amount,
        admission_date: row.admission_date,
        discharge_date: row.discharge_date,
        patient_name: row.patient_name,
        patient_age,
        hospital_name: row.hospital_name,
        doctor_name: row.doctor_name,
        diagnosis: row.diagnosis,
        treatment_type: row.treatment_type,
        notes: row.notes,
        documents,
        payout,
        status,
        fraud,
        rejection_reason: row.rejection_reason,
        review,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
