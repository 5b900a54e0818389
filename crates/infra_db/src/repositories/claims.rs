//! Claims repository implementation
//!
//! Row-level access to the `claims` table. Every state transition goes
//! through [`ClaimsRepository::update_if`], a single conditional UPDATE of
//! the transition's own columns that only applies while the stored status
//! (and optionally the empty payout account) still match what the caller
//! read.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::DatabaseError;

const CLAIM_COLUMNS: &str = r#"
    claim_id, policy_holder_id, policy_number, insurance_company, claim_amount,
    admission_date, discharge_date, patient_name, patient_age, hospital_name,
    doctor_name, diagnosis, treatment_type, notes, documents,
    bank_account_number, ifsc_code, status, fraud_probability, fraud_prediction,
    rejection_reason, reviewed_by, reviewed_at, created_at, updated_at
"#;

/// Repository for the claims table
#[derive(Debug, Clone)]
pub struct ClaimsRepository {
    pool: PgPool,
}

impl ClaimsRepository {
    /// Creates a new ClaimsRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Retrieves a claim by its identifier
    ///
    /// # Returns
    ///
    /// The claim row or `DatabaseError::NotFound`
    pub async fn get_by_id(&self, claim_id: Uuid) -> Result<ClaimRow, DatabaseError> {
        let sql = format!("SELECT {} FROM claims WHERE claim_id = $1", CLAIM_COLUMNS);
        sqlx::query_as::<_, ClaimRow>(&sql)
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))
    }

    pub async fn exists(&self, claim_id: Uuid) -> Result<bool, DatabaseError> {
        let found = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM claims WHERE claim_id = $1)",
        )
        .bind(claim_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(found)
    }

    /// Inserts a newly filed claim
    ///
    /// # Errors
    ///
    /// `DatabaseError::DuplicateEntry` if the id is already taken
    pub async fn insert(&self, row: &ClaimRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO claims (
                claim_id, policy_holder_id, policy_number, insurance_company, claim_amount,
                admission_date, discharge_date, patient_name, patient_age, hospital_name,
                doctor_name, diagnosis, treatment_type, notes, documents,
                bank_account_number, ifsc_code, status, fraud_probability, fraud_prediction,
                rejection_reason, reviewed_by, reviewed_at, created_at, updated_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25
            )
            "#,
        )
        .bind(row.claim_id)
        .bind(row.policy_holder_id)
        .bind(&row.policy_number)
        .bind(&row.insurance_company)
        .bind(row.claim_amount)
        .bind(row.admission_date)
        .bind(row.discharge_date)
        .bind(&row.patient_name)
        .bind(row.patient_age)
        .bind(&row.hospital_name)
        .bind(&row.doctor_name)
        .bind(&row.diagnosis)
        .bind(&row.treatment_type)
        .bind(&row.notes)
        .bind(&row.documents)
        .bind(&row.bank_account_number)
        .bind(&row.ifsc_code)
        .bind(&row.status)
        .bind(row.fraud_probability)
        .bind(row.fraud_prediction)
        .bind(&row.rejection_reason)
        .bind(row.reviewed_by)
        .bind(row.reviewed_at)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes the columns of `update` if the stored claim still has
    /// `expected_status` and, when `require_no_payout` is set, no payout
    /// account yet. No other column is touched.
    ///
    /// # Errors
    ///
    /// - `DatabaseError::NotFound` if the claim does not exist
    /// - `DatabaseError::StaleWrite` if it exists but the condition failed
    pub async fn update_if(
        &self,
        claim_id: Uuid,
        update: &ClaimUpdate,
        updated_at: DateTime<Utc>,
        expected_status: &str,
        require_no_payout: bool,
    ) -> Result<(), DatabaseError> {
        let result =
            update_query(claim_id, update, updated_at, expected_status, require_no_payout)
                .build()
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            if !self.exists(claim_id).await? {
                return Err(DatabaseError::not_found("Claim", claim_id));
            }
            return Err(DatabaseError::StaleWrite(format!(
                "claim {} is no longer {}",
                claim_id, expected_status
            )));
        }

        Ok(())
    }

    /// Lists claims matching `filter`, newest first
    pub async fn list(&self, filter: &ClaimFilter) -> Result<Vec<ClaimRow>, DatabaseError> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM claims WHERE TRUE", CLAIM_COLUMNS));

        if let Some(holder) = filter.policy_holder_id {
            builder.push(" AND policy_holder_id = ").push_bind(holder);
        }
        if let Some(status) = &filter.status {
            builder.push(" AND status = ").push_bind(status.clone());
        }
        builder.push(" ORDER BY created_at DESC, claim_id DESC");
        if let Some(limit) = filter.limit {
            builder.push(" LIMIT ").push_bind(limit);
        }
        if let Some(offset) = filter.offset {
            builder.push(" OFFSET ").push_bind(offset);
        }

        let rows = builder
            .build_query_as::<ClaimRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}

/// Columns written by one claim transition
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimUpdate {
    Assessment {
        fraud_probability: f64,
        fraud_prediction: i16,
    },
    Decision {
        status: String,
        rejection_reason: Option<String>,
        reviewed_by: Uuid,
        reviewed_at: DateTime<Utc>,
    },
    PayoutAccount {
        bank_account_number: String,
        ifsc_code: String,
    },
}

fn update_query<'a>(
    claim_id: Uuid,
    update: &'a ClaimUpdate,
    updated_at: DateTime<Utc>,
    expected_status: &'a str,
    require_no_payout: bool,
) -> QueryBuilder<'a, Postgres> {
    let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE claims SET ");
    {
        let mut columns = builder.separated(", ");
        match update {
            ClaimUpdate::Assessment {
                fraud_probability,
                fraud_prediction,
            } => {
                columns.push("fraud_probability = ").push_bind_unseparated(*fraud_probability);
                columns.push("fraud_prediction = ").push_bind_unseparated(*fraud_prediction);
            }
            ClaimUpdate::Decision {
                status,
                rejection_reason,
                reviewed_by,
                reviewed_at,
            } => {
                columns.push("status = ").push_bind_unseparated(status.as_str());
                columns
                    .push("rejection_reason = ")
                    .push_bind_unseparated(rejection_reason.as_deref());
                columns.push("reviewed_by = ").push_bind_unseparated(*reviewed_by);
                columns.push("reviewed_at = ").push_bind_unseparated(*reviewed_at);
            }
            ClaimUpdate::PayoutAccount {
                bank_account_number,
                ifsc_code,
            } => {
                columns
                    .push("bank_account_number = ")
                    .push_bind_unseparated(bank_account_number.as_str());
                columns.push("ifsc_code = ").push_bind_unseparated(ifsc_code.as_str());
            }
        }
        columns.push("updated_at = ").push_bind_unseparated(updated_at);
    }

    builder.push(" WHERE claim_id = ").push_bind(claim_id);
    builder.push(" AND status = ").push_bind(expected_status);
    if require_no_payout {
        builder.push(" AND bank_account_number IS NULL");
    }
    builder
}

/// Filter for [`ClaimsRepository::list`]
#[derive(Debug, Clone, Default)]
pub struct ClaimFilter {
    pub policy_holder_id: Option<Uuid>,
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Database row for a claim
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub policy_holder_id: Uuid,
    pub policy_number: String,
    pub insurance_company: String,
    pub claim_amount: Decimal,
    pub admission_date: NaiveDate,
    pub discharge_date: NaiveDate,
    pub patient_name: String,
    pub patient_age: i16,
    pub hospital_name: String,
    pub doctor_name: String,
    pub diagnosis: String,
    pub treatment_type: String,
    pub notes: Option<String>,
    pub documents: JsonValue,
    pub bank_account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub status: String,
    pub fraud_probability: Option<f64>,
    pub fraud_prediction: Option<i16>,
    pub rejection_reason: Option<String>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
