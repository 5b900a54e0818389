//! Policy-number classification handler

use axum::{extract::State, Json};

use domain_claims::PolicyClassification;

use crate::dto::claims::ClassifyPolicyNumberRequest;
use crate::AppState;

/// Identifies the insurer for a policy number as the holder types it
///
/// Always answers 200; an unrecognised number is reported in the body.
pub async fn classify_policy_number(
    State(state): State<AppState>,
    Json(request): Json<ClassifyPolicyNumberRequest>,
) -> Json<PolicyClassification> {
    Json(state.lifecycle.classify_policy_number(&request.policy_number))
}
