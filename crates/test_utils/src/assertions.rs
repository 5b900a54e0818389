//! Custom Test Assertions
//!
//! Assertion helpers for claims and claim errors that print the offending
//! state instead of a bare `assertion failed`.

use domain_claims::{Claim, ClaimError, ClaimStatus, PreconditionViolation};

/// Asserts that a claim satisfies every lifecycle invariant
///
/// # Panics
///
/// Panics with the violated rule and the claim's status
pub fn assert_claim_invariants(claim: &Claim) {
    if let Err(violation) = claim.check_invariants() {
        panic!(
            "Claim {} ({}) violates an invariant: {}",
            claim.id, claim.status, violation
        );
    }
}

/// Asserts a claim's status
pub fn assert_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "Claim {} has status {}, expected {}",
        claim.id, claim.status, expected
    );
}

/// Asserts that `error` is a validation error on `field`
pub fn assert_validation_error(error: &ClaimError, field: &str) {
    match error {
        ClaimError::Validation { field: actual, .. } => assert_eq!(
            *actual, field,
            "Validation failed on '{}', expected '{}': {}",
            actual, field, error
        ),
        other => panic!("Expected a validation error on '{}', got: {}", field, other),
    }
}

/// Asserts that `error` is the given precondition violation
pub fn assert_precondition(error: &ClaimError, expected: &PreconditionViolation) {
    match error {
        ClaimError::Precondition(actual) => assert_eq!(actual, expected),
        other => panic!("Expected precondition failure '{}', got: {}", expected, other),
    }
}

pub fn assert_forbidden(error: &ClaimError) {
    assert!(
        matches!(error, ClaimError::Forbidden(_)),
        "Expected Forbidden, got: {}",
        error
    );
}

/// Asserts that claims are ordered newest first
pub fn assert_newest_first(claims: &[Claim]) {
    for pair in claims.windows(2) {
        assert!(
            pair[0].created_at >= pair[1].created_at,
            "Claim {} ({}) is listed before newer claim {} ({})",
            pair[0].id,
            pair[0].created_at,
            pair[1].id,
            pair[1].created_at
        );
    }
}
