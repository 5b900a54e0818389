//! Authentication
//!
//! Bearer tokens are HS256 JWTs whose `sub` is the user's UUID and whose
//! `roles` carry `policy_holder` or `insurance_worker`.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::UserId;
use domain_claims::{Actor, Role};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub roles: Vec<String>,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

impl Claims {
    /// Resolves the acting user
    ///
    /// A token carrying both roles acts as an insurance worker.
    pub fn actor(&self) -> Result<Actor, AuthError> {
        let id: UserId = self.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        let roles: Vec<Role> = self.roles.iter().filter_map(|r| r.parse().ok()).collect();

        if roles.contains(&Role::InsuranceWorker) {
            Ok(Actor::insurance_worker(id))
        } else if roles.contains(&Role::PolicyHolder) {
            Ok(Actor::policy_holder(id))
        } else {
            Err(AuthError::MissingRole)
        }
    }
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Token carries no claims role")]
    MissingRole,
}

/// Creates a signed token for `user_id`
pub fn create_token(
    user_id: UserId,
    roles: &[Role],
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.as_uuid().to_string(),
        roles: roles.iter().map(|r| r.as_str().to_string()).collect(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a token's signature and expiry
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => AuthError::InvalidToken,
    })?;

    Ok(token_data.claims)
}
