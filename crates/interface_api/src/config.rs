//! API configuration

use serde::{Deserialize, Serialize};

use core_kernel::CircuitBreakerConfig;
use domain_claims::adapters::HttpFraudScorerConfig;
use domain_claims::Actor;

use crate::auth::{create_token, AuthError};

/// API configuration
///
/// Every field has a default; `API_`-prefixed environment variables
/// override them (`API_PORT`, `API_FRAUD_SCORER_URL`, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// HS256 secret for bearer tokens
    pub jwt_secret: String,
    /// Lifetime of tokens issued by [`ApiConfig::issue_token`]
    pub jwt_expiration_secs: u64,
    pub database_url: String,
    pub database_max_connections: u32,
    pub log_level: String,
    /// Base URL of the fraud-scoring service
    pub fraud_scorer_url: String,
    pub fraud_scorer_api_key: Option<String>,
    pub fraud_scorer_timeout_secs: u64,
    /// Directory uploaded documents are written under
    pub document_root: String,
    /// Public URL prefix of `document_root`
    pub document_base_url: String,
    /// Largest accepted request body, uploads included
    pub max_request_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/claims".to_string(),
            database_max_connections: 10,
            log_level: "info".to_string(),
            fraud_scorer_url: "http://localhost:8000".to_string(),
            fraud_scorer_api_key: None,
            fraud_scorer_timeout_secs: 10,
            document_root: "./data/documents".to_string(),
            document_base_url: "http://localhost:8080/api/v1/documents".to_string(),
            max_request_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `API_`-prefixed environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Signs a bearer token for `actor` with this deployment's secret and lifetime
    pub fn issue_token(&self, actor: &Actor) -> Result<String, AuthError> {
        create_token(actor.id, &[actor.role], &self.jwt_secret, self.jwt_expiration_secs)
    }

    pub fn fraud_scorer(&self) -> HttpFraudScorerConfig {
        HttpFraudScorerConfig {
            base_url: self.fraud_scorer_url.clone(),
            api_key: self.fraud_scorer_api_key.clone(),
            timeout_secs: self.fraud_scorer_timeout_secs,
            circuit_breaker: Some(CircuitBreakerConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_source_keeps_defaults() {
        let config: ApiConfig = config::Config::builder()
            .set_override("port", 9090)
            .unwrap()
            .set_override("fraud_scorer_url", "http://model:8000")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.fraud_scorer().base_url, "http://model:8000");
        assert_eq!(config.server_addr(), "0.0.0.0:9090");
    }

    #[test]
    fn test_issued_token_lives_for_configured_expiration() {
        let config = ApiConfig {
            jwt_secret: "config-test-secret".to_string(),
            jwt_expiration_secs: 900,
            ..ApiConfig::default()
        };
        let holder = Actor::policy_holder(core_kernel::UserId::new());

        let token = config.issue_token(&holder).unwrap();
        let claims = crate::auth::validate_token(&token, &config.jwt_secret).unwrap();

        assert_eq!(claims.exp - claims.iat, 900);
        assert_eq!(claims.actor().unwrap(), holder);
    }
}
