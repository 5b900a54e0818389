//! Ports and adapters vocabulary
//!
//! `ClaimLifecycle` never talks to Postgres, the fraud model or the file
//! system directly. Each collaborator sits behind a port trait in
//! `domain_claims::ports`, and every adapter reports failures as a
//! [`PortError`] and its liveness as a [`HealthCheckResult`].
//!
//! ```text
//!                 ClaimLifecycle
//!                       │
//!   ClaimStore ─── FraudScorer ─── DocumentStore      (ports)
//!        ▲               ▲               ▲
//!   PgClaimStore   HttpFraudScorer  LocalDocumentStore (adapters)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Failure reported by an adapter
#[derive(Debug, Error)]
pub enum PortError {
    #[error("{entity_type} {id} not found")]
    NotFound { entity_type: String, id: String },

    /// The adapter refused the input before touching its backend
    #[error("invalid input: {message}")]
    Validation { message: String },

    /// A conditional write found the record in a different state
    #[error("write conflict: {message}")]
    Conflict { message: String },

    #[error("connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout { operation: String, duration_ms: u64 },

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("{service} unavailable")]
    ServiceUnavailable { service: String },

    /// The backend answered with data that cannot be mapped to the domain
    #[error("unusable response: {message}")]
    Transformation { message: String },

    #[error("internal adapter error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation { message: message.into() }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict { message: message.into() }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn transformation(message: impl Into<String>) -> Self {
        PortError::Transformation { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Failures where repeating the same call later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::RateLimited { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Supertrait of every port so implementations can live in an `Arc<dyn _>`
/// shared across tokio tasks
pub trait DomainPort: Send + Sync + 'static {}

/// Thresholds for adapters that guard a remote service with a circuit breaker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive transient failures that open the circuit
    pub failure_threshold: u32,
    /// Seconds an open circuit waits before letting a probe call through
    pub reset_timeout_secs: u64,
    /// Successful probes needed to close it again
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_secs: 30,
            success_threshold: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    /// Answering, but slowly or partially
    Degraded,
    Unhealthy,
}

/// One adapter's answer to a readiness probe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    pub fn new(adapter_id: impl Into<String>, status: AdapterHealth, latency_ms: u64) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status,
            latency_ms,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == AdapterHealth::Healthy
    }
}

#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}
