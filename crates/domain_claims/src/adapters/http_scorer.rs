//! HTTP Fraud Scorer Adapter
//!
//! Calls an external fraud-scoring model over JSON/HTTP:
//!
//! ```text
//! POST <base_url>/score   ScoringRequest  ->  {"probability": 0.42, "prediction": 0}
//! GET  <base_url>/health                  ->  2xx when the model is up
//! ```
//!
//! # Error Handling
//!
//! Responses are mapped to `PortError` variants:
//! - 429 -> `PortError::RateLimited`
//! - 5xx -> `PortError::ServiceUnavailable`
//! - Timeouts -> `PortError::Timeout`
//! - Connection failures -> `PortError::Connection`
//! - Undecodable bodies -> `PortError::Transformation`
//! - Other -> `PortError::Internal`
//!
//! Transient failures count against a circuit breaker; while it is open,
//! calls fail fast with `ServiceUnavailable`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use core_kernel::{
    AdapterHealth, CircuitBreakerConfig, DomainPort, HealthCheckResult, HealthCheckable, PortError,
};

use crate::fraud::{ScoreResponse, ScoringRequest};
use crate::ports::FraudScorer;

const ADAPTER_ID: &str = "http-fraud-scorer";

/// Configuration for the HTTP fraud scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpFraudScorerConfig {
    /// Base URL of the scoring service (e.g. "http://fraud-model:8000")
    pub base_url: String,

    /// Sent as a bearer token when present
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    pub circuit_breaker: Option<CircuitBreakerConfig>,
}

impl Default for HttpFraudScorerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: None,
            timeout_secs: 10,
            circuit_breaker: Some(CircuitBreakerConfig::default()),
        }
    }
}

/// Circuit breaker state for fault tolerance
#[derive(Debug)]
struct CircuitBreaker {
    config: CircuitBreakerConfig,
    failure_count: AtomicU64,
    success_count: AtomicU64,
    is_open: AtomicBool,
    opened_at: RwLock<Option<Instant>>,
}

impl CircuitBreaker {
    fn new(config: CircuitBreakerConfig) -> Self {
        Self {
            config,
            failure_count: AtomicU64::new(0),
            success_count: AtomicU64::new(0),
            is_open: AtomicBool::new(false),
            opened_at: RwLock::new(None),
        }
    }

    async fn is_available(&self) -> bool {
        if !self.is_open.load(Ordering::Relaxed) {
            return true;
        }
        // Half-open once the reset timeout has elapsed
        match *self.opened_at.read().await {
            Some(opened) => opened.elapsed() >= Duration::from_secs(self.config.reset_timeout_secs),
            None => false,
        }
    }

    fn record_success(&self) {
        self.failure_count.store(0, Ordering::Relaxed);
        if !self.is_open.load(Ordering::Relaxed) {
            return;
        }
        let successes = self.success_count.fetch_add(1, Ordering::Relaxed) + 1;
        if successes >= self.config.success_threshold as u64 {
            self.is_open.store(false, Ordering::Relaxed);
            self.success_count.store(0, Ordering::Relaxed);
        }
    }

    async fn record_failure(&self) {
        self.success_count.store(0, Ordering::Relaxed);
        let failures = self.failure_count.fetch_add(1, Ordering::Relaxed) + 1;
        if failures >= self.config.failure_threshold as u64 {
            self.is_open.store(true, Ordering::Relaxed);
            *self.opened_at.write().await = Some(Instant::now());
        }
    }
}

/// Fraud scorer backed by an HTTP model service
#[derive(Debug)]
pub struct HttpFraudScorer {
    config: HttpFraudScorerConfig,
    client: reqwest::Client,
    circuit_breaker: Option<CircuitBreaker>,
}

impl HttpFraudScorer {
    pub fn new(config: HttpFraudScorerConfig) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PortError::Internal {
                message: "failed to build HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;
        let circuit_breaker = config.circuit_breaker.clone().map(CircuitBreaker::new);

        Ok(Self {
            config,
            client,
            circuit_breaker,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Whether the breaker is currently refusing calls
    pub async fn is_circuit_open(&self) -> bool {
        match &self.circuit_breaker {
            Some(cb) => !cb.is_available().await,
            None => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_score(&self, request: &ScoringRequest) -> Result<ScoreResponse, PortError> {
        let mut builder = self.client.post(self.url("score")).json(request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_transport_error("score", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_status(status, &response));
        }

        response
            .json::<ScoreResponse>()
            .await
            .map_err(|e| PortError::transformation(format!("invalid score response: {}", e)))
    }

    fn map_transport_error(&self, operation: &str, e: reqwest::Error) -> PortError {
        if e.is_timeout() {
            PortError::Timeout {
                operation: operation.to_string(),
                duration_ms: self.config.timeout_secs * 1000,
            }
        } else if e.is_connect() || e.is_request() {
            PortError::Connection {
                message: format!("fraud scorer unreachable at {}", self.config.base_url),
                source: Some(Box::new(e)),
            }
        } else {
            PortError::Internal {
                message: format!("fraud scorer {} failed", operation),
                source: Some(Box::new(e)),
            }
        }
    }
}

fn map_status(status: StatusCode, response: &reqwest::Response) -> PortError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(1);
        PortError::RateLimited { retry_after_secs }
    } else if status.is_server_error() {
        PortError::ServiceUnavailable {
            service: format!("fraud scorer answered {}", status),
        }
    } else {
        PortError::internal(format!("fraud scorer rejected the request with {}", status))
    }
}

impl DomainPort for HttpFraudScorer {}

#[async_trait]
impl HealthCheckable for HttpFraudScorer {
    async fn health_check(&self) -> HealthCheckResult {
        if self.is_circuit_open().await {
            return HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Degraded, 0)
                .with_message("Circuit breaker is open");
        }

        let start = Instant::now();
        let result = self.client.get(self.url("health")).send().await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(response) if response.status().is_success() => {
                HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Healthy, latency_ms)
            }
            Ok(response) => HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Unhealthy, latency_ms)
                .with_message(format!("health endpoint answered {}", response.status())),
            Err(e) => HealthCheckResult::new(ADAPTER_ID, AdapterHealth::Unhealthy, latency_ms)
                .with_message(e.to_string()),
        }
    }
}

#[async_trait]
impl FraudScorer for HttpFraudScorer {
    async fn score(&self, request: &ScoringRequest) -> Result<ScoreResponse, PortError> {
        if let Some(cb) = &self.circuit_breaker {
            if !cb.is_available().await {
                return Err(PortError::ServiceUnavailable {
                    service: "fraud scorer circuit breaker is open".to_string(),
                });
            }
        }

        debug!(claim_id = %request.claim_id, url = %self.url("score"), "Requesting fraud score");
        let result = self.post_score(request).await;

        if let Some(cb) = &self.circuit_breaker {
            match &result {
                Ok(_) => cb.record_success(),
                Err(e) if e.is_transient() => {
                    warn!(claim_id = %request.claim_id, error = %e, "Fraud scorer call failed");
                    cb.record_failure().await;
                }
                Err(_) => {}
            }
        }
        result
    }
}
