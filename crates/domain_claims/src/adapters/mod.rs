//! Adapters for the claims engine's external collaborators
//!
//! - **HttpFraudScorer**: JSON/HTTP client for the fraud-scoring model
//! - **LocalDocumentStore**: supporting documents on the local filesystem
//!
//! The claim store adapter lives in `infra_db`; in-memory mocks of every
//! port live in `ports::mock`.

pub mod http_scorer;
pub mod local_documents;

pub use http_scorer::{HttpFraudScorer, HttpFraudScorerConfig};
pub use local_documents::LocalDocumentStore;
