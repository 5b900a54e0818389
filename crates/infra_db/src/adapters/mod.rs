//! Domain Adapters
//!
//! Implementations of domain ports backed by PostgreSQL. Each adapter
//! uses the repository layer for SQL and translates rows to domain models.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PgClaimStore;
//!
//! let store = PgClaimStore::new(pool);
//! let claim = store.get(claim_id).await?;
//! ```

pub mod claims;

pub use claims::PgClaimStore;
