//! Repository implementations
//!
//! Repositories own the SQL and speak in row types; adapters map those
//! rows to domain aggregates.

pub mod claims;

pub use claims::{ClaimFilter, ClaimRow, ClaimUpdate, ClaimsRepository};
