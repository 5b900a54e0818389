//! Test Utilities Crate
//!
//! Shared fixtures, builders, strategies and assertions for the claims
//! engine test suites.
//!
//! # Modules
//!
//! - `fixtures`: Fixed reference values (policy numbers, actors, dates)
//! - `builders`: Submissions and claims in any lifecycle state
//! - `database`: PostgreSQL testcontainer with migrations applied
//! - `assertions`: Assertion helpers for claims and claim errors
//! - `generators`: Proptest strategies

pub mod assertions;
pub mod builders;
pub mod database;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use database::*;
pub use fixtures::*;
pub use generators::*;
