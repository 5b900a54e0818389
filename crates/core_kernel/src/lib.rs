//! Core Kernel - Foundational types shared by the claims workspace
//!
//! This crate provides the building blocks used by every other crate:
//! - Strongly-typed identifiers for claims and users
//! - The ports-and-adapters error and health-check vocabulary

pub mod identifiers;
pub mod ports;

pub use identifiers::{ClaimId, UserId};
pub use ports::{
    PortError, DomainPort, CircuitBreakerConfig,
    AdapterHealth, HealthCheckResult, HealthCheckable,
};
