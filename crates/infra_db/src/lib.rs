//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the claims engine, using SQLx.
//!
//! # Architecture
//!
//! - [`repositories`] own the SQL and work with row types
//! - [`adapters`] implement domain ports on top of the repositories
//! - [`pool`] creates the connection pool and applies migrations
//!
//! Transitions are written with conditional UPDATEs, so two reviewers
//! deciding the same claim cannot both succeed.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PgClaimStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/claims")).await?;
//! run_migrations(&pool).await?;
//! let store = PgClaimStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::PgClaimStore;
pub use error::DatabaseError;
pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool, MIGRATOR};
