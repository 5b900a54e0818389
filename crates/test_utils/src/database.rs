//! Postgres in a testcontainer
//!
//! Tests that use it need a running Docker daemon, so [`db_test!`] marks
//! them `#[ignore]`; run them with `cargo test -- --ignored`.

use sqlx::PgPool;
use std::time::Duration;
use testcontainers::{
    core::{IntoContainerPort, WaitFor},
    runners::AsyncRunner,
    ContainerAsync, GenericImage, ImageExt,
};

use infra_db::{create_pool, run_migrations, DatabaseConfig};

const USER: &str = "claims";
const PASSWORD: &str = "claims";
const DATABASE: &str = "claims_test";

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Connection string for the containerised database
pub fn test_database_url(host: &str, port: u16) -> String {
    format!("postgres://{USER}:{PASSWORD}@{host}:{port}/{DATABASE}")
}

/// A migrated Postgres that is dropped with this value
pub struct TestDatabase {
    _container: ContainerAsync<GenericImage>,
    pool: PgPool,
}

impl TestDatabase {
    pub async fn start() -> Result<Self, BoxError> {
        let container = GenericImage::new("postgres", "16-alpine")
            .with_exposed_port(5432.tcp())
            .with_wait_for(WaitFor::message_on_stderr(
                "database system is ready to accept connections",
            ))
            .with_env_var("POSTGRES_USER", USER)
            .with_env_var("POSTGRES_PASSWORD", PASSWORD)
            .with_env_var("POSTGRES_DB", DATABASE)
            .start()
            .await?;

        let host = container.get_host().await?.to_string();
        let port = container.get_host_port_ipv4(5432).await?;

        let config = DatabaseConfig::new(test_database_url(&host, port))
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(30));
        let pool = create_pool(config).await?;
        run_migrations(&pool).await?;

        Ok(Self {
            _container: container,
            pool,
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Declares a test against a fresh migrated database
#[macro_export]
macro_rules! db_test {
    ($name:ident, |$pool:ident| $body:block) => {
        #[tokio::test]
        #[ignore = "requires Docker"]
        async fn $name() {
            let db = $crate::database::TestDatabase::start()
                .await
                .expect("Failed to start test database");
            let $pool = db.pool().clone();
            $body
        }
    };
}
