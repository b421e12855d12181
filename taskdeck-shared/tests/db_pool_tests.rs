/// Integration tests for the database layer
///
/// These tests need a reachable PostgreSQL instance with `DATABASE_URL`
/// set, so they are ignored by default:
///
/// ```bash
/// DATABASE_URL=postgresql://localhost/taskdeck_test cargo test -- --ignored
/// ```

use taskdeck_shared::db::migrations::{ensure_database_exists, run_migrations};
use taskdeck_shared::db::pool::{create_pool, health_check, DatabaseConfig};

fn test_config() -> DatabaseConfig {
    DatabaseConfig {
        url: std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for database integration tests"),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore] // Requires running Postgres instance
async fn test_create_pool_and_health_check() {
    let pool = create_pool(test_config()).await.expect("pool should connect");

    health_check(&pool).await.expect("health check should pass");
}

#[tokio::test]
#[ignore] // Requires running Postgres instance
async fn test_migrations_are_idempotent() {
    let config = test_config();
    ensure_database_exists(&config.url)
        .await
        .expect("database should be creatable");

    let pool = create_pool(config).await.expect("pool should connect");

    run_migrations(&pool).await.expect("first run should apply");
    run_migrations(&pool)
        .await
        .expect("second run should be a no-op");
}
