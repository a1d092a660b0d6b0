use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;

mod benchmark_queries;
pub mod benchmark_repository;
pub mod memory_repo;
#[cfg(feature = "sqlite")]
pub mod sqlite_repo;

pub use benchmark_repository::{BenchmarkRepository, PgBenchmarkRepository};
pub use memory_repo::InMemoryBenchmarkRepository;
#[cfg(feature = "sqlite")]
pub use sqlite_repo::SqliteBenchmarkRepository;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

#[cfg(feature = "sqlite")]
pub async fn create_sqlite_pool(
    database_url: &str,
    max_connections: u32,
) -> Result<sqlx::sqlite::SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect_with(options)
        .await
}
