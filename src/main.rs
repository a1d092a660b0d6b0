use axum::Router;
use scoutbench::config::{Config, StorageBackend};
use scoutbench::db::{BenchmarkRepository, InMemoryBenchmarkRepository, PgBenchmarkRepository};
use scoutbench::AppState;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "scoutbench=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting ScoutBench API server");
    tracing::info!("Configuration loaded successfully");

    let repo = connect_storage(&config).await?;
    tracing::info!("Using {} storage backend", repo.backend_name());

    let state = Arc::new(AppState::new(repo));

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", scoutbench::routes::create_router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn connect_storage(
    config: &Config,
) -> Result<Arc<dyn BenchmarkRepository>, Box<dyn std::error::Error>> {
    match config.storage_backend {
        StorageBackend::Memory => {
            tracing::warn!("In-memory storage: benchmarks are lost on restart");
            Ok(Arc::new(InMemoryBenchmarkRepository::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL must be set for the postgres backend")?;

            tracing::info!("Connecting to database...");
            let pool = scoutbench::db::create_pool(url, config.database_max_connections).await?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Database migrations completed");

            Ok(Arc::new(PgBenchmarkRepository::new(pool)))
        }
        #[cfg(feature = "sqlite")]
        StorageBackend::Sqlite => {
            use scoutbench::db::SqliteBenchmarkRepository;

            let url = config
                .database_url
                .as_deref()
                .ok_or("DATABASE_URL must be set for the sqlite backend")?;

            tracing::info!("Opening SQLite database {}", url);
            let pool =
                scoutbench::db::create_sqlite_pool(url, config.database_max_connections).await?;
            SqliteBenchmarkRepository::create_schema(&pool).await?;

            Ok(Arc::new(SqliteBenchmarkRepository::new(pool)))
        }
        #[cfg(not(feature = "sqlite"))]
        StorageBackend::Sqlite => {
            Err("STORAGE_BACKEND=sqlite requires building with the `sqlite` feature".into())
        }
    }
}
