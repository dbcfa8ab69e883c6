use product_gate::{
    AppState,
    config::{AppConfig, Env},
    create_router,
    repository::{
        InMemoryRepository, InMemoryRoleRepository, PostgresRepository, RepositoryState,
        RoleState,
    },
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initializes logging and the catalog store, then serves HTTP.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise crate-level debug.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "product_gate=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Store selection: Postgres when DATABASE_URL is set, in-memory otherwise.
    let (products, roles): (RepositoryState, RoleState) = match &config.db_url {
        Some(db_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(db_url)
                .await
                .expect("FATAL: Failed to connect to Postgres. Check DATABASE_URL.");

            let repo = PostgresRepository::new(pool);
            repo.migrate()
                .await
                .expect("FATAL: Failed to apply database migrations.");

            tracing::info!("Using Postgres catalog store");
            (Arc::new(repo.clone()), Arc::new(repo))
        }
        None => {
            tracing::info!(
                subjects = config.role_grants.len(),
                "Using in-memory catalog store"
            );
            (
                Arc::new(InMemoryRepository::new()),
                Arc::new(InMemoryRoleRepository::new(config.role_grants.clone())),
            )
        }
    };

    // 4. Explicit wiring of codec, authorization, catalog service and gate.
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(&config, products, roles));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server terminated");
    }
}
