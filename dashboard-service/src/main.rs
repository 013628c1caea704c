use dashboard_service::{AppState, build_router, config::DashboardConfig, services::Database};
use service_core::middleware::rate_limit::create_ip_rate_limiter;
use service_core::observability::logging::init_tracing;
use std::net::SocketAddr;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration - fail fast if invalid
    let config = DashboardConfig::from_env()?;

    // Initialize tracing/logging using shared logic
    init_tracing(&config.service_name, &config.log_level, &config.otlp_endpoint);

    // Initialize metrics
    dashboard_service::services::metrics::init_metrics();

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting invoice dashboard service"
    );

    // Initialize database connection
    tracing::info!("Initializing database connection");
    let db = Database::new(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;

    db.run_migrations().await?;
    tracing::info!("Database initialized successfully");

    // Initialize JWT service
    let jwt = dashboard_service::services::JwtService::new(&config.jwt)?;
    tracing::info!("JWT service initialized");

    // Initialize rate limiters using shared logic
    let login_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.login_attempts,
        config.rate_limit.login_window_seconds,
    );
    let signup_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.signup_attempts,
        config.rate_limit.signup_window_seconds,
    );
    let ip_rate_limiter = create_ip_rate_limiter(
        config.rate_limit.global_ip_limit,
        config.rate_limit.global_ip_window_seconds,
    );
    tracing::info!("Rate limiters initialized: Login, Signup and Global IP");

    // Create application state
    let state = AppState {
        config: config.clone(),
        db,
        jwt,
        login_rate_limiter,
        signup_rate_limiter,
        ip_rate_limiter,
    };

    // Build application router
    let app = build_router(state).await?;

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));

    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    service_core::axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
