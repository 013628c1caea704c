pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use service_core::axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, patch, post, put},
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, rate_limit::ip_rate_limit_middleware,
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::DashboardConfig;
use crate::services::{Database, JwtService};

#[derive(Clone)]
pub struct AppState {
    pub config: DashboardConfig,
    pub db: Database,
    pub jwt: JwtService,
    pub login_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
    pub signup_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
    pub ip_rate_limiter: service_core::middleware::rate_limit::IpRateLimiter,
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    // Login/signup get their own tighter limits
    let login_limiter = state.login_rate_limiter.clone();
    let login_route = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .layer(from_fn_with_state(login_limiter, ip_rate_limit_middleware));

    let signup_limiter = state.signup_rate_limiter.clone();
    let signup_route = Router::new()
        .route("/auth/signup", post(handlers::auth::signup))
        .layer(from_fn_with_state(signup_limiter, ip_rate_limit_middleware));

    let ip_limiter = state.ip_rate_limiter.clone();

    // Everything behind the bearer-token middleware
    let protected_routes = Router::new()
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/:customer_id",
            patch(handlers::customers::update_customer),
        )
        .route(
            "/invoices",
            get(handlers::invoices::list_invoices).post(handlers::invoices::create_invoice),
        )
        .route("/invoices/:invoice_id", get(handlers::invoices::get_invoice))
        .route(
            "/invoices/:invoice_id/status",
            patch(handlers::invoices::update_status),
        )
        .route(
            "/invoices/:invoice_id/items",
            put(handlers::invoices::replace_items),
        )
        .route("/reports/summary", get(handlers::reports::summary))
        .route(
            "/reports/monthly-revenue",
            get(handlers::reports::monthly_revenue),
        )
        .route(
            "/reports/status-breakdown",
            get(handlers::reports::status_breakdown),
        )
        .route(
            "/reports/top-customers",
            get(handlers::reports::top_customers),
        )
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/:user_id",
            patch(handlers::users::update_user).delete(handlers::users::delete_user),
        )
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .merge(login_route)
        .merge(signup_route)
        .merge(protected_routes)
        .with_state(state.clone())
        // Global IP rate limiting
        .layer(from_fn_with_state(ip_limiter, ip_rate_limit_middleware))
        // Add metrics middleware
        .layer(from_fn(metrics_middleware))
        // Add tracing layer
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &service_core::axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        // Add tracing middleware for request_id
        .layer(from_fn(request_id_middleware))
        // Add security headers middleware
        .layer(from_fn(security_headers_middleware))
        // Add CORS layer
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .map(|o| {
                            o.parse::<service_core::axum::http::HeaderValue>()
                                .unwrap_or_else(|e| {
                                    tracing::error!(
                                        "Invalid CORS origin '{}': {}. Using fallback.",
                                        o,
                                        e
                                    );
                                    service_core::axum::http::HeaderValue::from_static("*")
                                })
                        })
                        .collect::<Vec<service_core::axum::http::HeaderValue>>(),
                )
                .allow_methods([
                    service_core::axum::http::Method::GET,
                    service_core::axum::http::Method::POST,
                    service_core::axum::http::Method::PATCH,
                    service_core::axum::http::Method::PUT,
                    service_core::axum::http::Method::DELETE,
                    service_core::axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    service_core::axum::http::header::AUTHORIZATION,
                    service_core::axum::http::header::CONTENT_TYPE,
                ]),
        );

    Ok(app)
}

/// Service health check
pub async fn health_check(
    service_core::axum::extract::State(state): service_core::axum::extract::State<AppState>,
) -> Result<service_core::axum::Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "PostgreSQL health check failed");
        e
    })?;

    Ok(service_core::axum::Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "postgres": "up"
        }
    })))
}
