use std::time::Duration;

use anyhow::Context;
use axum::{
    http::Method,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use gutachten_api::config::{self, SecurityConfig};
use gutachten_api::database::manager::DatabaseManager;
use gutachten_api::handlers::{grades, reports, themes};
use gutachten_api::middleware::{jwt_auth_middleware, security_headers_middleware};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AUTH_DOMAIN, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Gutachten API in {:?} mode", config.environment);

    // Mirrors the original deployment's startup hook; a failure here leaves
    // the server up with /health reporting degraded
    if let Err(e) = DatabaseManager::ensure_schema().await {
        tracing::warn!("Schema bootstrap failed: {}", e);
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Gutachten API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}

fn app() -> Router {
    let security = &config::config().security;

    let mut app = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Owner-scoped resources behind token validation
        .merge(protected_routes())
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(security_headers_middleware));

    if security.enable_cors {
        app = app.layer(cors_layer(security));
    }

    app
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
        .max_age(Duration::from_secs(security.cors_max_age_secs))
}

fn protected_routes() -> Router {
    Router::new()
        .merge(report_routes())
        .merge(theme_routes())
        .merge(grade_routes())
        .route_layer(from_fn(jwt_auth_middleware))
}

fn report_routes() -> Router {
    Router::new()
        .route("/reports", get(reports::list).post(reports::create))
        .route("/reports/:id", get(reports::get).put(reports::update))
}

fn theme_routes() -> Router {
    Router::new()
        .route("/themes", get(themes::list).post(themes::create))
        .route(
            "/themes/:id",
            get(themes::get).put(themes::update).delete(themes::delete),
        )
}

fn grade_routes() -> Router {
    Router::new().route("/grades", post(grades::create_bulk).put(grades::update_bulk))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "name": "Gutachten API",
        "version": version,
        "description": "Backend for structured evaluation reports, themes and grade snippets",
        "endpoints": {
            "reports": "/reports[/:id] (bearer token required)",
            "themes": "/themes[/:id] (bearer token required)",
            "grades": "/grades (bearer token required, bulk only)",
            "health": "/health (public)"
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn router_builds_with_all_routes() {
        let _ = app();
    }
}
