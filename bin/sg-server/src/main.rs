//! ScopeGate Server
//!
//! Production server for the principal registry REST API.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SG_API_PORT` | `8080` | HTTP API port |
//! | `SG_DATABASE_URL` | `sqlite://scopegate.db?mode=rwc` | SQLite connection URL |
//! | `RUST_LOG` | `info` | Log level |
//! | `LOG_FORMAT` | text | Set to `json` for JSON logs |

use std::sync::Arc;

use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use sg_registry::middleware::{AppState, AuthLayer};
use sg_registry::user::{users_router, SqliteUserRepository, UserService, UsersState};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    sg_common::logging::init_logging("sg-server");

    info!("Starting ScopeGate Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("SG_API_PORT", 8080);
    let database_url = env_or("SG_DATABASE_URL", "sqlite://scopegate.db?mode=rwc");

    // Connect storage
    info!("Connecting to database: {}", database_url);
    let repository = Arc::new(SqliteUserRepository::connect(&database_url).await?);
    let user_service = Arc::new(UserService::new(repository));

    let app_state = AppState {
        user_service: Arc::clone(&user_service),
    };
    let users_state = UsersState { user_service };

    // Build API router with auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/api/users", users_router(users_state))
        .split_for_parts();

    openapi.info.title = "ScopeGate API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description =
        Some("Scope-gated principal registry: mutations require scope domination".to_string());

    let app: Router = router
        .route("/health", get(health_handler))
        // OpenAPI / Swagger UI with auto-collected paths
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        // Auth middleware
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let listener = TcpListener::bind(&api_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("ScopeGate Server shutdown complete");
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
