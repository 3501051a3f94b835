use std::sync::Arc;

use axum::{routing::get, Json, Router};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use portfolio_api::broker::{
    handlers::{ActivityHandler, NotificationHandler, ResumeUpdateHandler},
    topology::{QUEUE_RESUME_NOTIFICATION, QUEUE_RESUME_UPDATE, QUEUE_USER_ACTIVITY},
    BrokerService,
};
use portfolio_api::state::AppState;
use portfolio_api::{config, database, handlers};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = config::config();
    tracing::info!("Starting portfolio API in {:?} mode", config.environment);

    let pool = database::pool::connect(&config.database)
        .unwrap_or_else(|e| panic!("invalid database configuration: {}", e));

    // Best-effort: the server still boots (degraded) when Postgres is down
    if let Err(err) = database::pool::run_migrations(&pool).await {
        tracing::warn!("Skipping migrations, database unavailable: {}", err);
    }

    let shutdown = CancellationToken::new();

    let broker = BrokerService::new(&config.broker);
    broker
        .add_consumer(QUEUE_RESUME_UPDATE, Arc::new(ResumeUpdateHandler))
        .await;
    broker
        .add_consumer(QUEUE_RESUME_NOTIFICATION, Arc::new(NotificationHandler))
        .await;
    broker
        .add_consumer(QUEUE_USER_ACTIVITY, Arc::new(ActivityHandler))
        .await;
    let broker_task = broker.clone().spawn(shutdown.clone());

    let state = AppState::new(config, pool, broker.clone());
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Server is running on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await
        .expect("server");

    // Stop the broker supervisor and wait for it to wind down
    shutdown.cancel();
    broker.close().await;
    let _ = broker_task.await;
    tracing::info!("Shutdown complete");
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state.clone())
        .merge(handlers::auth::routes(state.clone()))
        .merge(handlers::resume::routes(state.clone()))
        .merge(handlers::projects::routes(state.clone()))
        .merge(handlers::contact::routes(state.clone()))
        .merge(handlers::admin::routes(state))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::pool::health_check(&state.pool).await {
        Ok(()) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}

async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received. Closing HTTP server and broker connection...");
    token.cancel();
}
