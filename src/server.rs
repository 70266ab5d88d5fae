use crate::config::Config;
use crate::distance::DistanceNormalizer;
use crate::gateway::SupabaseStore;
use crate::handlers;
use crate::readiness::{readiness, ReadinessSignal};
use crate::state::AppState;
use crate::storage::ShowStore;
use axum::{
    http::Method,
    routing::{get, post},
    Router,
};
use hyper::Server;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_text))
        .route("/api/distance", post(handlers::distance))
        .route("/api/login", post(handlers::login))
        .route("/api/me", get(handlers::me))
        .route("/api/dashboard", get(handlers::dashboard))
        .route("/api/shows", get(handlers::list_shows).post(handlers::create_show))
        .route("/api/shows/place", post(handlers::apply_place))
        .route(
            "/api/shows/:id",
            get(handlers::get_show)
                .put(handlers::update_show)
                .delete(handlers::delete_show),
        )
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}

/// Probes the store once and reports the outcome on `signal`. A probe that
/// outlives `timeout` counts as a failure, so the outcome is always terminal.
pub async fn probe_backend(store: Arc<dyn ShowStore>, signal: ReadinessSignal, timeout: Duration) {
    match tokio::time::timeout(timeout, store.probe()).await {
        Ok(Ok(())) => {
            info!("Backend is reachable");
            signal.ready();
        }
        Ok(Err(e)) => {
            error!("Backend probe failed: {}", e);
            signal.unavailable(e.to_string());
        }
        Err(_) => {
            error!("Backend probe did not answer within {:?}", timeout);
            signal.unavailable(format!("backend probe timed out after {:?}", timeout));
        }
    }
}

/// Start the HTTP server on the configured port
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    let store: Arc<dyn ShowStore> = Arc::new(SupabaseStore::new(&config.backend));
    let distance = DistanceNormalizer::from_config(&config);

    let readiness_timeout = Duration::from_millis(config.backend.readiness_timeout_ms);
    let (signal, backend_ready) = readiness();
    tokio::spawn(probe_backend(store.clone(), signal, readiness_timeout));

    let state = AppState::new(store, distance, backend_ready, readiness_timeout);
    let app = create_router(state);

    let port = config.server.port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    info!("HTTP server running on http://localhost:{}", port);
    info!("Health check: http://localhost:{}/health", port);
    info!("Distance:     http://localhost:{}/api/distance", port);

    Server::bind(&addr).serve(app.into_make_service()).await?;

    Ok(())
}
