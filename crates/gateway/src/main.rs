//! CareerLens API Gateway
//!
//! The main entry point for all external API requests.
//! Handles:
//! - Authentication and authorization
//! - Rate limiting
//! - Request routing
//! - Observability (logging, metrics, tracing)

mod handlers;
mod middleware;

use axum::{
    routing::{delete, get, post, put},
    Extension, Router,
};
use careerlens_common::{
    auth::JwtManager,
    config::AppConfig,
    db::{seed, DbPool, Repository},
    embeddings::{create_embedder, Embedder},
    errors::AppError,
    generation::{create_generator, Generator},
    metrics,
};
use careerlens_matching::{MatchEngine, NarrativeSelector};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DbPool,
    pub engine: Arc<MatchEngine>,
    pub selector: Arc<NarrativeSelector>,
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn Generator>,
}

impl AppState {
    pub fn repo(&self) -> Repository {
        Repository::new(self.db.clone())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .json()
        .init();

    info!("Starting CareerLens API Gateway v{}", careerlens_common::VERSION);

    // Load configuration
    let config = AppConfig::load().map_err(|e| {
        tracing::error!(error = %e, "Failed to load configuration");
        e
    })?;
    let config = Arc::new(config);

    // Initialize metrics
    metrics::register_metrics();
    if config.observability.metrics_port != 0 {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.observability.metrics_port));
        PrometheusBuilder::new().with_http_listener(addr).install()?;
        info!("Metrics exporter listening on {}", addr);
    }

    // Initialize database connection
    let db = DbPool::new(&config.database).await?;

    // Seed the fixed career categories; upserts, so re-running is harmless
    let repo = Repository::new(db.clone());
    seed::seed_categories(&repo).await?;

    // Providers and matching core
    let embedder = create_embedder(&config.embedding)?;
    let generator = create_generator(&config.generation)?;
    let store = Arc::new(repo.clone());
    let engine = Arc::new(MatchEngine::new(store.clone()));
    let selector = Arc::new(
        NarrativeSelector::new(store).with_selection_count(config.matching.narrative_insights),
    );

    let jwt_secret = config
        .auth
        .jwt_secret
        .clone()
        .ok_or_else(|| AppError::Configuration {
            message: "APP__AUTH__JWT_SECRET must be set".to_string(),
        })?;
    let jwt = JwtManager::new(&jwt_secret, config.auth.jwt_expiration_secs);

    let state = AppState {
        config: config.clone(),
        db,
        engine,
        selector,
        embedder,
        generator,
    };

    // Build the router
    let app = create_router(state, jwt, &config);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Create the main application router
fn create_router(state: AppState, jwt: JwtManager, config: &AppConfig) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Request ID propagation
    let request_id = SetRequestIdLayer::x_request_id(MakeRequestUuid);
    let propagate_id = PropagateRequestIdLayer::x_request_id();

    // API routes
    let mut api_routes = Router::new()
        // Health endpoints (no auth)
        .route("/health", get(handlers::health::health))
        .route("/ready", get(handlers::health::ready))
        // Category endpoints
        .route("/categories", get(handlers::categories::list_categories))
        // Insight endpoints
        .route("/insights", post(handlers::insights::create_insight))
        .route("/insights", get(handlers::insights::list_insights))
        .route("/insights/{id}", get(handlers::insights::get_insight))
        .route("/insights/{id}", put(handlers::insights::update_insight))
        .route("/insights/{id}", delete(handlers::insights::delete_insight))
        // Job endpoints
        .route("/jobs", post(handlers::jobs::create_job))
        .route("/jobs", get(handlers::jobs::list_jobs))
        .route("/jobs/{id}", get(handlers::jobs::get_job))
        // Matching endpoints
        .route(
            "/jobs/{id}/match-insights",
            post(handlers::matching::match_insights),
        )
        .route("/jobs/{id}/matches", get(handlers::matching::list_matches))
        // Narrative endpoints
        .route(
            "/jobs/{id}/generate-narrative",
            post(handlers::narratives::generate_narrative),
        )
        .route("/narratives", get(handlers::narratives::list_narratives))
        .route(
            "/narratives/{id}",
            get(handlers::narratives::get_narrative),
        );

    if config.rate_limit.enabled {
        let limiter = middleware::rate_limit::create_rate_limiter(
            config.rate_limit.requests_per_second,
            config.rate_limit.burst,
        );
        let limit = config.rate_limit.requests_per_second;
        api_routes = api_routes.layer(axum::middleware::from_fn(
            move |request, next| {
                let limiter = limiter.clone();
                async move {
                    middleware::rate_limit::rate_limit_middleware(request, next, limiter, limit)
                        .await
                }
            },
        ));
    }

    // Compose the app
    Router::new()
        .nest("/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(jwt))
        .layer(request_id)
        .layer(propagate_id)
        .with_state(state)
}

/// Graceful shutdown signal handler
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
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}
