//! HTTP service: application state, router and server lifecycle.
//!
//! [`serve`] opens the database, builds the embedding client over the built-in
//! provider registry, and runs the axum router until Ctrl-C. The database
//! handle is disposed once the server has drained.

pub mod error;
pub mod extract;
pub mod routes;

use anyhow::Result;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

use crate::config::OpenSkillsConfig;
use crate::db::Database;
use crate::embedding::{EmbeddingClient, ProviderRegistry};

/// Shared, explicitly owned state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub embeddings: EmbeddingClient,
    pub config: Arc<OpenSkillsConfig>,
}

impl AppState {
    pub fn new(db: Database, embeddings: EmbeddingClient, config: OpenSkillsConfig) -> Self {
        Self {
            db,
            embeddings,
            config: Arc::new(config),
        }
    }
}

/// Build the application router.
///
/// Handler panics become JSON 500 responses and CORS follows
/// `server.cors_origins`.
pub fn router(state: AppState) -> Router {
    let debug = state.config.server.debug;
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/providers", get(routes::providers))
        .route("/embeddings", post(routes::create_embedding))
        .route("/skills", get(routes::list_skills).post(routes::create_skill))
        .route("/skills/{id}", get(routes::get_skill))
        .route(
            "/skills/{id}/versions",
            get(routes::list_versions).post(routes::publish_version),
        )
        .with_state(state)
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn std::any::Any + Send + 'static>| {
                error::panic_response(panic, debug)
            },
        ))
        .layer(cors)
}

/// CORS for the configured origins. A `"*"` entry allows any origin; an
/// explicit list also allows credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Run the HTTP service until Ctrl-C.
pub async fn serve(config: OpenSkillsConfig) -> Result<()> {
    let bind_addr = config.server.bind_addr();
    let db_path = config.resolved_db_path();

    let db = Database::open(&db_path)?;
    tracing::info!(db = %db_path.display(), "database ready");

    let embeddings = EmbeddingClient::new(Arc::new(ProviderRegistry::builtin()));
    tracing::info!(
        providers = ?embeddings.registry().identifiers(),
        "embedding providers ready"
    );

    tracing::info!(
        environment = %config.server.environment,
        version = env!("CARGO_PKG_VERSION"),
        mode = "service",
        "open-skills service startup"
    );

    let app = router(AppState::new(db.clone(), embeddings, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening at http://{bind_addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("open-skills service shutdown");
    db.dispose()?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
