// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! BIM Showcase Server - load, resize, move and inspect IFC objects.
//!
//! One viewer session per server. Models come from the objects directory
//! (`OBJECTS_DIR`), are converted on the blocking pool and installed into
//! the session; every panel of the showcase maps to an endpoint below.
//!
//! # Endpoints
//!
//! - `GET /api/v1/health` - Health check
//! - `GET /api/v1/models` - Demo catalog and model files on disk
//! - `POST /api/v1/session/load` - Load a model (`{"file_name": "..."}`)
//! - `GET /api/v1/session` - Session state
//! - `POST /api/v1/session/dimensions/apply` - Rescale to target dimensions
//! - `POST /api/v1/session/dimensions/reset` - Restore the original scale
//! - `POST /api/v1/session/drag` - Drag the model on the ground plane
//! - `GET /api/v1/session/views` - Floor plans and elevations
//! - `POST /api/v1/session/lighting` - Light intensities
//! - `GET /api/v1/session/elements/:id/properties` - Property inspector
//! - `GET /api/v1/session/elements/:id/properties.tsv` - TSV export
//! - `DELETE /api/v1/session/selection` - Clear the selection

use anyhow::Context;
use axum::{
    routing::{delete, get, post},
    Router,
};
use bim_showcase_viewer::{IfcImporter, ObjectsDir, ViewerSession};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod config;
mod error;
mod routes;
mod types;

use config::Config;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<ViewerSession>>,
    pub objects: Arc<ObjectsDir>,
    pub importer: IfcImporter,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let objects = ObjectsDir::new(&config.objects_dir).with_max_bytes(config.max_file_bytes());
        Self {
            session: Arc::new(Mutex::new(ViewerSession::new())),
            objects: Arc::new(objects),
            importer: IfcImporter::new(),
            config: Arc::new(config),
        }
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        // Root endpoint - API information
        .route("/", get(routes::health::info))
        .route("/api/v1/health", get(routes::health::check))
        .route("/api/v1/models", get(routes::models::list))
        // Session
        .route("/api/v1/session", get(routes::session::state))
        .route("/api/v1/session/load", post(routes::session::load))
        .route("/api/v1/session/dimensions/apply", post(routes::session::apply_dimensions))
        .route("/api/v1/session/dimensions/reset", post(routes::session::reset_dimensions))
        .route("/api/v1/session/drag", post(routes::session::drag))
        .route("/api/v1/session/views", get(routes::session::views))
        .route("/api/v1/session/lighting", post(routes::session::lighting))
        .route("/api/v1/session/elements/:id/properties", get(routes::session::properties))
        .route("/api/v1/session/elements/:id/properties.tsv", get(routes::session::properties_tsv))
        .route("/api/v1/session/selection", delete(routes::session::clear_selection))
        // Middleware
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug,bim_showcase_server=debug".into());

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).pretty().init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(config.log_json);

    tracing::info!(
        port = config.port,
        objects_dir = %config.objects_dir,
        max_file_size_mb = config.max_file_size_mb,
        worker_threads = config.worker_threads,
        "Starting BIM Showcase Server"
    );

    // Bounds extraction runs on the global rayon pool
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.worker_threads)
        .build_global()
        .context("Failed to initialize rayon thread pool")?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::new(config));

    tracing::info!("Listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
