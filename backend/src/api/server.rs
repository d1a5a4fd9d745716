//! HTTP server exposing the dashboard pipeline.
//!
//! Each request builds its own [`FilterSelection`]; the cleaned dataset comes
//! from the shared [`DATASET_CACHE`].
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                               |
//! |--------|-------------------|-------------------------------------------|
//! | GET    | `/health`         | Health check                              |
//! | GET    | `/api/options`    | Filter values, overview, cleaning report  |
//! | GET    | `/api/dashboard`  | Metrics and aggregations for a selection  |
//! | GET    | `/api/export`     | Filtered rows as CSV download             |
//! | GET    | `/api/logs`       | SSE stream for real-time logs             |

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{
    convert::Infallible,
    env,
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, LOG_BROADCASTER};
use super::types::{error_response, DashboardResponse, FilterQuery, OptionsResponse};
use crate::cache::{CachedDataset, DATASET_CACHE};
use crate::error::{PipelineError, ServerError, ServerResult};
use crate::export::{EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
use crate::transform::filter::FilterSelection;
use crate::transform::pipeline::{build_dashboard, export_selection, DashboardOptions};

/// Default dataset path when neither flag nor env var is set.
pub const DEFAULT_DATA_PATH: &str = "train.csv";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data: PathBuf,
    pub dashboard: DashboardOptions,
}

impl ServerConfig {
    /// Read `SALESDASH_PORT` and `SALESDASH_DATA`, falling back to defaults.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let port = env::var("SALESDASH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let data = env::var("SALESDASH_DATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_PATH));

        Self {
            port,
            data,
            dashboard: DashboardOptions::default(),
        }
    }
}

struct AppState {
    data: PathBuf,
    dashboard: DashboardOptions,
}

type HttpError = (StatusCode, Json<Value>);

/// Start the HTTP server.
///
/// The dataset is loaded before binding: a source that cannot be loaded or
/// cleaned stops the server with that error.
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let dataset = cached_dataset(config.data.clone()).await?;
    log_info(format!(
        "Serving {} cleaned rows from {}",
        dataset.dataset.table.len(),
        dataset.fingerprint.path.display()
    ));

    let state = Arc::new(AppState {
        data: config.data,
        dashboard: config.dashboard,
    });

    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE, header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/options", get(options))
        .route("/api/dashboard", get(dashboard))
        .route("/api/export", get(export_csv))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    eprintln!("🚀 SalesDash server running on http://localhost:{}", config.port);
    eprintln!("   GET /api/options   - Filter values and cleaning report");
    eprintln!("   GET /api/dashboard - Metrics for ?regions=..&categories=..");
    eprintln!("   GET /api/export    - Filtered CSV download");
    eprintln!("   GET /api/logs      - SSE log stream");
    eprintln!("   GET /health        - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Load through the cache off the async runtime.
async fn cached_dataset(path: PathBuf) -> ServerResult<Arc<CachedDataset>> {
    tokio::task::spawn_blocking(move || DATASET_CACHE.get_or_load(&path))
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(ServerError::from)
}

fn into_http(err: ServerError) -> HttpError {
    let status = match &err {
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Pipeline(PipelineError::Load(_) | PipelineError::Cleaning(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        ServerError::Pipeline(_) | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    log_error(err.to_string());
    (status, Json(error_response(&err.to_string())))
}

fn selection_for(dataset: &CachedDataset, query: &FilterQuery) -> FilterSelection {
    FilterSelection::from_parts(&dataset.dataset.table, query.regions(), query.categories())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "salesdash",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "options": "GET /api/options",
            "dashboard": "GET /api/dashboard",
            "export": "GET /api/export",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

async fn options(State(state): State<Arc<AppState>>) -> Result<Json<OptionsResponse>, HttpError> {
    let cached = cached_dataset(state.data.clone()).await.map_err(into_http)?;
    Ok(Json(OptionsResponse::from(&cached.dataset)))
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<Json<DashboardResponse>, HttpError> {
    let cached = cached_dataset(state.data.clone()).await.map_err(into_http)?;
    let selection = selection_for(&cached, &query);
    let dashboard = build_dashboard(&cached.dataset, &selection, &state.dashboard);

    Ok(Json(DashboardResponse::from(dashboard)))
}

async fn export_csv(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let cached = cached_dataset(state.data.clone()).await.map_err(into_http)?;
    let selection = selection_for(&cached, &query);
    let bytes = export_selection(&cached.dataset, &selection)
        .map_err(|e| into_http(ServerError::from(e)))?;

    let headers = [
        (header::CONTENT_TYPE, EXPORT_MIME_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
        ),
    ];
    Ok((headers, bytes))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Resolve the dataset path: explicit flag, then env, then default.
pub fn resolve_data_path(flag: Option<&Path>) -> PathBuf {
    flag.map(Path::to_path_buf)
        .unwrap_or_else(|| ServerConfig::from_env().data)
}
