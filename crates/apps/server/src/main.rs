use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use clap::Parser;
use formats::TripData;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod files;
mod summary;

use summary::ItinerarySummary;

#[derive(Parser, Debug)]
#[command(author, version, about = "Static server for the trip viewer site")]
struct Args {
    /// Site directory (index.html, itinerary.json, images, route files)
    #[arg(long, env = "TRIP_ROOT", default_value = ".")]
    root: PathBuf,

    /// Listen address
    #[arg(long, env = "TRIP_ADDR", default_value = "127.0.0.1:8000")]
    addr: SocketAddr,

    /// Itinerary feed, relative to the site directory
    #[arg(long, env = "TRIP_ITINERARY", default_value = "itinerary.json")]
    itinerary: PathBuf,
}

#[derive(Clone)]
struct AppState {
    root: Arc<PathBuf>,
    itinerary: Arc<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let state = AppState {
        itinerary: Arc::new(args.root.join(&args.itinerary)),
        root: Arc::new(args.root),
    };

    match load_itinerary(&state).await {
        Ok(trip) => {
            let summary = ItinerarySummary::of(&trip);
            info!(
                "itinerary ok: {} days on {} markers",
                summary.days, summary.markers
            );
            for q in &summary.quarantined {
                warn!("itinerary record #{} skipped: {}", q.index, q.reason);
            }
        }
        Err(err) => warn!("itinerary at {:?} is not servable: {err}", state.itinerary),
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::OPTIONS]);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/api/itinerary/summary", get(get_summary))
        .fallback(get_static)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let listener = match tokio::net::TcpListener::bind(args.addr).await {
        Ok(l) => l,
        Err(err) => {
            error!("cannot bind {}: {err}", args.addr);
            std::process::exit(1);
        }
    };
    info!("trip server listening on http://{}", args.addr);
    if let Err(err) = axum::serve(listener, app).await {
        error!("server stopped: {err}");
        std::process::exit(1);
    }
}

async fn load_itinerary(state: &AppState) -> Result<TripData, String> {
    let bytes = tokio::fs::read(state.itinerary.as_path())
        .await
        .map_err(|e| e.to_string())?;
    TripData::from_json_slice(&bytes).map_err(|e| e.to_string())
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_summary(State(state): State<AppState>) -> Response {
    let (status, body) = match load_itinerary(&state).await {
        Ok(trip) => match serde_json::to_value(ItinerarySummary::of(&trip)) {
            Ok(v) => (StatusCode::OK, v),
            Err(err) => {
                error!("summary serialization failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "summary error" }))
            }
        },
        Err(err) => {
            warn!("summary requested for invalid itinerary: {err}");
            (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": err }))
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    (status, headers, Body::from(body.to_string())).into_response()
}

async fn get_static(State(state): State<AppState>, uri: Uri) -> Response {
    let Some(path) = files::resolve_request(&state.root, uri.path()) else {
        return (StatusCode::BAD_REQUEST, "invalid path").into_response();
    };
    match tokio::fs::read(&path).await {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                http::header::CONTENT_TYPE,
                HeaderValue::from_static(files::content_type_for(&path)),
            );
            (StatusCode::OK, headers, Body::from(data)).into_response()
        }
        Err(err) => {
            warn!("file read failed: {path:?} -> {err}");
            (StatusCode::NOT_FOUND, "not found").into_response()
        }
    }
}
