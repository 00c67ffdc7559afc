use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::{Json, Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use parking_lot::Mutex;
use runtime::{Dashboard, DashboardView, Event};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod sources;

use config::ServerConfig;

#[derive(Clone)]
struct AppState {
    dashboard: Arc<Mutex<Dashboard>>,
}

impl AppState {
    fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard: Arc::new(Mutex::new(dashboard)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Pixel {
    x: f64,
    y: f64,
}

#[derive(Debug, Serialize)]
struct ClickResponse {
    state: Option<String>,
    view: DashboardView,
}

#[derive(Debug, Serialize)]
struct YearsResponse<'a> {
    years: &'a [i32],
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            std::process::exit(1);
        }
    };

    info!(grid = %config.grid_source, geography = %config.geo_source, "loading dashboard inputs");
    let dashboard = match sources::load_dashboard(&reqwest::Client::new(), &config).await {
        Ok(dashboard) => dashboard,
        Err(err) => {
            error!("startup load failed: {err}");
            std::process::exit(1);
        }
    };

    let listener = match tokio::net::TcpListener::bind(config.addr).await {
        Ok(listener) => listener,
        Err(err) => {
            error!("failed to bind {}: {err}", config.addr);
            std::process::exit(1);
        }
    };

    info!("climate dashboard listening on http://{}", config.addr);
    if let Err(err) = axum::serve(listener, router(AppState::new(dashboard))).await {
        error!("server error: {err}");
        std::process::exit(1);
    }
}

fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/view", get(get_view))
        .route("/api/events", post(post_event))
        .route("/api/hover", get(get_hover))
        .route("/api/click", post(post_click))
        .route("/api/years", get(get_years))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_view(State(state): State<AppState>) -> Response {
    let view = state.dashboard.lock().render();
    json_response(&view)
}

async fn post_event(State(state): State<AppState>, Json(event): Json<Event>) -> Response {
    let view = {
        let mut dashboard = state.dashboard.lock();
        dashboard.dispatch(event);
        dashboard.render()
    };
    json_response(&view)
}

async fn get_hover(State(state): State<AppState>, Query(pixel): Query<Pixel>) -> Response {
    let tooltip = state.dashboard.lock().hover([pixel.x, pixel.y]);
    json_response(&tooltip)
}

async fn post_click(State(state): State<AppState>, Json(pixel): Json<Pixel>) -> Response {
    let response = {
        let mut dashboard = state.dashboard.lock();
        let clicked = dashboard.click([pixel.x, pixel.y]);
        ClickResponse {
            state: clicked,
            view: dashboard.render(),
        }
    };
    json_response(&response)
}

async fn get_years(State(state): State<AppState>) -> Response {
    let dashboard = state.dashboard.lock();
    json_response(&YearsResponse {
        years: dashboard.years(),
    })
}

fn json_response<T: Serialize>(value: &T) -> Response {
    let body = match serde_json::to_string(value) {
        Ok(v) => v,
        Err(err) => {
            error!("response serialization failed: {err}");
            return (StatusCode::INTERNAL_SERVER_ERROR, "serialization error").into_response();
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        http::header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    (StatusCode::OK, headers, Body::from(body)).into_response()
}
