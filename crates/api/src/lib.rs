mod rate_limit;

use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::extract::{Json, State};
use axum::http::{header, HeaderValue, Method, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{body::Body, Router};
use divider_chunking::Chunker;
use divider_core::{chunk_size_from_i64, ChunkError, DividerSettings};
use divider_observability::AppMetrics;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

pub use crate::rate_limit::WindowRateLimiter;

pub const MAX_REQUEST_BODY_BYTES: usize = 256 * 1024;

#[derive(Clone)]
pub struct ApiState {
    pub chunker: Arc<Chunker>,
    pub default_max_chunk_size: usize,
    pub metrics: Arc<AppMetrics>,
    pub limiter: WindowRateLimiter,
    pub allowed_origins: Arc<Vec<String>>,
}

impl ApiState {
    pub fn new(settings: DividerSettings, limiter: WindowRateLimiter) -> Self {
        Self {
            chunker: Arc::new(Chunker::new(settings.chunker)),
            default_max_chunk_size: settings.max_chunk_size,
            metrics: AppMetrics::shared(),
            limiter,
            allowed_origins: Arc::new(Vec::new()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChunkRequest {
    text: String,
    #[serde(default)]
    max_chunk_size: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp_utc: String,
    default_max_chunk_size: usize,
    metrics: divider_observability::MetricsSnapshot,
}

pub async fn build_app() -> Result<Router> {
    let settings = DividerSettings::from_env().context("failed to load divider settings")?;

    let rate_limit_window = Duration::from_secs(
        env::var("DIVIDER_API_RATE_LIMIT_WINDOW_SECONDS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60),
    );
    let rate_limit_max = env::var("DIVIDER_API_RATE_LIMIT_MAX")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(120);

    let mut state = ApiState::new(
        settings,
        WindowRateLimiter::new(rate_limit_window, rate_limit_max),
    );
    state.allowed_origins = Arc::new(parse_allowed_origins());

    tracing::info!(
        default_max_chunk_size = state.default_max_chunk_size,
        rate_limit_max,
        rate_limit_window_secs = rate_limit_window.as_secs(),
        "divider api configured"
    );

    Ok(build_router(state))
}

pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/chunks", post(divide))
        .layer(build_cors_layer(&state.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health(State(state): State<ApiState>) -> impl IntoResponse {
    let payload = HealthResponse {
        status: "ok",
        timestamp_utc: chrono::Utc::now().to_rfc3339(),
        default_max_chunk_size: state.default_max_chunk_size,
        metrics: state.metrics.snapshot(),
    };
    (StatusCode::OK, Json(payload))
}

async fn divide(
    State(state): State<ApiState>,
    Json(request): Json<ChunkRequest>,
) -> impl IntoResponse {
    let started = Instant::now();
    state.metrics.inc_request();

    let result = requested_size(request.max_chunk_size.as_ref(), state.default_max_chunk_size)
        .and_then(|size| state.chunker.report(&request.text, size));
    state.metrics.observe_latency(started.elapsed());

    match result {
        Ok(report) => {
            state.metrics.add_chunks(report.total_chunks);
            tracing::info!(
                input_chars = report.input_chars,
                max_chunk_size = report.max_chunk_size,
                total_chunks = report.total_chunks,
                "prompt divided"
            );
            (StatusCode::OK, Json(report)).into_response()
        }
        Err(err) => {
            state.metrics.inc_rejected(err.code());
            tracing::warn!(error = %err, "rejected chunk request");
            chunk_error_response(&err)
        }
    }
}

fn requested_size(value: Option<&serde_json::Value>, default: usize) -> Result<usize, ChunkError> {
    match value {
        None | Some(serde_json::Value::Null) => Ok(default),
        Some(value) => match value.as_i64() {
            Some(size) => chunk_size_from_i64(size),
            None => Err(ChunkError::InvalidArgument(format!(
                "max_chunk_size must be a positive integer, got {value}"
            ))),
        },
    }
}

fn chunk_error_response(err: &ChunkError) -> Response {
    let status = match err {
        ChunkError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        ChunkError::Configuration { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };

    (
        status,
        Json(serde_json::json!({
            "error": err.code(),
            "message": err.to_string()
        })),
    )
        .into_response()
}

fn parse_allowed_origins() -> Vec<String> {
    env::var("DIVIDER_ALLOWED_ORIGINS")
        .unwrap_or_default()
        .split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn build_cors_layer(allowed_origins: &Arc<Vec<String>>) -> CorsLayer {
    let origins = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();
    let origins = if origins.is_empty() {
        vec![HeaderValue::from_static("http://localhost:3000")]
    } else {
        origins
    };

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn rate_limit_middleware(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    if request.method() == Method::OPTIONS || request.uri().path() == "/health" {
        return next.run(request).await;
    }

    let ip = request_ip(&request);
    if let Err(retry_after) = state.limiter.check(&ip) {
        state.metrics.inc_rejected("rate_limited");
        let mut response = (
            StatusCode::TOO_MANY_REQUESTS,
            Json(serde_json::json!({
                "error": "rate_limited",
                "message": "rate limit exceeded for this IP"
            })),
        )
            .into_response();
        if let Ok(value) = HeaderValue::from_str(&retry_after.as_secs().max(1).to_string()) {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        return response;
    }

    next.run(request).await
}

fn request_ip(request: &Request<Body>) -> String {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .next()
                .unwrap_or("unknown")
                .trim()
                .to_string()
        })
        .unwrap_or_else(|| "local".to_string())
}
