pub mod state;
pub mod validate;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use jobgraph_graph::GraphStore;
use jobgraph_probe::{FetchOutcome, NetworkProbe, ResolveOutcome};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub use state::AppState;
pub use validate::{validate_request, SubmitRequest};

/// `POST /` — the Manager's single route, implementing the submit protocol
/// exactly: reject malformed bodies, validate schema + SSRF, probe
/// reachability, check for an idempotent duplicate, plant ROOT.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SubmitRequest>,
) -> impl IntoResponse {
    let validated = match validate_request(&body) {
        Ok(v) => v,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"Error": e.message()})),
            )
                .into_response();
        }
    };

    let (root_name, scheme) = state.probe.normalize(&validated.url);

    match state
        .probe
        .fetch(&root_name, scheme, state.probe_timeout_secs)
        .await
    {
        FetchOutcome::Ok { .. } => {}
        FetchOutcome::Fail => {
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"Error": "Requested URL was not found"})),
            )
                .into_response();
        }
    }

    match state
        .graph
        .match_by_key(&root_name, validated.depth, validated.mode)
        .await
    {
        Ok(Some(_)) => {
            return (
                StatusCode::OK,
                Json(serde_json::json!({"Info": "requested url was already searched"})),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            warn!(error = %e, "store lookup failed during submit");
            return (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"Error": "Requested URL was not found"})),
            )
                .into_response();
        }
    }

    let (ip, domain) = match state.probe.resolve(&root_name).await {
        ResolveOutcome::Ok { domain, ip } => (Some(ip), Some(domain)),
        ResolveOutcome::NotResolved => {
            info!(name = %root_name, "root did not resolve via DNS walk, planting ROOT anyway");
            (None, None)
        }
    };

    let root = match jobgraph_core::JobNode::root(
        root_name.clone(),
        scheme,
        validated.depth,
        validated.mode,
        ip,
        domain,
    ) {
        Ok(n) => n,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"Error": e.to_string()})),
            )
                .into_response();
        }
    };

    if let Err(e) = state.graph.create_node(root).await {
        warn!(error = %e, "failed to create ROOT node");
        return (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"Error": "Requested URL was not found"})),
        )
            .into_response();
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({"Success": "Job started"})),
    )
        .into_response()
}

pub async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.graph.health_check().await {
        Ok(true) => (StatusCode::OK, "ok").into_response(),
        _ => (StatusCode::SERVICE_UNAVAILABLE, "store unreachable").into_response(),
    }
}

/// Assembles the Manager's router: submit + health routes, CORS, security
/// headers, and a privacy-conscious request span that logs method and path
/// only.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", post(submit))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(SetResponseHeaderLayer::overriding(
            header::HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}
