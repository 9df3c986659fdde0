use crate::error::Result;
use crate::pipeline::Aggregator;
use crate::types::ErrorDocument;
use axum::{
    extract::State,
    http::{
        header::{ALLOW, CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

pub const INTEGRATE_PATH: &str = "/api/integrate";
const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Health check endpoint
async fn health(State(aggregator): State<Arc<Aggregator>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "feed_integrator",
        "version": env!("CARGO_PKG_VERSION"),
        "sources": aggregator.registry().names(),
    }))
}

/// Runs the pipeline once and returns the integration map.
///
/// axum routes `HEAD` to the `GET` handler, so it is rejected here.
async fn integrate(method: Method, State(aggregator): State<Arc<Aggregator>>) -> Response {
    if method != Method::GET {
        return method_not_allowed(method).await;
    }
    match aggregator.run().await {
        Ok((result, summary)) => {
            info!(
                run_id = %summary.run_id,
                "Serving integration with {} sources",
                result.len()
            );
            json_response(StatusCode::OK, &result)
        }
        Err(e) => {
            error!("Integration run failed: {}", e);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &ErrorDocument::new("integration failed", e.to_string()),
            )
        }
    }
}

async fn method_not_allowed(method: Method) -> Response {
    let mut response = json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorDocument::new(
            "method not allowed",
            format!("{method} is not supported; use GET"),
        ),
    );
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, OPTIONS"));
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (
            status,
            [(CONTENT_TYPE, JSON_CONTENT_TYPE), (CACHE_CONTROL, "no-store")],
            bytes,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// Create the HTTP router. Preflight `OPTIONS` requests are answered by the
/// CORS layer.
pub fn create_server(aggregator: Arc<Aggregator>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route(
            INTEGRATE_PATH,
            get(integrate).fallback(method_not_allowed),
        )
        .layer(cors)
        .with_state(aggregator)
}

/// Start the HTTP server on the given address.
pub async fn start_server(aggregator: Arc<Aggregator>, addr: SocketAddr) -> Result<()> {
    let app = create_server(aggregator);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server running on http://{}", addr);
    info!("Integration endpoint: http://{}{}", addr, INTEGRATE_PATH);
    axum::serve(listener, app).await?;
    Ok(())
}
