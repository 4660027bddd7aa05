pub mod payment;

use std::{net::Ipv4Addr, sync::Arc, time::Duration};

use anyhow::Result;
use axum::{Json, Router, http::Request, routing};
use serde_json::{Value, json};
use tokio::net::TcpListener;

use crate::processor::PaymentProcessor;

pub type Processor = Arc<dyn PaymentProcessor>;

pub async fn serve(port: u16, app: Router) -> Result<()> {
    tracing::info!("starting API");

    let socket = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
    tracing::info!("binding to network socket on {port}");

    axum::serve(socket, app).await?;

    Ok(())
}

/// Payment routes mounted under `base_path`, plus `/health` at the root.
pub fn router(base_path: &str, processor: Processor) -> Router {
    let layer = tower_http::trace::TraceLayer::new_for_http()
        .on_request(|request: &Request<_>, _: &tracing::Span| {
            tracing::debug!(method = ?request.method(), url = ?request.uri(), "req");
        })
        .on_response(
            |response: &axum::http::Response<_>, latency: Duration, _: &tracing::Span| {
                tracing::debug!(status = ?response.status(), ?latency, "res");
            },
        );

    let payments = Router::new()
        .route("/process", routing::post(payment::initiate))
        .route("/success/{payment_id}", routing::post(payment::succeed))
        .route("/fail/{payment_id}", routing::post(payment::fail))
        .with_state(processor);

    let app = match base_path.trim_matches('/') {
        "" => Router::new().merge(payments),
        base => Router::new().nest(&format!("/{base}"), payments),
    };

    app.route("/health", routing::get(health)).layer(layer)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
