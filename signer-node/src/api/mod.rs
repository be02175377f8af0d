//! HTTP surface
//!
//! ```text
//! GET    /health
//! POST   /api/v1/generate-keypair
//! POST   /api/v1/sign-message           POST /api/v1/sign-message-url
//! POST   /api/v1/verify-signature       POST /api/v1/verify-signature-url
//! POST   /api/v1/analyze                POST /api/v1/analyze-url
//! POST   /api/v1/documents              GET  /api/v1/documents
//! PUT    /api/v1/documents
//! GET    /api/v1/documents/:id          DELETE /api/v1/documents/:id
//! GET    /public/storage/*
//! ```

use crate::context::AppContext;
use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

mod documents;
mod signature;

/// Liveness probe body
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the full router around a shared context
pub fn build_router(context: Arc<AppContext>) -> Router {
    let api = Router::new()
        .route("/generate-keypair", post(signature::generate_keypair))
        .route("/sign-message", post(signature::sign_message))
        .route("/sign-message-url", post(signature::sign_message_url))
        .route("/verify-signature", post(signature::verify_signature))
        .route("/verify-signature-url", post(signature::verify_signature_url))
        .route("/analyze", post(signature::analyze))
        .route("/analyze-url", post(signature::analyze_url))
        .route(
            "/documents",
            post(documents::create_document)
                .get(documents::list_documents)
                .put(documents::update_document),
        )
        .route(
            "/documents/:id",
            get(documents::get_document).delete(documents::delete_document),
        );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api)
        .nest_service("/public/storage", ServeDir::new(&context.config.storage_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(context.config.max_upload_bytes))
                .layer(Extension(context)),
        )
}
