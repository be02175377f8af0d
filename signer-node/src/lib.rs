//! Post-quantum signature service node
//!
//! Exposes CRYSTALS-Dilithium key generation, detached signing, verification
//! and per-mode benchmarking over HTTP, plus a small record store for files
//! published under public storage.
//!
//! # Architecture
//!
//! ```text
//!               ┌──────────────┐
//!  HTTP ───────►│     api      │  ← routing, extraction, responses
//!               └──────┬───────┘
//!                      │ Extension<Arc<AppContext>>
//!        ┌─────────────┼──────────────────┐
//!        ▼             ▼                  ▼
//!   SignatureWorkflow  DocumentStore   DocumentFiles
//!        │
//!   ┌────┴─────┬──────────────┐
//!   ▼          ▼              ▼
//! input    pqc_signer     packaging
//! (upload, (Dilithium2/   (keys.zip,
//!  fetch)   3/5 engine)    signature-*.sig)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use signer_node::{api::build_router, AppContext, ServiceConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let context = Arc::new(AppContext::init(ServiceConfig::default()).await?);
//!     let app = build_router(context.clone());
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!
//!     context.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod context;
pub mod document_store;
pub mod error;
pub mod input;
pub mod packaging;
pub mod types;
pub mod workflow;

// Re-export commonly used types
pub use context::AppContext;
pub use document_store::{DocumentFiles, DocumentStore, JsonDocumentStore};
pub use error::{Result, ServiceError};
pub use types::{AnalysisReport, Document, DocumentView, ServiceConfig, VerifyResponse};
pub use workflow::SignatureWorkflow;
