//! Key generation, signing, verification and analysis handlers

use crate::context::AppContext;
use crate::error::{Result, ServiceError};
use crate::input::{FormInput, MessageSource};
use crate::packaging::KeyArchive;
use crate::types::{AnalysisReport, VerifyResponse};
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{Extension, Json};
use pqc_signer::Mode;
use serde::Deserialize;
use std::sync::Arc;

/// Optional body of `generate-keypair`
#[derive(Debug, Default, Deserialize)]
struct GenerateKeyPairRequest {
    #[serde(default)]
    mode: Option<String>,
}

/// Mode requested by a `generate-keypair` body
///
/// An empty body or an empty `mode` selects the default tier.
fn requested_mode(body: &[u8]) -> Result<Mode> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Mode::INTERACTIVE_DEFAULT);
    }

    let request: GenerateKeyPairRequest = serde_json::from_slice(body)
        .map_err(|e| ServiceError::InvalidRequest(format!("Malformed JSON body: {}", e)))?;

    match request.mode.as_deref() {
        None | Some("") => Ok(Mode::INTERACTIVE_DEFAULT),
        Some(name) => Ok(Mode::resolve(name)?),
    }
}

pub(super) async fn generate_keypair(
    Extension(context): Extension<Arc<AppContext>>,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<KeyArchive> {
    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServiceError::InputTruncated(rejection.body_text())
        } else {
            ServiceError::InvalidRequest(rejection.body_text())
        }
    })?;

    let mode = requested_mode(&body)?;
    context.workflow.generate_keypair(mode).await
}

async fn read_form(multipart: std::result::Result<Multipart, MultipartRejection>) -> Result<FormInput> {
    let multipart = multipart.map_err(|rejection| {
        ServiceError::InvalidRequest(format!("Expected multipart form data: {}", rejection.body_text()))
    })?;
    FormInput::from_multipart(multipart).await
}

async fn sign(
    context: &AppContext,
    multipart: std::result::Result<Multipart, MultipartRejection>,
    source: MessageSource,
) -> Result<Response> {
    let form = read_form(multipart).await?;
    let blob = context.workflow.sign_form(&form, source).await?;
    blob.into_attachment().await
}

pub(super) async fn sign_message(
    Extension(context): Extension<Arc<AppContext>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    sign(&context, multipart, MessageSource::Upload).await
}

pub(super) async fn sign_message_url(
    Extension(context): Extension<Arc<AppContext>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    sign(&context, multipart, MessageSource::Remote).await
}

pub(super) async fn verify_signature(
    Extension(context): Extension<Arc<AppContext>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<VerifyResponse>> {
    let form = read_form(multipart).await?;
    let result = context.workflow.verify_form(&form, MessageSource::Upload).await?;
    Ok(Json(result))
}

pub(super) async fn verify_signature_url(
    Extension(context): Extension<Arc<AppContext>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<VerifyResponse>> {
    let form = read_form(multipart).await?;
    let result = context.workflow.verify_form(&form, MessageSource::Remote).await?;
    Ok(Json(result))
}

pub(super) async fn analyze(
    Extension(context): Extension<Arc<AppContext>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisReport>> {
    let form = read_form(multipart).await?;
    let report = context.workflow.analyze_form(&form, MessageSource::Upload).await?;
    Ok(Json(report))
}

pub(super) async fn analyze_url(
    Extension(context): Extension<Arc<AppContext>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisReport>> {
    let form = read_form(multipart).await?;
    let report = context.workflow.analyze_form(&form, MessageSource::Remote).await?;
    Ok(Json(report))
}
