//! Document record handlers

use crate::context::AppContext;
use crate::error::{Result, ServiceError};
use crate::input::{FormInput, DOCUMENT_FIELD};
use crate::types::{Document, DocumentView};
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(super) struct CreateDocumentResponse {
    message: &'static str,
    document: Document,
}

async fn view(context: &AppContext, document: Document) -> Result<DocumentView> {
    let size = context.files.size(&document.path).await?;
    let url = format!("{}{}", context.config.public_storage_url, document.path);
    Ok(DocumentView {
        document,
        url,
        size,
    })
}

pub(super) async fn create_document(
    Extension(context): Extension<Arc<AppContext>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<CreateDocumentResponse>)> {
    let multipart = multipart.map_err(|rejection| {
        ServiceError::InvalidRequest(format!("Expected multipart form data: {}", rejection.body_text()))
    })?;
    let form = FormInput::from_multipart(multipart).await?;

    let data = form.file(DOCUMENT_FIELD, "Document")?;
    let file_name = form
        .part(DOCUMENT_FIELD)
        .and_then(|part| part.file_name.as_deref())
        .ok_or_else(|| ServiceError::InvalidRequest("Document upload has no file name".to_string()))?;

    let (path, filename) = context.files.save(file_name, &data).await?;
    let document = match context.documents.create(filename, path.clone()).await {
        Ok(document) => document,
        Err(e) => {
            // No record points at the file, so it must not stay behind
            if let Err(cleanup) = context.files.remove(&path).await {
                tracing::warn!("Failed to remove orphaned upload {}: {}", path, cleanup);
            }
            return Err(e);
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(CreateDocumentResponse {
            message: "Document uploaded successfully",
            document,
        }),
    ))
}

pub(super) async fn get_document(
    Extension(context): Extension<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<DocumentView>> {
    let document = context.documents.get(&id).await?;
    Ok(Json(view(&context, document).await?))
}

pub(super) async fn list_documents(
    Extension(context): Extension<Arc<AppContext>>,
) -> Result<Json<Vec<DocumentView>>> {
    let mut views = Vec::new();
    for document in context.documents.list().await? {
        views.push(view(&context, document).await?);
    }
    Ok(Json(views))
}

pub(super) async fn update_document(
    Extension(context): Extension<Arc<AppContext>>,
    document: std::result::Result<Json<Document>, JsonRejection>,
) -> Result<Json<Document>> {
    let Json(document) = document.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServiceError::InputTruncated(rejection.body_text())
        } else {
            ServiceError::InvalidRequest(format!("Invalid document data: {}", rejection.body_text()))
        }
    })?;

    if !context.files.owns(&document.path) {
        return Err(ServiceError::InvalidRequest(format!(
            "Document path must be inside {}",
            context.config.storage_dir
        )));
    }

    Ok(Json(context.documents.update(document).await?))
}

pub(super) async fn delete_document(
    Extension(context): Extension<Arc<AppContext>>,
    Path(id): Path<String>,
) -> Result<Json<bool>> {
    let document = context.documents.get(&id).await?;

    // Records pointing outside storage lose only the record, never the file
    if context.files.owns(&document.path) {
        context.files.remove(&document.path).await?;
    } else {
        tracing::warn!(
            "Document {} points outside storage ({}), dropping the record only",
            id,
            document.path
        );
    }

    Ok(Json(context.documents.delete(&id).await?))
}
