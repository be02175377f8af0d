//! Unified error type for the signer node
//!
//! Every stage of a request reports its own kind; handlers surface the first
//! failure as-is. Each kind carries a fixed client/server classification and
//! renders as `{"error": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pqc_signer::PqcError;
use thiserror::Error;

/// Signer node error type
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Mode name is not a supported Dilithium tier
    #[error("Invalid Dilithium mode: {0}")]
    InvalidMode(String),

    /// Request body could not be parsed
    ///
    /// Returned for a malformed JSON body; an absent body is not an error
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Required upload part or form field is absent
    #[error("{0}")]
    InputMissing(String),

    /// Request body exceeded the transport limit
    #[error("Request body too large: {0}")]
    InputTruncated(String),

    /// Secret key does not decode for the selected mode
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// Public key, signature, URL or form data does not decode
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Remote message could not be fetched
    #[error("Failed to fetch message file: {0}")]
    FetchFailure(String),

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenFailure(String),

    /// Signing failed with well-formed input
    #[error("Signing failed: {0}")]
    SigningFailure(String),

    /// Blocking worker panicked or was cancelled
    #[error("Worker task aborted: {0}")]
    TaskAborted(String),

    /// Archive or signature blob could not be built
    #[error("Packaging failed: {0}")]
    PackagingFailure(String),

    /// No document record with this id
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Document index could not be read or written
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    ///
    /// Returned when the configuration file is malformed or a value is out
    /// of range
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ServiceError>;

impl ServiceError {
    /// HTTP status for this error kind
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidMode(_)
            | ServiceError::InvalidRequest(_)
            | ServiceError::InputMissing(_)
            | ServiceError::MalformedKey(_)
            | ServiceError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ServiceError::InputTruncated(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ServiceError::DocumentNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::FetchFailure(_) => StatusCode::BAD_GATEWAY,
            ServiceError::KeyGenFailure(_)
            | ServiceError::SigningFailure(_)
            | ServiceError::TaskAborted(_)
            | ServiceError::PackagingFailure(_)
            | ServiceError::Storage(_)
            | ServiceError::Config(_)
            | ServiceError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client
    ///
    /// Storage and I/O details stay in the log since they can carry local
    /// paths.
    pub fn public_message(&self) -> String {
        match self {
            ServiceError::Storage(_) => "Document storage failure".to_string(),
            ServiceError::Config(_) => "Service misconfigured".to_string(),
            ServiceError::Io(_) => "Internal I/O failure".to_string(),
            other => other.to_string(),
        }
    }
}

/// Error response body
#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorBody {
            error: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}

/// From PQC error
impl From<PqcError> for ServiceError {
    fn from(err: PqcError) -> Self {
        match err {
            PqcError::InvalidMode(name) => ServiceError::InvalidMode(name),
            PqcError::KeyGenerationError(msg) => ServiceError::KeyGenFailure(msg),
            PqcError::MalformedKey(msg) => ServiceError::MalformedKey(msg),
            PqcError::MalformedInput(msg) => ServiceError::MalformedInput(msg),
            PqcError::SigningError(msg) => ServiceError::SigningFailure(msg),
        }
    }
}

/// From zip error
impl From<zip::result::ZipError> for ServiceError {
    fn from(err: zip::result::ZipError) -> Self {
        ServiceError::PackagingFailure(err.to_string())
    }
}
