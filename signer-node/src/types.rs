//! Shared data types
//!
//! Data structures passed between the node's subsystems and rendered in
//! HTTP responses.

use serde::{Deserialize, Serialize};

/// Signature verification result
///
/// `valid: false` is a successful response, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
}

/// Benchmark of one generate → sign → verify lifecycle
///
/// Durations are in microseconds, measured with a monotonic clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Key pair generation time (µs)
    pub key_generation_time: u64,

    /// Signing time (µs)
    pub signing_time: u64,

    /// Verification time (µs)
    pub verification_time: u64,

    /// Secret key size
    pub private_key_size_bytes: usize,

    /// Public key size
    pub public_key_size_bytes: usize,

    /// Signature size
    pub signature_size_bytes: usize,

    /// Whether the freshly produced signature verified
    pub valid: bool,
}

/// Document record
///
/// Describes one file saved under public storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Record ID (24 hex characters)
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,

    /// Original file name
    pub filename: String,

    /// Storage path relative to the working directory
    pub path: String,
}

/// Document record with its public URL and current file size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentView {
    pub document: Document,
    pub url: String,
    pub size: u64,
}

/// Node runtime configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listen address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Remote message fetch timeout (seconds)
    pub fetch_timeout_secs: u64,

    /// Largest remote message accepted (bytes)
    pub max_fetch_bytes: usize,

    /// Largest request body accepted (bytes)
    pub max_upload_bytes: usize,

    /// Directory for temporary signature files (OS temp dir if unset)
    pub signature_tmp_dir: Option<String>,

    /// Directory uploaded documents are saved under and served from
    pub storage_dir: String,

    /// Prefix joined with a document path to form its public URL
    pub public_storage_url: String,

    /// JSON file holding the document records
    pub document_index_path: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8080),
            fetch_timeout_secs: std::env::var("FETCH_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
            max_fetch_bytes: std::env::var("MAX_FETCH_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16 * 1024 * 1024),
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(16 * 1024 * 1024),
            signature_tmp_dir: std::env::var("SIGNATURE_TMP_DIR").ok(),
            storage_dir: std::env::var("STORAGE_DIR")
                .unwrap_or_else(|_| "public/storage".to_string()),
            public_storage_url: std::env::var("PUBLIC_STORAGE").unwrap_or_default(),
            document_index_path: std::env::var("DOCUMENT_INDEX_PATH")
                .unwrap_or_else(|_| "public/documents.json".to_string()),
        }
    }
}
