//! Artifact packaging
//!
//! - **Key archive**: a zip holding `publicKey.key` and `privateKey.key`,
//!   raw bytes, no re-encoding. Built fully in memory; any entry or finalize
//!   failure discards the whole archive.
//! - **Signature blob**: the detached signature written to a uniquely named
//!   temporary file (`signature-XXXXXX.sig`). The file lives exactly as long
//!   as the [`SignatureBlob`] value, so it is removed on every exit path.

use crate::error::{Result, ServiceError};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use pqc_signer::KeyPair;
use std::io::{Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive entry holding the public key
pub const PUBLIC_KEY_ENTRY: &str = "publicKey.key";
/// Archive entry holding the secret key
pub const PRIVATE_KEY_ENTRY: &str = "privateKey.key";
/// Download name of the key archive
pub const KEY_ARCHIVE_NAME: &str = "keys.zip";

/// Zip archive with both halves of a key pair
#[derive(Debug, Clone)]
pub struct KeyArchive {
    bytes: Vec<u8>,
}

impl KeyArchive {
    /// Package a key pair
    ///
    /// # Errors
    /// - `PackagingFailure` if an entry cannot be written or the archive
    ///   cannot be finalized
    pub fn build(keypair: &KeyPair) -> Result<Self> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, data) in [
            (PUBLIC_KEY_ENTRY, &keypair.public_key),
            (PRIVATE_KEY_ENTRY, &keypair.secret_key),
        ] {
            writer.start_file(name, options)?;
            writer.write_all(data).map_err(|e| {
                ServiceError::PackagingFailure(format!("Failed to write {}: {}", name, e))
            })?;
        }

        let bytes = writer.finish()?.into_inner();
        debug!("Built key archive: {} bytes", bytes.len());

        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl IntoResponse for KeyArchive {
    fn into_response(self) -> Response {
        (
            [
                (header::CONTENT_TYPE, "application/zip".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", KEY_ARCHIVE_NAME),
                ),
            ],
            self.bytes,
        )
            .into_response()
    }
}

/// Detached signature staged in a temporary file
pub struct SignatureBlob {
    file: NamedTempFile,
    file_name: String,
}

impl SignatureBlob {
    /// Write `signature` to a fresh temporary file in `dir`
    ///
    /// The random file name makes concurrent requests collision free.
    ///
    /// # Errors
    /// - `PackagingFailure` if the file cannot be created or written
    pub fn write(dir: &Path, signature: &[u8]) -> Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("signature-")
            .suffix(".sig")
            .tempfile_in(dir)
            .map_err(|e| {
                ServiceError::PackagingFailure(format!("Failed to create signature file: {}", e))
            })?;

        file.write_all(signature)
            .and_then(|_| file.flush())
            .map_err(|e| {
                ServiceError::PackagingFailure(format!("Failed to write signature file: {}", e))
            })?;

        let file_name = file
            .path()
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                ServiceError::PackagingFailure("Signature file name is not UTF-8".to_string())
            })?;

        debug!("Staged signature in {} ({} bytes)", file_name, signature.len());

        Ok(Self { file, file_name })
    }

    /// Generated download name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the signature back and build the download response
    ///
    /// The backing file is removed when this returns, whether or not the
    /// read succeeded.
    pub async fn into_attachment(self) -> Result<Response> {
        let data = tokio::fs::read(self.file.path()).await.map_err(|e| {
            ServiceError::PackagingFailure(format!("Failed to read signature file: {}", e))
        })?;

        let response = (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename={}", self.file_name),
                ),
            ],
            data,
        )
            .into_response();

        Ok(response)
    }
}

impl std::fmt::Debug for SignatureBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureBlob")
            .field("file_name", &self.file_name)
            .finish()
    }
}
