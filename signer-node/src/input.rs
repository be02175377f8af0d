//! Input acquisition
//!
//! Turns a request into raw byte buffers. Two sources are supported:
//!
//! - **Upload**: a named part of a `multipart/form-data` body
//! - **Remote**: a URL fetched once with a plain `GET`
//!
//! Both yield the complete buffer in memory. Neither retries: the first
//! failure is reported to the caller.
//!
//! # Truncation
//!
//! Body size limits belong to the HTTP layer. When the limit cuts an upload
//! short the multipart reader fails with `413`, which is surfaced as
//! [`ServiceError::InputTruncated`] instead of a short buffer. Remote bodies
//! are capped at `max_fetch_bytes`; an oversized body is a fetch failure.

use crate::error::{Result, ServiceError};
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError};
use axum::http::StatusCode;
use pqc_signer::Mode;
use reqwest::{Client, Url};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Form field carrying the mode name
pub const MODE_FIELD: &str = "mode";
/// Upload part carrying the secret key
pub const PRIVATE_KEY_FIELD: &str = "privateKey";
/// Upload part carrying the public key
pub const PUBLIC_KEY_FIELD: &str = "publicKey";
/// Upload part carrying the message
pub const MESSAGE_FIELD: &str = "message";
/// Form field carrying the message URL
pub const MESSAGE_URL_FIELD: &str = "messageURL";
/// Upload part carrying the detached signature
pub const SIGNATURE_FIELD: &str = "signature";
/// Upload part carrying a document for storage
pub const DOCUMENT_FIELD: &str = "file";

/// One uploaded part
#[derive(Debug, Clone)]
pub struct FormPart {
    /// Client supplied file name, if the part was a file
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Fully drained multipart body
///
/// When a part name repeats, the first occurrence wins.
#[derive(Debug, Default)]
pub struct FormInput {
    parts: HashMap<String, FormPart>,
}

impl FormInput {
    /// Read every part of a multipart body into memory
    ///
    /// # Errors
    /// - `InputTruncated` if the body limit was hit while reading
    /// - `MalformedInput` if the multipart framing is broken
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut parts = HashMap::new();

        while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let file_name = field.file_name().map(str::to_owned);
            let data = field.bytes().await.map_err(map_multipart_error)?;

            debug!("Received form part {}: {} bytes", name, data.len());
            parts.entry(name).or_insert(FormPart { file_name, data });
        }

        Ok(Self { parts })
    }

    /// Build from already separated parts
    pub fn from_parts<I, K>(parts: I) -> Self
    where
        I: IntoIterator<Item = (K, FormPart)>,
        K: Into<String>,
    {
        let mut map = HashMap::new();
        for (name, part) in parts {
            map.entry(name.into()).or_insert(part);
        }
        Self { parts: map }
    }

    /// Raw part, if present
    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.get(name)
    }

    /// Bytes of a required upload
    ///
    /// # Errors
    /// - `InputMissing` naming `label` if the part is absent
    pub fn file(&self, name: &str, label: &str) -> Result<Bytes> {
        self.parts
            .get(name)
            .map(|part| part.data.clone())
            .ok_or_else(|| ServiceError::InputMissing(format!("{} file is required", label)))
    }

    /// Text of an optional field
    ///
    /// # Errors
    /// - `MalformedInput` if the field is not valid UTF-8
    pub fn text(&self, name: &str) -> Result<Option<&str>> {
        match self.parts.get(name) {
            None => Ok(None),
            Some(part) => std::str::from_utf8(&part.data)
                .map(Some)
                .map_err(|_| ServiceError::MalformedInput(format!("Field {} is not valid UTF-8", name))),
        }
    }

    /// Text of a required, non-empty field
    pub fn required_text(&self, name: &str, label: &str) -> Result<&str> {
        match self.text(name)?.map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(ServiceError::InputMissing(format!("{} is required", label))),
        }
    }

    /// Resolve the `mode` field, falling back to `default` when absent or empty
    ///
    /// # Errors
    /// - `InvalidMode` if a non-empty value is not a supported tier
    pub fn mode(&self, default: Mode) -> Result<Mode> {
        match self.text(MODE_FIELD)? {
            None | Some("") => Ok(default),
            Some(name) => Ok(Mode::resolve(name)?),
        }
    }
}

fn map_multipart_error(err: MultipartError) -> ServiceError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServiceError::InputTruncated(err.body_text())
    } else {
        ServiceError::MalformedInput(err.body_text())
    }
}

/// Remote message fetcher
///
/// Issues exactly one `GET` per call. Cloning shares the connection pool.
#[derive(Debug, Clone)]
pub struct RemoteFetcher {
    /// HTTP client
    http_client: Client,

    /// Largest body accepted
    max_bytes: usize,
}

impl RemoteFetcher {
    /// Create a fetcher
    ///
    /// # Parameters
    /// - `timeout`: whole-request timeout
    /// - `max_bytes`: largest body accepted
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            max_bytes,
        })
    }

    /// Fetch `url` into memory
    ///
    /// # Errors
    /// - `MalformedInput` if `url` is not an absolute http(s) URL
    /// - `FetchFailure` on transport errors, non-success status, or a body
    ///   larger than `max_bytes`
    pub async fn fetch(&self, url: &str) -> Result<Bytes> {
        let url = Url::parse(url)
            .map_err(|e| ServiceError::MalformedInput(format!("Invalid message URL: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ServiceError::MalformedInput(format!(
                "Unsupported message URL scheme: {}",
                url.scheme()
            )));
        }

        debug!("Fetching message from {}", url);

        let mut response = self
            .http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                warn!("Message fetch from {} failed: {}", url, e);
                if e.is_timeout() {
                    ServiceError::FetchFailure(format!("Timed out fetching {}", url))
                } else if e.is_connect() {
                    ServiceError::FetchFailure(format!("Cannot connect to {}", url))
                } else {
                    ServiceError::FetchFailure(format!("Network error: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!("Message fetch from {} returned HTTP {}", url, status);
            return Err(ServiceError::FetchFailure(format!(
                "upstream returned HTTP {}",
                status
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes as u64 {
                return Err(self.too_large());
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            warn!("Reading message body from {} failed: {}", url, e);
            ServiceError::FetchFailure(format!("Failed to read response body: {}", e))
        })? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(self.too_large());
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes from {}", body.len(), url);

        Ok(Bytes::from(body))
    }

    fn too_large(&self) -> ServiceError {
        ServiceError::FetchFailure(format!(
            "upstream body exceeds {} bytes",
            self.max_bytes
        ))
    }
}

/// Where the message of a sign/verify/analyze request comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
    /// `message` upload part
    Upload,
    /// `messageURL` form field, fetched remotely
    Remote,
}

impl MessageSource {
    /// Resolve the message bytes
    pub async fn acquire(&self, form: &FormInput, fetcher: &RemoteFetcher) -> Result<Bytes> {
        match self {
            MessageSource::Upload => form.file(MESSAGE_FIELD, "Message"),
            MessageSource::Remote => {
                let url = form.required_text(MESSAGE_URL_FIELD, "Message URL")?;
                fetcher.fetch(url).await
            }
        }
    }
}
