//! Signature workflow orchestration
//!
//! Composes input acquisition, the Dilithium engine and artifact packaging
//! into the four user-facing operations:
//!
//! ```text
//! request ─► mode ─► inputs (upload / URL) ─► engine ─► archive / blob / JSON
//! ```
//!
//! | Operation | Default mode | Output |
//! |-----------|--------------|--------|
//! | generate  | Dilithium2   | [`KeyArchive`] |
//! | sign      | Dilithium2   | [`SignatureBlob`] |
//! | verify    | Dilithium2   | [`VerifyResponse`] |
//! | analyze   | Dilithium5   | [`AnalysisReport`] |
//!
//! Every step short-circuits on the first error, which is returned unchanged.
//! Engine calls are CPU bound and run on the blocking thread pool.

use crate::error::{Result, ServiceError};
use crate::input::{
    FormInput, MessageSource, RemoteFetcher, PRIVATE_KEY_FIELD, PUBLIC_KEY_FIELD, SIGNATURE_FIELD,
};
use crate::packaging::{KeyArchive, SignatureBlob};
use crate::types::{AnalysisReport, VerifyResponse};
use axum::body::Bytes;
use pqc_signer::{DilithiumEngine, Mode, SignatureScheme};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Request orchestrator
///
/// Holds no per-request state; one instance serves all requests.
#[derive(Debug, Clone)]
pub struct SignatureWorkflow {
    /// Remote message fetcher
    fetcher: RemoteFetcher,

    /// Directory for temporary signature files
    blob_dir: PathBuf,
}

impl SignatureWorkflow {
    pub fn new(fetcher: RemoteFetcher, blob_dir: PathBuf) -> Self {
        Self { fetcher, blob_dir }
    }

    pub fn blob_dir(&self) -> &Path {
        &self.blob_dir
    }

    /// Generate a key pair and package it as a zip archive
    ///
    /// # Errors
    /// - `KeyGenFailure` if generation fails
    /// - `PackagingFailure` if the archive cannot be built
    pub async fn generate_keypair(&self, mode: Mode) -> Result<KeyArchive> {
        let engine = DilithiumEngine::new(mode);
        let keypair = run_blocking(ServiceError::KeyGenFailure, move || {
            Ok(engine.generate_keypair()?)
        })
        .await?;

        let archive = KeyArchive::build(&keypair)?;
        info!(
            "Generated {} key pair: pk={} bytes, sk={} bytes",
            mode,
            keypair.public_key.len(),
            keypair.secret_key.len()
        );

        Ok(archive)
    }

    /// Sign `message` and stage the signature for download
    ///
    /// # Errors
    /// - `MalformedKey` if the secret key does not match `mode`
    /// - `PackagingFailure` if the signature file cannot be written
    pub async fn sign(
        &self,
        mode: Mode,
        secret_key: Bytes,
        message: Bytes,
    ) -> Result<SignatureBlob> {
        let engine = DilithiumEngine::new(mode);
        let blob_dir = self.blob_dir.clone();

        let blob = run_blocking(ServiceError::SigningFailure, move || {
            let signature = engine.sign(&secret_key, &message)?;
            SignatureBlob::write(&blob_dir, &signature)
        })
        .await?;

        info!("Signed message with {}: {}", mode, blob.file_name());
        Ok(blob)
    }

    /// Verify a detached signature
    ///
    /// A signature that does not verify is `Ok(VerifyResponse { valid: false })`.
    ///
    /// # Errors
    /// - `MalformedInput` if the public key or signature does not match `mode`
    pub async fn verify(
        &self,
        mode: Mode,
        public_key: Bytes,
        message: Bytes,
        signature: Bytes,
    ) -> Result<VerifyResponse> {
        let engine = DilithiumEngine::new(mode);

        let valid = run_blocking(ServiceError::TaskAborted, move || {
            Ok(engine.verify(&public_key, &message, &signature)?)
        })
        .await?;

        info!("Verified {} signature: valid={}", mode, valid);
        Ok(VerifyResponse { valid })
    }

    /// Run generate → sign → verify once on `message` and time each stage
    ///
    /// Uses a fresh key pair; no caller key material is involved.
    pub async fn analyze(&self, mode: Mode, message: Bytes) -> Result<AnalysisReport> {
        let engine = DilithiumEngine::new(mode);

        let report = run_blocking(ServiceError::TaskAborted, move || {
            analyze_lifecycle(&engine, &message)
        })
        .await?;

        info!(
            "Analyzed {}: keygen={}µs sign={}µs verify={}µs valid={}",
            mode,
            report.key_generation_time,
            report.signing_time,
            report.verification_time,
            report.valid
        );

        Ok(report)
    }

    /// `sign-message` / `sign-message-url`
    pub async fn sign_form(&self, form: &FormInput, source: MessageSource) -> Result<SignatureBlob> {
        let mode = form.mode(Mode::INTERACTIVE_DEFAULT)?;
        let secret_key = form.file(PRIVATE_KEY_FIELD, "Private key")?;
        let message = source.acquire(form, &self.fetcher).await?;

        self.sign(mode, secret_key, message).await
    }

    /// `verify-signature` / `verify-signature-url`
    ///
    /// Local uploads are checked before any remote fetch.
    pub async fn verify_form(
        &self,
        form: &FormInput,
        source: MessageSource,
    ) -> Result<VerifyResponse> {
        let mode = form.mode(Mode::INTERACTIVE_DEFAULT)?;
        let public_key = form.file(PUBLIC_KEY_FIELD, "Public key")?;
        let signature = form.file(SIGNATURE_FIELD, "Signature")?;
        let message = source.acquire(form, &self.fetcher).await?;

        self.verify(mode, public_key, message, signature).await
    }

    /// `analyze` / `analyze-url`
    pub async fn analyze_form(
        &self,
        form: &FormInput,
        source: MessageSource,
    ) -> Result<AnalysisReport> {
        let mode = form.mode(Mode::BENCHMARK_DEFAULT)?;
        let message = source.acquire(form, &self.fetcher).await?;

        self.analyze(mode, message).await
    }
}

/// Time one full lifecycle with a monotonic clock
fn analyze_lifecycle<S: SignatureScheme>(engine: &S, message: &[u8]) -> Result<AnalysisReport> {
    let started = Instant::now();
    let keypair = engine.generate_keypair()?;
    let key_generation_time = elapsed_micros(started);

    let started = Instant::now();
    let signature = engine.sign(&keypair.secret_key, message)?;
    let signing_time = elapsed_micros(started);

    let started = Instant::now();
    let valid = engine.verify(&keypair.public_key, message, &signature)?;
    let verification_time = elapsed_micros(started);

    Ok(AnalysisReport {
        key_generation_time,
        signing_time,
        verification_time,
        private_key_size_bytes: keypair.secret_key.len(),
        public_key_size_bytes: keypair.public_key.len(),
        signature_size_bytes: signature.len(),
        valid,
    })
}

fn elapsed_micros(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX)
}

/// Run `task` on the blocking pool
///
/// A task that panics or is cancelled is reported through `on_abort`.
async fn run_blocking<T, F>(on_abort: fn(String) -> ServiceError, task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| on_abort(format!("worker task aborted: {}", e)))?
}
