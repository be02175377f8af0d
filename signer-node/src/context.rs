//! Shared application state
//!
//! Built once at startup and handed to every handler through
//! `Extension<Arc<AppContext>>`.

use crate::config::validate_config;
use crate::document_store::{DocumentFiles, DocumentStore, JsonDocumentStore};
use crate::error::{Result, ServiceError};
use crate::input::RemoteFetcher;
use crate::types::ServiceConfig;
use crate::workflow::SignatureWorkflow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Everything a request handler needs
pub struct AppContext {
    pub config: ServiceConfig,
    pub workflow: SignatureWorkflow,
    pub documents: Arc<dyn DocumentStore>,
    pub files: DocumentFiles,
}

impl AppContext {
    /// Validate `config`, prepare directories and load the document index
    ///
    /// # Errors
    /// - `Config` if a value is out of range or the HTTP client cannot be built
    /// - `Storage` if a directory cannot be created or the index is corrupt
    pub async fn init(config: ServiceConfig) -> Result<Self> {
        validate_config(&config)?;

        let blob_dir = config
            .signature_tmp_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        for dir in [&blob_dir, &PathBuf::from(&config.storage_dir)] {
            tokio::fs::create_dir_all(dir).await.map_err(|e| {
                ServiceError::Storage(format!("Failed to create directory {:?}: {}", dir, e))
            })?;
        }

        let fetcher = RemoteFetcher::new(
            Duration::from_secs(config.fetch_timeout_secs),
            config.max_fetch_bytes,
        )?;
        let workflow = SignatureWorkflow::new(fetcher, blob_dir);

        let documents = JsonDocumentStore::open(&config.document_index_path).await?;
        let files = DocumentFiles::new(&config.storage_dir);

        info!("Signature files staged in {:?}", workflow.blob_dir());
        info!("Documents stored under {:?}", files.root());

        Ok(Self {
            config,
            workflow,
            documents: Arc::new(documents),
            files,
        })
    }

    /// Flush the document index
    pub async fn shutdown(&self) -> Result<()> {
        info!("Flushing document index");
        self.documents.flush().await
    }
}
