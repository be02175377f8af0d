//! Document records and their files in public storage
//!
//! # Layout
//!
//! ```text
//! {storage_dir}/
//!   └── {unix-nanos}/
//!         └── {filename}
//! {document_index_path}     JSON array of Document records
//! ```
//!
//! Records are kept in memory in insertion order and written back to the
//! index after every mutation. The index is replaced atomically (write to a
//! sibling file, then rename), so a crash never leaves it half written.

use crate::error::{Result, ServiceError};
use crate::types::Document;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Record store for uploaded documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a new record with a fresh id
    async fn create(&self, filename: String, path: String) -> Result<Document>;

    /// Look up one record
    ///
    /// # Errors
    /// - `DocumentNotFound` if no record has this id
    async fn get(&self, id: &str) -> Result<Document>;

    /// All records in insertion order
    async fn list(&self) -> Result<Vec<Document>>;

    /// Replace the record carrying `document.id`
    ///
    /// # Errors
    /// - `InvalidRequest` if the id is empty
    /// - `DocumentNotFound` if no record has this id
    async fn update(&self, document: Document) -> Result<Document>;

    /// Remove a record
    async fn delete(&self, id: &str) -> Result<bool>;

    /// Persist any buffered state
    async fn flush(&self) -> Result<()>;
}

/// [`DocumentStore`] backed by a JSON index file
pub struct JsonDocumentStore {
    index_path: PathBuf,
    documents: RwLock<Vec<Document>>,
}

impl JsonDocumentStore {
    /// Open the index at `index_path`, starting empty if it does not exist
    ///
    /// # Errors
    /// - `Storage` if the index exists but cannot be read or parsed
    pub async fn open(index_path: impl Into<PathBuf>) -> Result<Self> {
        let index_path = index_path.into();

        let documents = match fs::read(&index_path).await {
            Ok(data) => serde_json::from_slice::<Vec<Document>>(&data).map_err(|e| {
                ServiceError::Storage(format!(
                    "Failed to parse document index {:?}: {}",
                    index_path, e
                ))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No document index at {:?}, starting empty", index_path);
                Vec::new()
            }
            Err(e) => {
                return Err(ServiceError::Storage(format!(
                    "Failed to read document index {:?}: {}",
                    index_path, e
                )))
            }
        };

        info!("Loaded {} document records", documents.len());

        Ok(Self {
            index_path,
            documents: RwLock::new(documents),
        })
    }

    /// Write `documents` to the index
    ///
    /// Callers hold the write lock, which serializes index writes.
    async fn persist(&self, documents: &[Document]) -> Result<()> {
        let data = serde_json::to_vec_pretty(documents)
            .map_err(|e| ServiceError::Storage(format!("Failed to encode document index: {}", e)))?;

        if let Some(parent) = self.index_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                ServiceError::Storage(format!("Failed to create {:?}: {}", parent, e))
            })?;
        }

        let staging = self.index_path.with_extension("json.tmp");
        fs::write(&staging, &data).await.map_err(|e| {
            ServiceError::Storage(format!("Failed to write {:?}: {}", staging, e))
        })?;
        fs::rename(&staging, &self.index_path).await.map_err(|e| {
            ServiceError::Storage(format!("Failed to replace {:?}: {}", self.index_path, e))
        })?;

        debug!("Persisted {} document records", documents.len());
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn create(&self, filename: String, path: String) -> Result<Document> {
        let mut documents = self.documents.write().await;

        let mut id = new_document_id();
        while documents.iter().any(|d| d.id == id) {
            id = new_document_id();
        }

        let document = Document { id, filename, path };
        documents.push(document.clone());

        if let Err(e) = self.persist(&documents).await {
            documents.pop();
            return Err(e);
        }

        info!("Created document {} ({})", document.id, document.filename);
        Ok(document)
    }

    async fn get(&self, id: &str) -> Result<Document> {
        self.documents
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ServiceError::DocumentNotFound(id.to_string()))
    }

    async fn list(&self) -> Result<Vec<Document>> {
        Ok(self.documents.read().await.clone())
    }

    async fn update(&self, document: Document) -> Result<Document> {
        if document.id.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Document id is required".to_string(),
            ));
        }

        let mut documents = self.documents.write().await;
        let slot = documents
            .iter()
            .position(|d| d.id == document.id)
            .ok_or_else(|| ServiceError::DocumentNotFound(document.id.clone()))?;

        let previous = std::mem::replace(&mut documents[slot], document.clone());
        if let Err(e) = self.persist(&documents).await {
            documents[slot] = previous;
            return Err(e);
        }

        info!("Updated document {}", document.id);
        Ok(document)
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let mut documents = self.documents.write().await;
        let slot = documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| ServiceError::DocumentNotFound(id.to_string()))?;

        let removed = documents.remove(slot);
        if let Err(e) = self.persist(&documents).await {
            documents.insert(slot, removed);
            return Err(e);
        }

        info!("Deleted document {}", id);
        Ok(true)
    }

    async fn flush(&self) -> Result<()> {
        let documents = self.documents.read().await;
        self.persist(&documents).await
    }
}

/// 24 hex characters from 12 random bytes
fn new_document_id() -> String {
    hex::encode(rand::random::<[u8; 12]>())
}

/// Files of uploaded documents under the storage root
#[derive(Debug, Clone)]
pub struct DocumentFiles {
    root: PathBuf,
}

impl DocumentFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Save `data` as `<root>/<unix-nanos>/<name>`
    ///
    /// Only the final component of `file_name` is kept. Returns the stored
    /// path and the cleaned file name.
    ///
    /// # Errors
    /// - `InvalidRequest` if no usable file name remains
    /// - `Storage` if the folder or file cannot be written
    pub async fn save(&self, file_name: &str, data: &[u8]) -> Result<(String, String)> {
        let name = sanitize_file_name(file_name)?;

        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let mut attempt = 0i64;
        let (path, mut file) = loop {
            let folder = self.root.join((nanos + attempt).to_string());
            fs::create_dir_all(&folder).await.map_err(|e| {
                ServiceError::Storage(format!("Failed to create directory {:?}: {}", folder, e))
            })?;

            let path = folder.join(&name);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => break (path, file),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && attempt < 8 => attempt += 1,
                Err(e) => {
                    return Err(ServiceError::Storage(format!(
                        "Failed to create {:?}: {}",
                        path, e
                    )))
                }
            }
        };

        file.write_all(data)
            .await
            .and(file.flush().await)
            .map_err(|e| ServiceError::Storage(format!("Failed to write {:?}: {}", path, e)))?;

        let path = path.to_string_lossy().into_owned();
        debug!("Saved {} bytes to {}", data.len(), path);

        Ok((path, name))
    }

    /// Current size of a stored file
    pub async fn size(&self, path: &str) -> Result<u64> {
        fs::metadata(path)
            .await
            .map(|meta| meta.len())
            .map_err(|e| ServiceError::Storage(format!("Failed to get file info for {}: {}", path, e)))
    }

    /// Remove a stored file, then its folder if that is now empty
    ///
    /// Paths outside the storage root are never touched. A file that is
    /// already gone is not an error.
    pub async fn remove(&self, path: &str) -> Result<()> {
        if !self.owns(path) {
            return Err(ServiceError::Storage(format!(
                "Refusing to remove {:?} outside {:?}",
                path, self.root
            )));
        }
        let path = Path::new(path);

        match fs::remove_file(path).await {
            Ok(()) => debug!("Removed {:?}", path),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!("Document file {:?} was already gone", path)
            }
            Err(e) => {
                return Err(ServiceError::Storage(format!(
                    "Failed to delete {:?}: {}",
                    path, e
                )))
            }
        }

        let root = normalize(&self.root);
        let Some(folder) = path.parent().filter(|folder| normalize(folder) != root) else {
            return Ok(());
        };

        match fs::read_dir(folder).await {
            Ok(mut entries) => {
                let empty = entries.next_entry().await.ok().flatten().is_none();
                if empty {
                    fs::remove_dir(folder).await.map_err(|e| {
                        ServiceError::Storage(format!("Failed to delete folder {:?}: {}", folder, e))
                    })?;
                    debug!("Removed empty folder {:?}", folder);
                }
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ServiceError::Storage(format!(
                "Failed to inspect folder {:?}: {}",
                folder, e
            ))),
        }
    }

    /// Whether `path` names an entry strictly below the storage root
    ///
    /// Leading `./` on either side is ignored; any `..` component is refused.
    pub fn owns(&self, path: &str) -> bool {
        let path = Path::new(path);
        if path.components().any(|c| c == Component::ParentDir) {
            return false;
        }

        let (path, root) = (normalize(path), normalize(&self.root));
        path.starts_with(&root) && path != root
    }
}

/// Drop `.` components
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| *c != Component::CurDir)
        .collect()
}

fn sanitize_file_name(file_name: &str) -> Result<String> {
    // Both separators, so Windows style client paths are cut as well
    let name = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return Err(ServiceError::InvalidRequest(format!(
            "Invalid file name: {:?}",
            file_name
        )));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn open_store(dir: &Path) -> JsonDocumentStore {
        JsonDocumentStore::open(dir.join("documents.json")).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        let created = store
            .create("a.pdf".to_string(), "public/storage/1/a.pdf".to_string())
            .await
            .unwrap();
        assert_eq!(created.id.len(), 24);
        assert!(created.id.chars().all(|c| c.is_ascii_hexdigit()));

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_unknown() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        assert!(matches!(
            store.get("000000000000000000000000").await,
            Err(ServiceError::DocumentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;

        for name in ["one", "two", "three"] {
            store.create(name.to_string(), format!("p/{}", name)).await.unwrap();
        }

        let names: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.filename)
            .collect();
        assert_eq!(names, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;
        let mut document = store.create("a".into(), "p/a".into()).await.unwrap();

        document.filename = "renamed".to_string();
        store.update(document.clone()).await.unwrap();
        assert_eq!(store.get(&document.id).await.unwrap().filename, "renamed");

        let unknown = Document {
            id: "ffffffffffffffffffffffff".to_string(),
            filename: "x".to_string(),
            path: "y".to_string(),
        };
        assert!(matches!(
            store.update(unknown).await,
            Err(ServiceError::DocumentNotFound(_))
        ));

        let anonymous = Document {
            id: String::new(),
            filename: "x".to_string(),
            path: "y".to_string(),
        };
        assert!(matches!(
            store.update(anonymous).await,
            Err(ServiceError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = open_store(dir.path()).await;
        let document = store.create("a".into(), "p/a".into()).await.unwrap();

        assert!(store.delete(&document.id).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
        assert!(matches!(
            store.delete(&document.id).await,
            Err(ServiceError::DocumentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_index_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let store = open_store(dir.path()).await;
            store.create("kept.txt".into(), "p/kept.txt".into()).await.unwrap()
        };

        let reopened = open_store(dir.path()).await;
        assert_eq!(reopened.get(&created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_corrupt_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("documents.json"), b"{not json").unwrap();

        assert!(matches!(
            JsonDocumentStore::open(dir.path().join("documents.json")).await,
            Err(ServiceError::Storage(_))
        ));
    }

    #[tokio::test]
    async fn test_save_size_remove() {
        let dir = tempfile::tempdir().unwrap();
        let files = DocumentFiles::new(dir.path().join("storage"));

        let (path, name) = files.save("../../etc/report.pdf", b"contents").await.unwrap();
        assert_eq!(name, "report.pdf");
        assert!(Path::new(&path).starts_with(files.root()));
        assert_eq!(files.size(&path).await.unwrap(), 8);

        let folder = Path::new(&path).parent().unwrap().to_path_buf();
        files.remove(&path).await.unwrap();
        assert!(!Path::new(&path).exists());
        assert!(!folder.exists());
        assert!(files.root().exists());
    }

    #[tokio::test]
    async fn test_same_name_twice() {
        let dir = tempfile::tempdir().unwrap();
        let files = DocumentFiles::new(dir.path());

        let (first, _) = files.save("a.txt", b"1").await.unwrap();
        let (second, _) = files.save("a.txt", b"2").await.unwrap();
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_remove_outside_root() {
        let dir = tempfile::tempdir().unwrap();
        let files = DocumentFiles::new(dir.path().join("storage"));
        let outside = dir.path().join("outside.txt");
        std::fs::write(&outside, b"keep").unwrap();

        assert!(files.remove(&outside.to_string_lossy()).await.is_err());
        assert!(outside.exists());

        let sneaky = files.root().join("..").join("outside.txt");
        assert!(files.remove(&sneaky.to_string_lossy()).await.is_err());
        assert!(outside.exists());
    }

    #[tokio::test]
    async fn test_dot_prefixed_root() {
        // Root spelled "./.tmpXXXX/storage", relative to the working directory
        let dir = tempfile::tempdir_in(".").unwrap();
        let root = Path::new(".")
            .join(dir.path().file_name().unwrap())
            .join("storage");
        assert_eq!(root.components().next(), Some(Component::CurDir));
        let files = DocumentFiles::new(&root);

        let (path, _) = files.save("a.txt", b"payload").await.unwrap();
        assert!(path.starts_with("."));
        assert!(files.owns(&path));

        let folder = Path::new(&path).parent().unwrap().to_path_buf();
        files.remove(&path).await.unwrap();
        assert!(!Path::new(&path).exists());
        assert!(!folder.exists());
        assert!(root.exists());
    }

    #[test]
    fn test_owns() {
        let files = DocumentFiles::new("./public/storage");

        assert!(files.owns("./public/storage/1/a.txt"));
        assert!(files.owns("public/storage/1/a.txt"));
        assert!(!files.owns("./public/storage"));
        assert!(!files.owns("public/other/a.txt"));
        assert!(!files.owns("./public/storage/../../etc/passwd"));
        assert!(!files.owns("/etc/passwd"));

        let files = DocumentFiles::new("/srv/storage");
        assert!(files.owns("/srv/storage/1/a.txt"));
        assert!(!files.owns("/srv/storage2/a.txt"));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("a.pdf").unwrap(), "a.pdf");
        assert_eq!(sanitize_file_name("C:\\Users\\x\\b.pdf").unwrap(), "b.pdf");
        assert!(sanitize_file_name("").is_err());
        assert!(sanitize_file_name("dir/").is_err());
        assert!(sanitize_file_name("..").is_err());
    }
}
