//! File-store abstraction consumed by the persistence pipeline.

use async_trait::async_trait;

use crate::error::StoreResult;

/// Reference to a file inside the vault.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileHandle {
    /// Normalised, `/`-separated vault-relative path.
    pub path: String,
}

impl FileHandle {
    /// Construct a handle from an already-normalised vault path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Final path segment.
    #[must_use]
    pub fn name(&self) -> &str {
        crate::path::file_name(&self.path)
    }
}

/// Operations the persistence pipeline needs from a vault.
///
/// `create_text` and `create_binary` never overwrite: when the path is taken
/// they fail with [`crate::StoreError::AlreadyExists`] and with some other
/// variant for every other failure.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Look up a vault setting by key.
    async fn config_value(&self, key: &str) -> StoreResult<Option<String>>;

    /// Create a text file at `path`.
    async fn create_text(&self, path: &str, content: &str) -> StoreResult<FileHandle>;

    /// Create a binary file at `path`.
    async fn create_binary(&self, path: &str, bytes: &[u8]) -> StoreResult<FileHandle>;

    /// Enumerate every file in the vault.
    async fn list_files(&self) -> StoreResult<Vec<FileHandle>>;

    /// Dispose of a file so its path becomes free.
    async fn trash(&self, handle: &FileHandle) -> StoreResult<()>;
}
