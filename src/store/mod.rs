use async_trait::async_trait;

pub use crate::store::error::{Result, StoreError};

pub mod error;
pub mod github;
#[cfg(test)]
pub(crate) mod memory;

/// A file as currently held by the store. `sha` is the version token that has
/// to be handed back when overwriting it.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub path: String,
    pub content: String,
    pub sha: String,
}

/// Path-addressed file storage with optimistic versioning.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fails with [`StoreError::NotFound`] when nothing lives at `path`.
    async fn fetch(&self, path: &str) -> Result<StoredFile>;

    /// Whether anything lives at `path`, without needing its content
    async fn exists(&self, path: &str) -> Result<bool> {
        match self.fetch(path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Creates `path` when `sha` is `None`, otherwise replaces the version identified by `sha`.
    async fn put(&self, path: &str, content: &str, message: &str, sha: Option<&str>) -> Result<()>;
}
