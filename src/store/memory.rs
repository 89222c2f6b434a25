use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::store::{ContentStore, Result, StoreError, StoredFile};

/// In-memory store that records every write and can be told to fail on given paths
#[derive(Default)]
pub struct MemoryStore {
    files: Mutex<HashMap<String, StoredFile>>,
    writes: Mutex<Vec<String>>,
    next_sha: Mutex<u64>,
    failing_fetches: Mutex<HashSet<String>>,
    conflicting_puts: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.insert(path, content);
        self
    }

    pub fn insert(&self, path: &str, content: &str) -> String {
        let sha = self.new_sha();
        self.files.lock().unwrap().insert(path.to_string(), StoredFile {
            path: path.to_string(),
            content: content.to_string(),
            sha: sha.clone(),
        });
        sha
    }

    pub fn content(&self, path: &str) -> Option<String> {
        self.files.lock().unwrap().get(path).map(|f| f.content.clone())
    }

    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Paths passed to successful `put` calls, in order
    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    pub fn fail_fetch(&self, path: &str) {
        self.failing_fetches.lock().unwrap().insert(path.to_string());
    }

    pub fn conflict_on_put(&self, path: &str) {
        self.conflicting_puts.lock().unwrap().insert(path.to_string());
    }

    fn new_sha(&self) -> String {
        let mut next = self.next_sha.lock().unwrap();
        *next += 1;
        format!("sha-{}", *next)
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn fetch(&self, path: &str) -> Result<StoredFile> {
        if self.failing_fetches.lock().unwrap().contains(path) {
            return Err(StoreError::Server { status: 502, message: "Bad gateway".to_string() });
        }
        self.files.lock().unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn put(&self, path: &str, content: &str, _message: &str, sha: Option<&str>) -> Result<()> {
        let conflict = |message: &str| StoreError::Conflict { path: path.to_string(), message: message.to_string() };

        if self.conflicting_puts.lock().unwrap().contains(path) {
            return Err(conflict("simulated version conflict"));
        }

        let current = self.files.lock().unwrap().get(path).map(|f| f.sha.clone());
        match (current, sha) {
            (None, None) => {}
            (Some(current), Some(sha)) if current == sha => {}
            (Some(_), None) => return Err(conflict("file exists and no sha was supplied")),
            (None, Some(_)) => return Err(conflict("sha supplied for a missing file")),
            (Some(_), Some(_)) => return Err(conflict("sha does not match")),
        }

        self.insert(path, content);
        self.writes.lock().unwrap().push(path.to_string());
        Ok(())
    }
}
