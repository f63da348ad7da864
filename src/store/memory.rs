use std::collections::HashMap;
use std::path::Path;

use bytes::Bytes;

use super::ObjectStore;
use crate::error::{EtlError, Result};

/// An [`ObjectStore`] backed by a map of key → bytes.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    bucket: String,
    objects: HashMap<String, Bytes>,
}

impl MemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: HashMap::new(),
        }
    }

    /// Loads every regular file in `dir` as an object keyed by its file name.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut store = Self::new(&dir.display().to_string());

        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                let contents = std::fs::read(entry.path())?;
                store.objects.insert(name.to_string(), Bytes::from(contents));
            }
        }

        Ok(store)
    }

    pub fn with_object(mut self, key: &str, body: impl Into<Bytes>) -> Self {
        self.insert(key, body);
        self
    }

    pub fn insert(&mut self, key: &str, body: impl Into<Bytes>) {
        self.objects.insert(key.to_string(), body.into());
    }
}

#[async_trait::async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, key: &str) -> Result<Bytes> {
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| EtlError::NotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            })
    }
}
