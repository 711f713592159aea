use super::files::{atomic_write, key_file, read_file};
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON in {key}: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage quota exceeded writing {key} ({needed} of {limit} bytes)")]
    QuotaExceeded { key: String, needed: u64, limit: u64 },
}

/// Flat string key/value storage. Every write replaces the whole value.
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// Total storage allowed for all keys, matching a browser's local storage budget
pub const DEFAULT_QUOTA_BYTES: u64 = 5 * 1024 * 1024;

/// One `<key>.json` file per key inside a data directory
pub struct FileStore {
    dir: PathBuf,
    /// Optional cap on the total bytes held by all keys
    quota: Option<u64>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            quota: None,
        }
    }

    pub fn with_quota(mut self, bytes: u64) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Bytes used by every key except `skip`
    fn used_bytes(&self, skip: &str) -> Result<u64, StoreError> {
        let skip_path = key_file(&self.dir, skip);
        let mut total = 0;
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path == skip_path || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            total += fs::metadata(&path)?.len();
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(read_file(key_file(&self.dir, key))?)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if let Some(limit) = self.quota {
            let needed = self.used_bytes(key)? + value.len() as u64;
            if needed > limit {
                return Err(StoreError::QuotaExceeded {
                    key: key.to_string(),
                    needed,
                    limit,
                });
            }
        }
        atomic_write(key_file(&self.dir, key), value)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(key_file(&self.dir, key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
pub use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use super::*;
    use std::collections::HashMap;

    /// In-memory store with an optional quota, for tests
    #[derive(Default)]
    pub struct MemoryStore {
        pub values: HashMap<String, String>,
        pub quota: Option<u64>,
    }

    impl KeyValueStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.values.get(key).cloned())
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            if let Some(limit) = self.quota {
                let others: u64 = self
                    .values
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(_, v)| v.len() as u64)
                    .sum();
                let needed = others + value.len() as u64;
                if needed > limit {
                    return Err(StoreError::QuotaExceeded {
                        key: key.to_string(),
                        needed,
                        limit,
                    });
                }
            }
            self.values.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.values.remove(key);
            Ok(())
        }
    }
}
