use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::KvsEngine;
use crate::Result;

/// An in-memory store.
///
/// Cloning is cheap and every clone shares the same map, so a test can keep
/// one handle while the server owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Creates an empty `MemoryStore`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.map.lock().unwrap().is_empty()
    }
}

impl KvsEngine for MemoryStore {
    fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_owned(), value.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
}
