//! JSON adapter over a [`KvBackend`]
//!
//! Reads never fail the caller: missing or malformed records come back as
//! `None`, with a warning for the malformed ones. Writes report success and
//! never clear the existing value on failure.

use crate::backend::KvBackend;
use crate::error::Result;
use crate::key::RecordKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Typed JSON access to a backend
#[derive(Debug, Default)]
pub struct JsonStore<B> {
    backend: B,
}

impl<B: KvBackend> JsonStore<B> {
    /// Wrap `backend`
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Underlying backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Parsed record under `key`
    pub fn get<T: DeserializeOwned>(&self, key: &RecordKey) -> Option<T> {
        self.get_raw_key(key.as_str())
    }

    /// Parsed record under a raw key string
    pub fn get_raw_key<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.backend.get_raw(key)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, %error, "unreadable record treated as absent");
                None
            }
        }
    }

    /// Untyped record under `key`
    pub fn get_value(&self, key: &RecordKey) -> Option<Value> {
        self.get(key)
    }

    /// Serialise and store `value`
    ///
    /// # Errors
    /// Serialisation or backend failure; the previous value is kept.
    pub fn try_set<T: Serialize + ?Sized>(&self, key: &RecordKey, value: &T) -> Result<()> {
        self.try_set_raw_key(key.as_str(), value)
    }

    /// Serialise and store `value` under a raw key string
    ///
    /// # Errors
    /// Serialisation or backend failure; the previous value is kept.
    pub fn try_set_raw_key<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.backend.set_raw(key, raw)
    }

    /// Store `value`; `false` when the write failed
    pub fn set<T: Serialize + ?Sized>(&self, key: &RecordKey, value: &T) -> bool {
        match self.try_set(key, value) {
            Ok(()) => true,
            Err(error) => {
                tracing::warn!(key = %key, %error, "write failed");
                false
            }
        }
    }

    /// Delete `key`
    ///
    /// # Errors
    /// Backend failure.
    pub fn remove(&self, key: &RecordKey) -> Result<()> {
        self.backend.remove(key.as_str())
    }

    /// Delete a raw key string
    ///
    /// # Errors
    /// Backend failure.
    pub fn remove_raw_key(&self, key: &str) -> Result<()> {
        self.backend.remove(key)
    }

    /// Keys starting with `prefix`, sorted
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .backend
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect();
        keys.sort();
        keys
    }
}
