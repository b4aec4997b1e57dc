use serde_json::Value;
use std::collections::HashMap;

/// Longest key the store accepts, in bytes.
pub const MAX_KEY_LEN: usize = 50;

/// Result of a put against the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The key was absent and is now bound.
    Created,
    /// The key existed and its value was replaced.
    Updated,
    /// The key exceeds [`MAX_KEY_LEN`]; nothing was stored.
    KeyTooLong,
    /// The request carried no value (JSON null); nothing was stored.
    NoValue,
}

impl PutOutcome {
    /// True iff the put changed the store.
    pub fn mutated(self) -> bool {
        matches!(self, PutOutcome::Created | PutOutcome::Updated)
    }
}

/// Result of a delete against the local store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
}

/// The replica-local mapping from keys to opaque JSON values.
///
/// A key is either absent or bound to a non-null value; the null-check in
/// [`KvStore::put`] maintains that invariant.
#[derive(Debug, Default)]
pub struct KvStore {
    entries: HashMap<String, Value>,
}

impl KvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &str, value: Value) -> PutOutcome {
        if key.len() > MAX_KEY_LEN {
            return PutOutcome::KeyTooLong;
        }
        if value.is_null() {
            return PutOutcome::NoValue;
        }
        match self.entries.insert(key.to_string(), value) {
            Some(_) => PutOutcome::Updated,
            None => PutOutcome::Created,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn delete(&mut self, key: &str) -> DeleteOutcome {
        match self.entries.remove(key) {
            Some(_) => DeleteOutcome::Deleted,
            None => DeleteOutcome::NotFound,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Full copy of the store, used by `/getKVS` and the recovery pull.
    pub fn dump(&self) -> HashMap<String, Value> {
        self.entries.clone()
    }

    /// Overwrites the local contents wholesale. Only crash recovery calls
    /// this, together with the matching clock overwrite.
    pub fn replace(&mut self, entries: HashMap<String, Value>) {
        self.entries = entries;
    }
}
