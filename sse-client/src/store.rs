use dashmap::DashMap;
use std::sync::{Arc, OnceLock};

/// Key-value storage for client ids.
///
/// Plays the role of a browser's session storage: values live as long as the
/// session they were written in.
pub trait IdStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str);
}

/// In-memory store. One instance shared by the whole process is the session.
#[derive(Debug, Default)]
pub struct MemoryIdStore {
    entries: DashMap<String, String>,
}

impl MemoryIdStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdStore for MemoryIdStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|value| value.clone())
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }
}

/// The process-wide session store used when no other store is configured.
pub fn session_store() -> Arc<dyn IdStore> {
    static SESSION: OnceLock<Arc<MemoryIdStore>> = OnceLock::new();
    SESSION
        .get_or_init(|| Arc::new(MemoryIdStore::new()))
        .clone()
}

/// Returns the id stored under `key`, generating and saving a new one first
/// if there is none.
pub fn load_or_create(store: &dyn IdStore, key: &str) -> String {
    if let Some(id) = store.get(key) {
        return id;
    }

    let id = uuid::Uuid::new_v4().to_string();
    store.set(key, &id);
    id
}
