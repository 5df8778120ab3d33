use std::collections::HashMap;
use std::sync::RwLock;

use super::{Role, SessionStore};

/// Tab-local key/value store backing the mount model
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(token: &str, role: Option<Role>) -> Self {
        let store = Self::new();
        store.set(super::JWT_KEY, token);
        store.set(super::ROLE_KEY, role.map(|r| r.as_str()).unwrap_or(""));
        store
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Option<String> {
        let values = self.values.read().unwrap_or_else(|e| e.into_inner());
        values.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut values = self.values.write().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
    }
}
