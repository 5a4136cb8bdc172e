//! Persisted emergency contact list
//!
//! Contacts are managed by the surrounding app's CRUD surface; the core only
//! reads the list at dispatch time. The file store still enforces the record
//! invariants on its save path so that tests and seeding tools cannot write
//! an unreachable contact or overflow the list.

use crate::domain::types::Contact;
use anyhow::{bail, Context};
use parking_lot::Mutex;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

/// Maximum number of emergency contacts
pub const MAX_CONTACTS: usize = 5;

/// Read interface handed to the core
pub trait ContactStore: Send + Sync {
    /// Return the current contact list; fresh on every call
    fn read(&self) -> Vec<Contact>;
}

/// JSON-file-backed contact store (a JSON array of contact records)
pub struct FileContactStore {
    path: PathBuf,
}

impl FileContactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Persist a contact list, enforcing the record invariants:
    /// every contact needs a phone or an email, and the list is capped.
    pub fn save(&self, contacts: &[Contact]) -> anyhow::Result<()> {
        if contacts.len() > MAX_CONTACTS {
            bail!("contact list exceeds the {} entry cap", MAX_CONTACTS);
        }
        if let Some(bad) = contacts.iter().find(|c| !c.is_reachable()) {
            bail!("contact '{}' has neither phone nor email", bad.name);
        }
        let text = serde_json::to_string_pretty(contacts)?;
        fs::write(&self.path, text)
            .with_context(|| format!("Failed to write contacts file {}", self.path.display()))
    }
}

impl ContactStore for FileContactStore {
    fn read(&self) -> Vec<Contact> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "contacts_read_failed");
                return Vec::new();
            }
        };
        match serde_json::from_str(&text) {
            Ok(contacts) => contacts,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "contacts_parse_failed");
                Vec::new()
            }
        }
    }
}

/// In-memory contact store for hosts that manage their own persistence
pub struct MemoryContactStore {
    inner: Mutex<Vec<Contact>>,
}

impl MemoryContactStore {
    pub fn new(contacts: Vec<Contact>) -> Self {
        Self { inner: Mutex::new(contacts) }
    }

    pub fn set(&self, contacts: Vec<Contact>) {
        *self.inner.lock() = contacts;
    }
}

impl ContactStore for MemoryContactStore {
    fn read(&self) -> Vec<Contact> {
        self.inner.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn contact(name: &str, phone: Option<&str>, email: Option<&str>) -> Contact {
        Contact {
            id: Uuid::now_v7(),
            name: name.to_string(),
            phone: phone.map(str::to_string),
            email: email.map(str::to_string),
            relationship: None,
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryContactStore::new(vec![contact("A", Some("+1"), None)]);
        assert_eq!(store.read().len(), 1);
        store.set(Vec::new());
        assert!(store.read().is_empty());
    }

    #[test]
    fn test_save_rejects_unreachable_contact() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileContactStore::new(dir.path().join("contacts.json"));
        let result = store.save(&[contact("ghost", None, None)]);
        assert!(result.is_err());
    }

    #[test]
    fn test_save_rejects_oversized_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileContactStore::new(dir.path().join("contacts.json"));
        let contacts: Vec<_> =
            (0..6).map(|i| contact(&format!("c{i}"), Some("+1"), None)).collect();
        assert!(store.save(&contacts).is_err());
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let store = FileContactStore::new("/nonexistent/contacts.json");
        assert!(store.read().is_empty());
    }
}
