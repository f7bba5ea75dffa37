//! The host's update-transient store, as an injected collaborator.
//!
//! The host keeps an ambient, periodically refreshed record of which
//! installed plugins have updates pending. This crate never touches that
//! state directly; it goes through [`UpdateStore`], which a host adapter
//! implements over the real transient. The resolver only ever writes its
//! own plugin's entry under its own slug key and removes it when no longer
//! applicable - it never iterates or mutates other plugins' entries, so no
//! locking discipline is imposed on implementors beyond single-writer-per-
//! field.
//!
//! [`MemoryStore`] is the reference implementation used by tests and the
//! CLI.

use std::collections::HashMap;

use super::UpdateRecord;

/// Slug-keyed view of the host's update transient.
pub trait UpdateStore {
    /// Whether the host has populated its "plugins checked" set for the
    /// current cycle. While unprimed, check hooks skip all work - the host
    /// is not actually running an update cycle yet.
    fn is_primed(&self) -> bool;

    /// The pending update record for a slug, if any.
    fn get(&self, slug: &str) -> Option<UpdateRecord>;

    /// Stores (or replaces) the pending update record for a slug.
    fn set(&mut self, slug: &str, record: UpdateRecord);

    /// Removes any pending record for a slug. Called whenever a check
    /// concludes "no update", so a stale positive never outlives a remote
    /// rollback.
    fn remove(&mut self, slug: &str);

    /// Clears the checked state entirely, forcing the next host cycle to
    /// re-query. Backs the operator-facing "force check" trigger.
    fn invalidate(&mut self);
}

/// In-memory [`UpdateStore`] mirroring the host transient's shape.
#[derive(Debug, Default)]
pub struct MemoryStore {
    checked: HashMap<String, String>,
    response: HashMap<String, UpdateRecord>,
}

impl MemoryStore {
    /// Creates an empty, unprimed store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a plugin as checked this cycle at the given installed version,
    /// priming the store.
    pub fn prime(&mut self, slug: &str, installed_version: &str) {
        self.checked
            .insert(slug.to_string(), installed_version.to_string());
    }
}

impl UpdateStore for MemoryStore {
    fn is_primed(&self) -> bool {
        !self.checked.is_empty()
    }

    fn get(&self, slug: &str) -> Option<UpdateRecord> {
        self.response.get(slug).cloned()
    }

    fn set(&mut self, slug: &str, record: UpdateRecord) {
        self.response.insert(slug.to_string(), record);
    }

    fn remove(&mut self, slug: &str) {
        self.response.remove(slug);
    }

    fn invalidate(&mut self) {
        self.checked.clear();
        self.response.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slug: &str) -> UpdateRecord {
        UpdateRecord {
            slug: slug.to_string(),
            new_version: "2.0.0".to_string(),
            url: "https://forge.invalid/o/r".to_string(),
            package: "https://forge.invalid/o/r/zip".to_string(),
            tested: None,
            requires: None,
        }
    }

    #[test]
    fn test_unprimed_until_checked() {
        let mut store = MemoryStore::new();
        assert!(!store.is_primed());
        store.prime("a", "1.0.0");
        assert!(store.is_primed());
    }

    #[test]
    fn test_set_get_remove() {
        let mut store = MemoryStore::new();
        store.set("a", record("a"));
        assert_eq!(store.get("a").unwrap().new_version, "2.0.0");
        store.remove("a");
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_invalidate_clears_checked_state() {
        let mut store = MemoryStore::new();
        store.prime("a", "1.0.0");
        store.set("a", record("a"));
        store.invalidate();
        assert!(!store.is_primed());
        assert!(store.get("a").is_none());
    }
}
