//! Registry of tool names observed completing successfully.
//!
//! The registry is the candidate pool for tool-name suggestions. It only
//! grows: names are appended as calls complete and are never evicted. It
//! lives as long as the validator that owns it.

use std::collections::BTreeSet;

use parking_lot::RwLock;

/// Append-only, concurrently readable set of known tool names.
///
/// Iteration order is sorted, which keeps fuzzy-match tie-breaking stable
/// across runs.
#[derive(Debug, Default)]
pub struct KnownToolRegistry {
    names: RwLock<BTreeSet<String>>,
}

impl KnownToolRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with `names`.
    pub fn with_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: RwLock::new(names.into_iter().map(Into::into).collect()),
        }
    }

    /// Record a tool name. Returns `true` if it was not known before.
    pub fn insert(&self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.names.write().insert(name.to_string())
    }

    /// Whether `name` has been recorded verbatim.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.read().contains(name)
    }

    /// Number of known names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.read().len()
    }

    /// Returns `true` if no names have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.read().is_empty()
    }

    /// Sorted copy of all known names.
    #[must_use]
    pub fn snapshot(&self) -> Vec<String> {
        self.names.read().iter().cloned().collect()
    }

    /// Run `f` over the names while holding the read lock.
    pub fn with_names_ref<R>(&self, f: impl FnOnce(&BTreeSet<String>) -> R) -> R {
        f(&self.names.read())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn starts_empty() {
        let registry = KnownToolRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn insert_reports_novelty() {
        let registry = KnownToolRegistry::new();
        assert!(registry.insert("chroma_search"));
        assert!(!registry.insert("chroma_search"));
        assert!(registry.contains("chroma_search"));
        assert!(!registry.contains("Chroma_Search"));
    }

    #[test]
    fn snapshot_is_sorted() {
        let registry = KnownToolRegistry::with_names(["zeta", "alpha", "mid"]);
        assert_eq!(registry.snapshot(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn concurrent_inserts_are_all_recorded() {
        let registry = Arc::new(KnownToolRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || {
                    for i in 0..50 {
                        registry.insert(&format!("tool_{t}_{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 400);
    }
}
