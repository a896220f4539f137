// ── Generic reactive entity collection ──
//
// Concurrent storage with O(1) lookups and push-based change notification
// via `watch` channels. Snapshots are ordered by key so tables render in a
// stable order between polls.

use std::collections::HashSet;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

/// A reactive collection for a single entity type, keyed by string.
///
/// Every mutation bumps a version counter and rebuilds the snapshot that
/// subscribers receive.
pub(crate) struct EntityCollection<T: Send + Sync + 'static> {
    by_key: DashMap<String, Arc<T>>,

    /// Version counter, bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation for efficient subscription.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_key: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Replace the whole collection with `items`.
    ///
    /// Upserts every incoming entity, then prunes keys that were not in the
    /// incoming set, so readers never see a transient empty collection.
    /// Subscribers are notified once.
    pub(crate) fn replace_all(&self, items: impl IntoIterator<Item = (String, T)>) {
        let mut incoming: HashSet<String> = HashSet::new();
        for (key, entity) in items {
            incoming.insert(key.clone());
            self.by_key.insert(key, Arc::new(entity));
        }
        self.by_key.retain(|key, _| incoming.contains(key));
        self.rebuild_snapshot();
        self.bump_version();
    }

    pub(crate) fn get(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn version(&self) -> u64 {
        *self.version.borrow()
    }

    pub(crate) fn clear(&self) {
        self.by_key.clear();
        self.rebuild_snapshot();
        self.bump_version();
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Collect all values, ordered by key, and broadcast to subscribers.
    fn rebuild_snapshot(&self) {
        let mut entries: Vec<(String, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let values: Vec<Arc<T>> = entries.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_latest_entity() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all([("key1".to_owned(), "hello".to_owned())]);
        col.replace_all([("key1".to_owned(), "world".to_owned())]);
        assert_eq!(*col.get("key1").unwrap(), "world");
        assert!(col.get("key2").is_none());
    }

    #[test]
    fn replace_all_prunes_missing_keys() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all([("a".to_owned(), "x".to_owned()), ("b".to_owned(), "y".to_owned())]);

        col.replace_all([("b".to_owned(), "y2".to_owned()), ("c".to_owned(), "z".to_owned())]);

        assert_eq!(col.len(), 2);
        assert!(col.get("a").is_none());
        assert_eq!(*col.get("b").unwrap(), "y2");
    }

    #[test]
    fn snapshot_is_ordered_by_key() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all([
            ("PK-003".to_owned(), "3".to_owned()),
            ("PK-001".to_owned(), "1".to_owned()),
            ("PK-002".to_owned(), "2".to_owned()),
        ]);

        let snap = col.snapshot();
        let values: Vec<&str> = snap.iter().map(|v| v.as_str()).collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn replace_all_notifies_once() {
        let col: EntityCollection<String> = EntityCollection::new();
        let before = col.version();
        col.replace_all([("a".to_owned(), "x".to_owned()), ("b".to_owned(), "y".to_owned())]);
        assert_eq!(col.version(), before + 1);
    }

    #[test]
    fn clear_empties_everything() {
        let col: EntityCollection<String> = EntityCollection::new();
        col.replace_all([("a".to_owned(), "x".to_owned())]);
        col.clear();
        assert!(col.is_empty());
        assert!(col.snapshot().is_empty());
    }
}
