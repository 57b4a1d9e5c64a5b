//! Listener registry keyed by `(parent_name, remote_address)`.

use crate::control_plane::topology::ListenerKey;
use crate::data_plane::listener::Listener;
use crate::error::ListenerError;
use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

const LISTENER_REGISTRY_TAG: &str = "ListenerRegistry:";
const LISTENER_REGISTRY_FN_INSERT_TAG: &str = "insert_with:";
const LISTENER_REGISTRY_FN_REMOVE_TAG: &str = "remove:";

pub(crate) type ListenerMap = HashMap<ListenerKey, Arc<dyn Listener>>;

/// Copy-on-write listener map.
///
/// Readers (the poll thread) take lock-free snapshots. Writers must be
/// serialised by the caller: every mutation is a load, clone and store, so two
/// concurrent writers could lose an update.
pub(crate) struct ListenerRegistry {
    listeners: Arc<ArcSwap<ListenerMap>>,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Arc::new(ArcSwap::from_pointee(HashMap::new())),
        }
    }

    /// Handle the poll loop keeps to snapshot the map on every sweep.
    pub(crate) fn shared(&self) -> Arc<ArcSwap<ListenerMap>> {
        self.listeners.clone()
    }

    pub(crate) fn snapshot(&self) -> Arc<ListenerMap> {
        self.listeners.load_full()
    }

    pub(crate) fn contains(&self, key: &ListenerKey) -> bool {
        self.listeners.load().contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.load().len()
    }

    /// Inserts the listener built by `create` unless `key` is already present.
    ///
    /// Returns `Ok(false)` without calling `create` when the key exists. A
    /// failing `create` leaves the map untouched.
    pub(crate) fn insert_with<F>(&self, key: ListenerKey, create: F) -> Result<bool, ListenerError>
    where
        F: FnOnce() -> Result<Arc<dyn Listener>, ListenerError>,
    {
        let current = self.listeners.load_full();
        if current.contains_key(&key) {
            debug!("{LISTENER_REGISTRY_TAG}:{LISTENER_REGISTRY_FN_INSERT_TAG} {key} already registered");
            return Ok(false);
        }

        let listener = create()?;
        let mut next = ListenerMap::clone(&current);
        next.insert(key, listener);
        self.listeners.store(Arc::new(next));
        Ok(true)
    }

    pub(crate) fn remove(&self, key: &ListenerKey) -> Option<Arc<dyn Listener>> {
        let current = self.listeners.load_full();
        if !current.contains_key(key) {
            debug!("{LISTENER_REGISTRY_TAG}:{LISTENER_REGISTRY_FN_REMOVE_TAG} no listener for {key}");
            return None;
        }

        let mut next = ListenerMap::clone(&current);
        let removed = next.remove(key);
        self.listeners.store(Arc::new(next));
        removed
    }

    /// Empties the map and hands back what it held, ordered by key.
    pub(crate) fn drain_all(&self) -> Vec<(ListenerKey, Arc<dyn Listener>)> {
        let previous = self.listeners.swap(Arc::new(HashMap::new()));
        let mut drained: Vec<_> = previous
            .iter()
            .map(|(key, listener)| (key.clone(), listener.clone()))
            .collect();
        drained.sort_by(|(a, _), (b, _)| a.cmp(b));
        drained
    }
}

#[cfg(test)]
mod tests {
    use super::ListenerRegistry;
    use crate::api::message::RemoteAddress;
    use crate::control_plane::topology::ListenerKey;
    use crate::data_plane::dispatcher::Dispatcher;
    use crate::data_plane::listener::{Listener, ListenerState};
    use crate::error::ListenerError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct NoopListener;

    impl Listener for NoopListener {
        fn register_dispatcher(&self, _dispatcher: Dispatcher) {}

        fn fetch(&self) -> Result<usize, ListenerError> {
            Ok(0)
        }

        fn close(&self, _force: bool) {}

        fn state(&self) -> ListenerState {
            ListenerState::Active
        }
    }

    fn key(parent: &str, port: u16) -> ListenerKey {
        ListenerKey::new(parent, RemoteAddress::new("h", port))
    }

    fn noop() -> Result<Arc<dyn Listener>, ListenerError> {
        Ok(Arc::new(NoopListener))
    }

    #[test]
    fn duplicate_key_skips_construction() {
        let registry = ListenerRegistry::new();
        let constructed = AtomicUsize::new(0);
        let create = || {
            constructed.fetch_add(1, Ordering::SeqCst);
            noop()
        };

        assert!(registry.insert_with(key("p1", 1), create).unwrap());
        assert!(!registry
            .insert_with(key("p1", 1), || {
                constructed.fetch_add(1, Ordering::SeqCst);
                noop()
            })
            .unwrap());

        assert_eq!(constructed.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn same_parent_on_two_addresses_is_two_entries() {
        let registry = ListenerRegistry::new();
        registry.insert_with(key("p1", 1), noop).unwrap();
        registry.insert_with(key("p1", 2), noop).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(&key("p1", 2)));
    }

    #[test]
    fn failed_construction_leaves_map_untouched() {
        let registry = ListenerRegistry::new();
        let result = registry.insert_with(key("p1", 1), || {
            Err(ListenerError::Transport("refused".to_string()))
        });

        assert_eq!(result, Err(ListenerError::Transport("refused".to_string())));
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_removal() {
        let registry = ListenerRegistry::new();
        registry.insert_with(key("p1", 1), noop).unwrap();
        let snapshot = registry.snapshot();

        assert!(registry.remove(&key("p1", 1)).is_some());
        assert!(registry.remove(&key("p1", 1)).is_none());
        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn drain_all_empties_in_key_order() {
        let registry = ListenerRegistry::new();
        registry.insert_with(key("p2", 1), noop).unwrap();
        registry.insert_with(key("p1", 9), noop).unwrap();

        let drained: Vec<_> = registry.drain_all().into_iter().map(|(k, _)| k).collect();

        assert_eq!(drained, vec![key("p1", 9), key("p2", 1)]);
        assert_eq!(registry.len(), 0);
        assert_eq!(registry.shared().load().len(), 0);
    }
}
