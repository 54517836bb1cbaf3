//! Display registry implementation
//!
//! Live displays indexed by world, plus the store that persists them. Both
//! sit behind one lock: a [`RegistryTxn`] is the only way to change the
//! index, and it can persist the result before the lock is released.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::persist::DisplayStore;
use crate::display::{DisplayRecord, FrameDisplay};
use crate::error::{RegistryError, StoreError};

type WorldIndex = BTreeMap<String, Vec<Arc<FrameDisplay>>>;

/// World-indexed collection of live displays
pub struct DisplayRegistry<S: DisplayStore> {
    displays: Mutex<WorldIndex>,
    store: S,
}

impl<S: DisplayStore> DisplayRegistry<S> {
    pub fn new(store: S) -> Self {
        Self {
            displays: Mutex::new(BTreeMap::new()),
            store,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Take the registry lock
    ///
    /// Everything done through the returned transaction, including the
    /// persist, is atomic with respect to other transactions.
    pub async fn lock(&self) -> RegistryTxn<'_, S> {
        RegistryTxn {
            displays: self.displays.lock().await,
            store: &self.store,
        }
    }

    /// Displays in one world, in insertion order
    pub async fn displays_in(&self, world: &str) -> Vec<Arc<FrameDisplay>> {
        self.displays
            .lock()
            .await
            .get(world)
            .cloned()
            .unwrap_or_default()
    }

    /// Every live display
    pub async fn all(&self) -> Vec<Arc<FrameDisplay>> {
        self.displays.lock().await.values().flatten().cloned().collect()
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<FrameDisplay>> {
        self.lock().await.get(id)
    }

    pub async fn len(&self) -> usize {
        self.displays.lock().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl<S: DisplayStore> std::fmt::Debug for DisplayRegistry<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayRegistry").finish_non_exhaustive()
    }
}

/// Exclusive access to the registry and its store
pub struct RegistryTxn<'a, S: DisplayStore> {
    displays: MutexGuard<'a, WorldIndex>,
    store: &'a S,
}

impl<'a, S: DisplayStore> RegistryTxn<'a, S> {
    /// Index a display under its world
    pub fn insert(&mut self, display: Arc<FrameDisplay>) -> Result<(), RegistryError> {
        let id = display.id();
        if self.get(id).is_some() {
            return Err(RegistryError::DuplicateDisplay(id));
        }

        self.displays
            .entry(display.world().to_string())
            .or_default()
            .push(display);
        Ok(())
    }

    /// Drop a display from the index
    pub fn remove(&mut self, id: Uuid) -> Option<Arc<FrameDisplay>> {
        let mut removed = None;
        let mut emptied = None;

        for (world, list) in self.displays.iter_mut() {
            if let Some(position) = list.iter().position(|d| d.id() == id) {
                removed = Some(list.remove(position));
                if list.is_empty() {
                    emptied = Some(world.clone());
                }
                break;
            }
        }

        if let Some(world) = emptied {
            self.displays.remove(&world);
        }
        removed
    }

    pub fn get(&self, id: Uuid) -> Option<Arc<FrameDisplay>> {
        self.displays
            .values()
            .flatten()
            .find(|d| d.id() == id)
            .cloned()
    }

    /// Empty the index, returning what it held
    pub fn drain(&mut self) -> Vec<Arc<FrameDisplay>> {
        std::mem::take(&mut *self.displays)
            .into_values()
            .flatten()
            .collect()
    }

    /// Every live display
    pub fn all(&self) -> Vec<Arc<FrameDisplay>> {
        self.displays.values().flatten().cloned().collect()
    }

    /// Records for every indexed display, ordered by world
    pub fn records(&self) -> Vec<DisplayRecord> {
        self.displays
            .values()
            .flatten()
            .map(|d| d.record())
            .collect()
    }

    /// Write the current index to the store
    pub async fn persist(&self) -> Result<(), StoreError> {
        let records = self.records();
        self.store.save(&records).await
    }

    /// Persist the index plus records that are not live right now
    pub async fn persist_with(&self, retained: &[DisplayRecord]) -> Result<(), StoreError> {
        let mut records = self.records();
        records.extend(
            retained
                .iter()
                .filter(|r| self.get(r.id).is_none())
                .cloned(),
        );
        self.store.save(&records).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::frame::tests::solid_display;
    use crate::registry::persist::MemoryStore;

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let registry = DisplayRegistry::new(MemoryStore::new());
        let display = Arc::new(solid_display(1, 1, 1));
        let id = display.id();

        registry.lock().await.insert(Arc::clone(&display)).unwrap();

        assert_eq!(registry.len().await, 1);
        assert!(registry.get(id).await.is_some());
        assert_eq!(registry.displays_in("world").await.len(), 1);
        assert!(registry.displays_in("nether").await.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_insert() {
        let registry = DisplayRegistry::new(MemoryStore::new());
        let display = Arc::new(solid_display(1, 1, 1));

        let mut txn = registry.lock().await;
        txn.insert(Arc::clone(&display)).unwrap();
        let result = txn.insert(Arc::clone(&display));
        assert_eq!(result, Err(RegistryError::DuplicateDisplay(display.id())));
    }

    #[tokio::test]
    async fn test_remove_prunes_world() {
        let registry = DisplayRegistry::new(MemoryStore::new());
        let display = Arc::new(solid_display(1, 1, 1));
        let id = display.id();

        let mut txn = registry.lock().await;
        txn.insert(display).unwrap();
        assert!(txn.remove(id).is_some());
        assert!(txn.remove(id).is_none());
        assert!(txn.all().is_empty());
        drop(txn);

        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn test_persist_snapshot() {
        let registry = DisplayRegistry::new(MemoryStore::new());
        let a = Arc::new(solid_display(1, 1, 1));
        let b = Arc::new(solid_display(2, 1, 1));

        let mut txn = registry.lock().await;
        txn.insert(Arc::clone(&a)).unwrap();
        txn.insert(Arc::clone(&b)).unwrap();
        txn.persist().await.unwrap();

        let stored = registry.store().records();
        let ids: Vec<Uuid> = stored.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a.id(), b.id()]);

        let drained = txn.drain();
        assert_eq!(drained.len(), 2);
        txn.persist().await.unwrap();
        assert!(registry.store().records().is_empty());
    }
}
