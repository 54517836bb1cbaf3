//! Client to pipeline mapping

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::pipeline::Pipeline;
use crate::world::ClientId;

/// Live connections keyed by client
///
/// Each operation takes the lock once; callers never hold it across a write.
#[derive(Default)]
pub struct ConnectionMap {
    connections: RwLock<HashMap<ClientId, Arc<dyn Pipeline>>>,
}

impl ConnectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a client's pipeline, replacing any previous one
    pub fn insert(&self, client: ClientId, pipeline: Arc<dyn Pipeline>) -> Option<Arc<dyn Pipeline>> {
        self.connections
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(client, pipeline)
    }

    pub fn remove(&self, client: &ClientId) -> Option<Arc<dyn Pipeline>> {
        self.connections
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(client)
    }

    pub fn get(&self, client: &ClientId) -> Option<Arc<dyn Pipeline>> {
        self.connections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(client)
            .cloned()
    }

    pub fn contains(&self, client: &ClientId) -> bool {
        self.connections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(client)
    }

    /// Connected clients, in no particular order
    pub fn clients(&self) -> Vec<ClientId> {
        self.connections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.connections
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl std::fmt::Debug for ConnectionMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionMap")
            .field("clients", &self.clients())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::recording::RecordingPipeline;

    #[test]
    fn test_insert_get_remove() {
        let map = ConnectionMap::new();
        let alice = ClientId::from("alice");
        assert!(map.is_empty());

        map.insert(alice.clone(), Arc::new(RecordingPipeline::with_marker()));
        assert!(map.contains(&alice));
        assert!(map.get(&alice).is_some());
        assert_eq!(map.len(), 1);

        assert!(map.remove(&alice).is_some());
        assert!(map.get(&alice).is_none());
        assert!(map.remove(&alice).is_none());
    }

    #[test]
    fn test_insert_replaces() {
        let map = ConnectionMap::new();
        let bob = ClientId::from("bob");

        assert!(map
            .insert(bob.clone(), Arc::new(RecordingPipeline::with_marker()))
            .is_none());
        assert!(map
            .insert(bob.clone(), Arc::new(RecordingPipeline::with_marker()))
            .is_some());
        assert_eq!(map.clients(), vec![bob]);
    }
}
