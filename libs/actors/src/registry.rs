//! Actor Registry
//!
//! Identity and discovery for live actors within one process.

use crate::cell::ActorRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// Unique actor identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId {
    id: Uuid,
}

impl ActorId {
    /// Create new actor ID
    pub fn new() -> Self {
        Self { id: Uuid::new_v4() }
    }

    /// Create from UUID
    pub fn from_uuid(id: Uuid) -> Self {
        Self { id }
    }

    /// Get UUID
    pub fn uuid(&self) -> Uuid {
        self.id
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "actor-{}", self.id.simple())
    }
}

impl Default for ActorId {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of live actors for id-based lookup
///
/// Actors register at spawn and are unregistered by their run loop once the
/// exit state is terminal. Holding an `ActorRef` obtained here keeps the
/// cell alive but says nothing about whether the actor has exited since.
#[derive(Debug, Default)]
pub struct ActorRegistry {
    actors: Arc<RwLock<HashMap<ActorId, ActorRef>>>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live actor
    pub async fn register_actor(&self, actor: ActorRef) {
        debug!(actor_id = %actor.id(), "registering actor");
        self.actors.write().await.insert(actor.id().clone(), actor);
    }

    /// Unregister an actor; true if it was present
    pub async fn unregister_actor(&self, id: &ActorId) -> bool {
        debug!(actor_id = %id, "unregistering actor");
        let removed = self.actors.write().await.remove(id).is_some();
        if !removed {
            warn!(actor_id = %id, "attempted to unregister unknown actor");
        }
        removed
    }

    /// Find a live actor by id
    pub async fn find_actor(&self, id: &ActorId) -> Option<ActorRef> {
        self.actors.read().await.get(id).cloned()
    }

    /// List all registered actors
    pub async fn list_actors(&self) -> Vec<ActorId> {
        self.actors.read().await.keys().cloned().collect()
    }

    /// Check if an actor is registered
    pub async fn contains_actor(&self, id: &ActorId) -> bool {
        self.actors.read().await.contains_key(id)
    }

    /// Number of registered actors
    pub async fn total_actors(&self) -> usize {
        self.actors.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::ActorCell;

    #[tokio::test]
    async fn test_actor_id_creation() {
        let id1 = ActorId::new();
        let id2 = ActorId::new();

        assert_ne!(id1, id2);
        assert_ne!(id1.uuid(), id2.uuid());
    }

    #[tokio::test]
    async fn test_actor_id_display() {
        let id = ActorId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("actor-"));
    }

    #[tokio::test]
    async fn test_register_find_unregister() {
        let registry = ActorRegistry::new();
        let (actor, _receiver) = ActorCell::new(ActorId::new());
        let id = actor.id().clone();

        registry.register_actor(actor.clone()).await;
        assert!(registry.contains_actor(&id).await);
        assert_eq!(registry.total_actors().await, 1);

        let found = registry.find_actor(&id).await.unwrap();
        assert_eq!(found, actor);

        assert!(registry.unregister_actor(&id).await);
        assert!(!registry.contains_actor(&id).await);
        assert_eq!(registry.total_actors().await, 0);

        assert!(!registry.unregister_actor(&id).await);
    }

    #[tokio::test]
    async fn test_registry_lists_all_registered() {
        let registry = ActorRegistry::new();
        let (a, _a_rx) = ActorCell::new(ActorId::new());
        let (b, _b_rx) = ActorCell::new(ActorId::new());

        registry.register_actor(a.clone()).await;
        registry.register_actor(b.clone()).await;

        let ids = registry.list_actors().await;
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(a.id()));
        assert!(ids.contains(b.id()));
    }
}
