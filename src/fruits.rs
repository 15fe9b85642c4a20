//!
//! fruitstand resource store
//! -------------------------
//! Pure keyed container for fruit records. No validation and no ownership
//! logic live here; callers are responsible for invariants, including only
//! calling `update`/`delete` for ids they have already looked up.
//!
//! The public API centers around `FruitStore`, a cheap cloneable handle
//! (`Arc<RwLock<HashMap>>`) injected into the service layer rather than held
//! as an ambient global, so tests get isolated stores.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A fruit record. `owner_id` references the user that created it and is the
/// sole basis for mutation authorization.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Fruit {
    pub id: String,
    pub name: String,
    pub color: String,
    pub emoji: String,
    pub owner_id: String,
}

/// Shared handle over the in-memory fruit table, keyed by fruit id.
#[derive(Clone, Default)]
pub struct FruitStore(Arc<RwLock<HashMap<String, Fruit>>>);

impl FruitStore {
    pub fn new() -> Self { Self::default() }

    /// Store a freshly created record and return its id.
    pub fn create(&self, fruit: Fruit) -> String {
        let id = fruit.id.clone();
        self.0.write().insert(id.clone(), fruit);
        id
    }

    pub fn get(&self, id: &str) -> Option<Fruit> {
        self.0.read().get(id).cloned()
    }

    /// Snapshot of all records keyed by id. Iteration order is irrelevant.
    pub fn list(&self) -> HashMap<String, Fruit> {
        self.0.read().clone()
    }

    /// Replace the record stored under `id`. Precondition: the id exists.
    pub fn update(&self, id: &str, fruit: Fruit) {
        self.0.write().insert(id.to_string(), fruit);
    }

    /// Remove the record stored under `id`. Precondition: the id exists.
    pub fn delete(&self, id: &str) {
        self.0.write().remove(id);
    }
}
