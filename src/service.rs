//!
//! fruitstand resource service
//! ---------------------------
//! Create/read/update/delete semantics over the fruit store, composing the
//! store with the authorization gate. Every mutating call runs a fixed check
//! order and short-circuits at the first failure:
//!
//!   1. session identity present        -> Unauthenticated otherwise
//!   2. required body fields non-empty  -> Validation otherwise (create/update)
//!   3. resource exists                 -> NotFound otherwise (update/delete)
//!   4. requester owns the resource     -> Forbidden otherwise (update/delete)
//!   5. perform the mutation
//!
//! Clients depend on which error surfaces first for multiply-invalid
//! requests, so the order is part of the contract. Reads are public and skip
//! steps 1-4 entirely.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::info;

use crate::authz::{can_mutate, require_authenticated};
use crate::error::{AppError, AppResult};
use crate::fruits::{Fruit, FruitStore};
use crate::users::gen_id;

/// Request body for create and update. Fields default to empty so a missing
/// JSON key and an empty string fail validation the same way.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FruitInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub emoji: String,
}

impl FruitInput {
    fn validate(&self, action: &str) -> AppResult<()> {
        if self.name.is_empty() || self.color.is_empty() || self.emoji.is_empty() {
            return Err(AppError::validation(format!(
                "Provide name, color and emoji to {action} a fruit"
            )));
        }
        Ok(())
    }
}

/// Service facade over an injected fruit store handle.
#[derive(Clone)]
pub struct FruitService {
    store: FruitStore,
}

impl FruitService {
    pub fn new(store: FruitStore) -> Self {
        Self { store }
    }

    /// All fruits keyed by id. Public read.
    pub fn list(&self) -> HashMap<String, Fruit> {
        self.store.list()
    }

    /// Single fruit by id. Public read.
    pub fn get(&self, id: &str) -> AppResult<Fruit> {
        self.store.get(id).ok_or_else(AppError::not_found)
    }

    /// Create a fruit owned by the requester, under a fresh id.
    pub fn create(&self, session_user: Option<String>, input: FruitInput) -> AppResult<Fruit> {
        let owner_id = require_authenticated(session_user, "create")?;
        input.validate("create")?;
        let fruit = Fruit {
            id: gen_id()?,
            name: input.name,
            color: input.color,
            emoji: input.emoji,
            owner_id,
        };
        self.store.create(fruit.clone());
        info!(target: "fruits", "created fruit id={} owner={}", fruit.id, fruit.owner_id);
        Ok(fruit)
    }

    /// Replace a fruit's fields. Owner-gated.
    pub fn update(&self, session_user: Option<String>, id: &str, input: FruitInput) -> AppResult<Fruit> {
        let requester = require_authenticated(session_user, "update")?;
        input.validate("update")?;
        let existing = self.store.get(id).ok_or_else(AppError::not_found)?;
        if !can_mutate(&requester, &existing) {
            return Err(AppError::forbidden());
        }
        let fruit = Fruit {
            id: existing.id,
            name: input.name,
            color: input.color,
            emoji: input.emoji,
            owner_id: existing.owner_id,
        };
        self.store.update(id, fruit.clone());
        info!(target: "fruits", "updated fruit id={} owner={}", fruit.id, fruit.owner_id);
        Ok(fruit)
    }

    /// Remove a fruit. Owner-gated.
    pub fn delete(&self, session_user: Option<String>, id: &str) -> AppResult<()> {
        let requester = require_authenticated(session_user, "delete")?;
        let existing = self.store.get(id).ok_or_else(AppError::not_found)?;
        if !can_mutate(&requester, &existing) {
            return Err(AppError::forbidden());
        }
        self.store.delete(id);
        info!(target: "fruits", "deleted fruit id={} owner={}", id, existing.owner_id);
        Ok(())
    }
}
