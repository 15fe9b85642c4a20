//!
//! fruitstand credential store
//! ---------------------------
//! In-memory user table plus the registration and authentication checks.
//! Passwords are stored as Argon2 PHC strings and verified through the
//! hash primitive (constant-time). User ids are 128-bit random opaque
//! tokens encoded base64url without padding.
//!
//! The store owns the User lifecycle exclusively: users are created on
//! registration and never mutated or deleted afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use base64::Engine;
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AppError, AppResult};

/// A registered user. The password hash never leaves the process: it is
/// skipped on serialization so handlers can return a `User` directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
}

/// Generate a fresh opaque identifier: 128 random bits, base64url no padding.
/// Fails only when the system RNG does, which is not a usable state for
/// issuing identifiers.
pub fn gen_id() -> AppResult<String> {
    let mut buf = [0u8; 16];
    getrandom::getrandom(&mut buf).map_err(|e| AppError::internal(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

fn hash_password(password: &str) -> AppResult<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AppError::internal(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AppError::internal(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::internal(e.to_string()))?
        .to_string();
    Ok(phc)
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else { false }
}

/// Shared handle over the in-memory user table, keyed by email.
/// Exactly one user per email value (case-sensitive exact match).
#[derive(Clone, Default)]
pub struct UserStore(Arc<RwLock<HashMap<String, User>>>);

impl UserStore {
    pub fn new() -> Self { Self::default() }

    /// Register a new user. Fails when either field is empty or the email
    /// already has a user. Returns the stored record, hash included for
    /// internal use only.
    pub fn register(&self, email: &str, password: &str) -> AppResult<User> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("You need to provide email and password to register"));
        }
        if self.0.read().contains_key(email) {
            return Err(AppError::email_taken());
        }
        // Hash outside the lock; it is the one slow operation in the core.
        let password_hash = hash_password(password)?;
        let mut map = self.0.write();
        if map.contains_key(email) {
            return Err(AppError::email_taken());
        }
        let mut id = gen_id()?;
        while map.values().any(|u| u.id == id) {
            id = gen_id()?;
        }
        let user = User {
            id,
            email: email.to_string(),
            password_hash,
        };
        map.insert(email.to_string(), user.clone());
        info!(target: "users", "registered user id={}", user.id);
        Ok(user)
    }

    /// Check credentials against the stored hash. Unknown email and wrong
    /// password fail with the same error.
    pub fn authenticate(&self, email: &str, password: &str) -> AppResult<User> {
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("You need to provide email and password to login"));
        }
        let user = {
            let map = self.0.read();
            map.get(email).cloned()
        };
        match user {
            Some(u) if verify_password(&u.password_hash, password) => Ok(u),
            _ => Err(AppError::invalid_credentials()),
        }
    }
}
