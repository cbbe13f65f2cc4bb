//! Token storage strategies. A session owns exactly one mutable slot for
//! its token pair; deployments differ only in where that slot lives. The
//! in-memory store backs the client-held mode; the cookie-backed mode lives
//! at the gateway boundary and drives storage through route-guard
//! mutations instead.

use crate::types::TokenPair;
use std::sync::{Mutex, PoisonError};

pub trait TokenStore: Send + Sync {
    fn access_token(&self) -> Option<String>;
    fn refresh_token(&self) -> Option<String>;
    /// Replace both tokens wholesale, as after login or register.
    fn store_pair(&self, pair: &TokenPair);
    /// Replace only the access token, as after a refresh.
    fn store_access(&self, access: &str);
    fn clear(&self);
}

/// Process-local token slot, the local-storage analog.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<Slots>,
}

#[derive(Debug, Default)]
struct Slots {
    access: Option<String>,
    refresh: Option<String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> std::sync::MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TokenStore for MemoryStore {
    fn access_token(&self) -> Option<String> {
        self.slots().access.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.slots().refresh.clone()
    }

    fn store_pair(&self, pair: &TokenPair) {
        let mut slots = self.slots();
        slots.access = Some(pair.access.clone());
        slots.refresh = Some(pair.refresh.clone());
    }

    fn store_access(&self, access: &str) {
        self.slots().access = Some(access.to_string());
    }

    fn clear(&self) {
        let mut slots = self.slots();
        slots.access = None;
        slots.refresh = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(access: &str, refresh: &str) -> TokenPair {
        TokenPair {
            access: access.to_string(),
            refresh: refresh.to_string(),
        }
    }

    #[test]
    fn pair_replaces_both_slots() {
        let store = MemoryStore::new();
        assert!(store.access_token().is_none());

        store.store_pair(&pair("a1", "r1"));
        store.store_pair(&pair("a2", "r2"));
        assert_eq!(store.access_token().as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().as_deref(), Some("r2"));
    }

    #[test]
    fn refresh_only_touches_the_access_slot() {
        let store = MemoryStore::new();
        store.store_pair(&pair("a1", "r1"));
        store.store_access("a2");
        assert_eq!(store.access_token().as_deref(), Some("a2"));
        assert_eq!(store.refresh_token().as_deref(), Some("r1"));
    }

    #[test]
    fn clear_empties_both_slots() {
        let store = MemoryStore::new();
        store.store_pair(&pair("a1", "r1"));
        store.clear();
        assert!(store.access_token().is_none());
        assert!(store.refresh_token().is_none());
    }
}
