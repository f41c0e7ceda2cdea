//! Process-wide registry of toolkit namespaces.

use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Namespaces claimed by toolkit types, mapped to the claiming type.
///
/// Claims are check-and-insert under one lock. A namespace belongs to the first toolkit
/// type that claims it for the life of the registry; the same type may claim it again.
#[derive(Debug, Default)]
pub struct NamespaceRegistry {
    claimed: Mutex<HashMap<String, String>>,
}

static GLOBAL_REGISTRY: Lazy<NamespaceRegistry> = Lazy::new(NamespaceRegistry::new);

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry used by [`ToolKitDefinition::define`](super::ToolKitDefinition::define).
    pub fn global() -> &'static NamespaceRegistry {
        &GLOBAL_REGISTRY
    }

    pub fn claim(&self, namespace: &str, owner: &str) -> Result<()> {
        let mut claimed = self.lock();
        match claimed.get(namespace) {
            Some(existing) if existing != owner => Err(Error::NamespaceCollision {
                namespace: namespace.to_string(),
                owner: existing.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                claimed.insert(namespace.to_string(), owner.to_string());
                tracing::debug!(namespace, owner, "claimed toolkit namespace");
                Ok(())
            }
        }
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.lock().contains_key(namespace)
    }

    pub fn owner(&self, namespace: &str) -> Option<String> {
        self.lock().get(namespace).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget every claim. Meant for tests that share the global registry.
    pub fn reset(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A panic cannot leave the map half-updated, so a poisoned lock is still usable.
        self.claimed.lock().unwrap_or_else(|e| e.into_inner())
    }
}
