//! Capability registry for tools, resources, and prompts.
//!
//! Three independent maps, each keyed by name or URI and holding a
//! descriptor plus its handler. Registering under an existing key replaces
//! the previous entry. All access goes through a reader/writer lock since
//! registration may race with dispatch once the server is running.

use {
    crate::{
        handler::CapabilityHandler,
        types::{PromptDescriptor, ResourceDescriptor, ToolDescriptor},
    },
    std::{collections::BTreeMap, sync::Arc},
    tokio::sync::RwLock,
    tracing::debug,
};

/// Descriptor types that know their registry key
pub trait Descriptor: Clone + Send + Sync + 'static {
    fn key(&self) -> &str;
}

impl Descriptor for ToolDescriptor {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Descriptor for ResourceDescriptor {
    fn key(&self) -> &str {
        &self.uri
    }
}

impl Descriptor for PromptDescriptor {
    fn key(&self) -> &str {
        &self.name
    }
}

/// A registered capability
pub struct Entry<D> {
    pub descriptor: D,
    pub handler: Arc<dyn CapabilityHandler>,
}

impl<D: Clone> Clone for Entry<D> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            handler: Arc::clone(&self.handler),
        }
    }
}

/// One key → entry mapping behind a reader/writer lock.
///
/// Listings come back in key order; the order carries no meaning beyond
/// being stable.
pub struct Registry<D> {
    entries: RwLock<BTreeMap<String, Entry<D>>>,
}

impl<D> Default for Registry<D> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<D: Descriptor> Registry<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the entry under the descriptor's key.
    ///
    /// Returns `true` when an earlier entry was replaced.
    pub async fn register(&self, descriptor: D, handler: Arc<dyn CapabilityHandler>) -> bool {
        let key = descriptor.key().to_string();
        let previous = self
            .entries
            .write()
            .await
            .insert(key.clone(), Entry { descriptor, handler });
        if previous.is_some() {
            debug!(key = %key, event = "capability_replaced", "Replaced registered capability");
        }
        previous.is_some()
    }

    /// Look up an entry, cloning it out so no lock is held while it runs.
    pub async fn get(&self, key: &str) -> Option<Entry<D>> {
        self.entries.read().await.get(key).cloned()
    }

    pub async fn descriptors(&self) -> Vec<D> {
        self.entries
            .read()
            .await
            .values()
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// The three capability maps served by one server
#[derive(Default)]
pub struct CapabilityRegistry {
    pub tools: Registry<ToolDescriptor>,
    pub resources: Registry<ResourceDescriptor>,
    pub prompts: Registry<PromptDescriptor>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}
