//! Interface schema cache
//!
//! Built schema trees are immutable and deterministic, so the cache only has
//! to be readable from many workers at once. First-build writes are
//! idempotent: two workers racing on the same interface both build the same
//! tree and one copy is simply discarded.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::descriptor::InterfaceDescriptor;
use crate::error::Result;
use crate::schema::{build_interface_schema, InterfaceSchema};

/// Cache of built interface schemas, keyed by interface name
#[derive(Debug, Default)]
pub struct SchemaCache {
    inner: RwLock<HashMap<String, Arc<InterfaceSchema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a previously-built schema
    pub fn get(&self, name: &str) -> Option<Arc<InterfaceSchema>> {
        self.inner
            .read()
            .ok()
            .and_then(|map| map.get(name).cloned())
    }

    /// Fetch the schema for an interface, building it on first use
    ///
    /// The build happens outside the write lock; if another worker got there
    /// first, its copy wins and ours is dropped.
    pub fn get_or_build(&self, interface: &InterfaceDescriptor) -> Result<Arc<InterfaceSchema>> {
        if let Some(schema) = self.get(&interface.name) {
            return Ok(schema);
        }

        let built = Arc::new(build_interface_schema(interface)?);
        debug!(interface = %interface.name, "built interface schema");

        let mut map = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(map.entry(interface.name.clone()).or_insert(built).clone())
    }

    /// Drop every cached schema
    pub fn clear(&self) {
        if let Ok(mut map) = self.inner.write() {
            map.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|map| map.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{OperationDescriptor, TypeDescriptor as T};

    fn sample_interface() -> InterfaceDescriptor {
        InterfaceDescriptor::new("Counter", "A remote counter").operation(
            OperationDescriptor::new("add")
                .param("amount", T::int())
                .returns(T::int()),
        )
    }

    #[test]
    fn test_build_once_then_hit() {
        let cache = SchemaCache::new();
        assert!(cache.get("Counter").is_none());

        let iface = sample_interface();
        let first = cache.get_or_build(&iface).unwrap();
        let second = cache.get_or_build(&iface).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let cache = SchemaCache::new();
        cache.get_or_build(&sample_interface()).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
