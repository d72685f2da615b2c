//! Pool of live host VM instances
//!
//! Instances join when the server loads a script-VM image and leave when
//! it unloads one. The gateway reads the live set on every call, in
//! attach order.

use crate::instance::HostInstance;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

/// Stable identifier for an attached instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InstanceId(pub u32);

/// Ordered set of live host VM instances.
pub struct InstancePool {
    instances: RwLock<Vec<(InstanceId, Arc<dyn HostInstance>)>>,
    next_id: AtomicU32,
}

impl InstancePool {
    pub fn new() -> Self {
        Self {
            instances: RwLock::new(Vec::new()),
            next_id: AtomicU32::new(0),
        }
    }

    /// Attach an instance, assigning it a stable id.
    pub fn attach(&self, instance: Arc<dyn HostInstance>) -> InstanceId {
        let id = InstanceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.instances.write().push((id, instance));
        tracing::debug!(id = id.0, "host instance attached");
        id
    }

    /// Detach an instance. Unknown ids are ignored.
    pub fn detach(&self, id: InstanceId) {
        let mut instances = self.instances.write();
        if let Some(pos) = instances.iter().position(|(i, _)| *i == id) {
            instances.remove(pos);
            tracing::debug!(id = id.0, "host instance detached");
        }
    }

    /// Snapshot of the live set in attach order.
    pub fn snapshot(&self) -> Vec<(InstanceId, Arc<dyn HostInstance>)> {
        self.instances.read().clone()
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }
}

impl Default for InstancePool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryInstance;

    #[test]
    fn test_attach_detach() {
        let pool = InstancePool::new();
        assert!(pool.is_empty());

        let a = pool.attach(Arc::new(MemoryInstance::new()));
        let b = pool.attach(Arc::new(MemoryInstance::new()));
        assert_eq!(pool.len(), 2);
        assert_ne!(a, b);

        pool.detach(a);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.snapshot()[0].0, b);

        // Detaching twice is a no-op.
        pool.detach(a);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_snapshot_preserves_attach_order() {
        let pool = InstancePool::new();
        let a = pool.attach(Arc::new(MemoryInstance::new()));
        let b = pool.attach(Arc::new(MemoryInstance::new()));
        let c = pool.attach(Arc::new(MemoryInstance::new()));

        let order: Vec<InstanceId> = pool.snapshot().iter().map(|(id, _)| *id).collect();
        assert_eq!(order, vec![a, b, c]);
    }
}
