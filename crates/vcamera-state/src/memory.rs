use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, RwLock,
    },
};

use crate::{Backend, Edit, MediumError, Namespace, NamespaceHandle, PrefValue};

/// A medium that keeps every namespace in process memory.
///
/// Applied edits stay pending until [`NamespaceHandle::flush`] moves them into the durable map,
/// which lets tests observe the gap between in-process visibility and durability. Clones share the
/// same namespaces, and opening a namespace twice returns views of the same collection.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    inner: Arc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    namespaces: Mutex<HashMap<&'static str, Arc<MemoryCollection>>>,
    fail_flush: AtomicBool,
}

#[derive(Debug, Default)]
struct MemoryCollection {
    durable: RwLock<HashMap<String, PrefValue>>,
    pending: Mutex<Vec<Edit>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent flush fail (or succeed again), keeping pending edits queued.
    pub fn set_fail_flush(&self, fail: bool) {
        self.inner.fail_flush.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of the durable entries of `namespace`.
    pub fn durable_entries(&self, namespace: &Namespace) -> HashMap<String, PrefValue> {
        self.collection(namespace)
            .durable
            .read()
            .expect("RwLock should not be poisoned")
            .clone()
    }

    /// Number of edits applied to `namespace` that have not been flushed yet.
    pub fn pending_edits(&self, namespace: &Namespace) -> usize {
        self.collection(namespace)
            .pending
            .lock()
            .expect("Mutex should not be poisoned")
            .len()
    }

    fn collection(&self, namespace: &Namespace) -> Arc<MemoryCollection> {
        let mut namespaces = self
            .inner
            .namespaces
            .lock()
            .expect("Mutex should not be poisoned");
        Arc::clone(namespaces.entry(namespace.name()).or_default())
    }
}

impl Backend for MemoryBackend {
    fn open_namespace(
        &self,
        namespace: &Namespace,
    ) -> Result<Box<dyn NamespaceHandle>, MediumError> {
        Ok(Box::new(MemoryNamespace {
            collection: self.collection(namespace),
            backend: Arc::clone(&self.inner),
        }))
    }
}

struct MemoryNamespace {
    collection: Arc<MemoryCollection>,
    backend: Arc<MemoryInner>,
}

impl NamespaceHandle for MemoryNamespace {
    fn load(&self) -> Result<HashMap<String, PrefValue>, MediumError> {
        Ok(self
            .collection
            .durable
            .read()
            .expect("RwLock should not be poisoned")
            .clone())
    }

    fn get(&self, key: &str) -> Result<Option<PrefValue>, MediumError> {
        Ok(self
            .collection
            .durable
            .read()
            .expect("RwLock should not be poisoned")
            .get(key)
            .cloned())
    }

    fn apply(&self, edit: Edit) {
        self.collection
            .pending
            .lock()
            .expect("Mutex should not be poisoned")
            .push(edit);
    }

    fn flush(&self) -> Result<(), MediumError> {
        if self.backend.fail_flush.load(Ordering::SeqCst) {
            return Err(MediumError::FlushFailed(
                "memory backend configured to fail".to_string(),
            ));
        }

        let mut pending = self
            .collection
            .pending
            .lock()
            .expect("Mutex should not be poisoned");
        let mut durable = self
            .collection
            .durable
            .write()
            .expect("RwLock should not be poisoned");
        for edit in pending.drain(..) {
            edit.apply_to(&mut durable);
        }
        Ok(())
    }
}
