use std::sync::{Arc, Mutex, OnceLock};

use tracing::debug;
use vcamera_state::{Backend, Namespace};

use crate::{PreferenceStore, PrefsError};

/// Owner of the single [`PreferenceStore`] for a namespace.
///
/// The cell starts uninitialized. The first successful [`StoreCell::initialize`] binds it to a
/// backend for the rest of its lifetime; later calls return the same store and ignore their
/// backend. Construct one at startup and pass it (or the store it hands out) to the components
/// that need preferences.
///
/// # Example
/// ```rust
/// use vcamera_prefs::{MemoryBackend, StoreCell, CAMERA_SETTINGS};
///
/// let cell = StoreCell::new(CAMERA_SETTINGS);
/// assert!(cell.get_instance().is_err());
///
/// let store = cell.initialize(&MemoryBackend::new()).unwrap();
/// store.set_boolean("flash_enabled", true).unwrap();
///
/// assert!(cell.get_instance().unwrap().get_boolean("flash_enabled", false));
/// ```
#[derive(Debug)]
pub struct StoreCell {
    namespace: Namespace,
    store: OnceLock<Arc<PreferenceStore>>,
    init: Mutex<()>,
}

impl StoreCell {
    /// Create an uninitialized cell for `namespace`.
    pub const fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            store: OnceLock::new(),
            init: Mutex::new(()),
        }
    }

    /// The namespace the store is bound to.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Bind the cell to `context`, opening the namespace on it.
    ///
    /// Idempotent: once a store exists it is returned and `context` is not used. Concurrent
    /// first callers are serialized so the namespace is opened exactly once. If opening fails the
    /// error is returned and the cell stays uninitialized.
    pub fn initialize(&self, context: &dyn Backend) -> Result<Arc<PreferenceStore>, PrefsError> {
        if let Some(store) = self.store.get() {
            debug!(namespace = %self.namespace, "Preference store already initialized");
            return Ok(Arc::clone(store));
        }

        let _guard = self.init.lock().expect("Mutex should not be poisoned");
        if let Some(store) = self.store.get() {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(PreferenceStore::open(context, self.namespace)?);
        // Only set while holding the guard, and checked empty above.
        let _ = self.store.set(Arc::clone(&store));
        Ok(store)
    }

    /// Get the bound store.
    ///
    /// # Errors
    ///
    /// [`PrefsError::UninitializedStore`] if [`StoreCell::initialize`] has not completed.
    pub fn get_instance(&self) -> Result<Arc<PreferenceStore>, PrefsError> {
        self.store
            .get()
            .map(Arc::clone)
            .ok_or(PrefsError::UninitializedStore)
    }

    /// Whether [`StoreCell::initialize`] has completed. Never blocks.
    pub fn is_initialized(&self) -> bool {
        self.store.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Barrier,
    };

    use vcamera_state::{MediumError, MemoryBackend, NamespaceHandle};

    use super::*;
    use crate::CAMERA_SETTINGS;

    /// Counts how many times a namespace was opened.
    #[derive(Default)]
    struct CountingBackend {
        inner: MemoryBackend,
        opens: AtomicUsize,
    }

    impl Backend for CountingBackend {
        fn open_namespace(
            &self,
            namespace: &Namespace,
        ) -> Result<Box<dyn NamespaceHandle>, MediumError> {
            self.opens.fetch_add(1, Ordering::SeqCst);
            self.inner.open_namespace(namespace)
        }
    }

    struct FailingBackend;

    impl Backend for FailingBackend {
        fn open_namespace(
            &self,
            _namespace: &Namespace,
        ) -> Result<Box<dyn NamespaceHandle>, MediumError> {
            Err(MediumError::WriterUnavailable)
        }
    }

    #[test]
    fn test_get_instance_before_initialize() {
        let cell = StoreCell::new(CAMERA_SETTINGS);

        assert!(!cell.is_initialized());
        assert!(matches!(
            cell.get_instance(),
            Err(PrefsError::UninitializedStore)
        ));
    }

    #[test]
    fn test_first_binding_wins() {
        let cell = StoreCell::new(CAMERA_SETTINGS);
        let first = CountingBackend::default();
        let second = CountingBackend::default();

        let a = cell.initialize(&first).unwrap();
        a.set_int("zoom_level", 3).unwrap();
        let b = cell.initialize(&second).unwrap();

        assert!(cell.is_initialized());
        assert!(Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &cell.get_instance().unwrap()));
        assert_eq!(b.get_int("zoom_level", 0), 3);
        assert_eq!(first.opens.load(Ordering::SeqCst), 1);
        assert_eq!(second.opens.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_concurrent_initialize_opens_once() {
        const THREADS: usize = 8;

        let cell = StoreCell::new(CAMERA_SETTINGS);
        let backends: Vec<CountingBackend> =
            (0..THREADS).map(|_| CountingBackend::default()).collect();
        let barrier = Barrier::new(THREADS);

        let stores: Vec<Arc<PreferenceStore>> = std::thread::scope(|s| {
            let handles: Vec<_> = backends
                .iter()
                .map(|backend| {
                    let cell = &cell;
                    let barrier = &barrier;
                    s.spawn(move || {
                        barrier.wait();
                        cell.initialize(backend).unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let opens: usize = backends
            .iter()
            .map(|b| b.opens.load(Ordering::SeqCst))
            .sum();
        assert_eq!(opens, 1);
        assert!(stores.iter().all(|s| Arc::ptr_eq(s, &stores[0])));
    }

    #[test]
    fn test_failed_initialize_can_be_retried() {
        let cell = StoreCell::new(CAMERA_SETTINGS);

        assert!(matches!(
            cell.initialize(&FailingBackend),
            Err(PrefsError::Medium(_))
        ));
        assert!(!cell.is_initialized());

        cell.initialize(&MemoryBackend::new()).unwrap();
        assert!(cell.is_initialized());
    }
}
