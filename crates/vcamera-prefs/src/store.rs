use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::RwLock,
};

use tracing::{debug, info, warn};
use vcamera_state::{Backend, Edit, Namespace, NamespaceHandle, PrefType, PrefValue};

use crate::{key::validate_key, Key, PrefsError};

/// A typed key-value store over one persisted namespace.
///
/// Every write is visible to reads in this process as soon as the call returns; it is handed to
/// the backing medium at the same time and becomes durable asynchronously. Call
/// [`PreferenceStore::commit`] to wait for durability.
///
/// Each key has a single type, set by the last write. Reading it as another type returns the
/// default (or a [`PrefsError::TypeMismatch`] from [`PreferenceStore::try_get`]).
///
/// # Example
/// ```rust
/// use vcamera_prefs::{MemoryBackend, PreferenceStore, CAMERA_SETTINGS};
///
/// let store = PreferenceStore::open(&MemoryBackend::new(), CAMERA_SETTINGS).unwrap();
///
/// store.set_int("zoom_level", 3).unwrap();
/// assert_eq!(store.get_int("zoom_level", 0), 3);
///
/// store.remove("zoom_level").unwrap();
/// assert_eq!(store.get_int("zoom_level", 0), 0);
/// ```
pub struct PreferenceStore {
    namespace: Namespace,
    handle: Box<dyn NamespaceHandle>,
    entries: RwLock<HashMap<String, PrefValue>>,
}

impl fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl PreferenceStore {
    /// Open `namespace` on `backend` and load its current entries.
    ///
    /// Most applications should go through [`StoreCell::initialize`](crate::StoreCell) instead,
    /// which guarantees a single store per namespace.
    pub fn open(backend: &dyn Backend, namespace: Namespace) -> Result<Self, PrefsError> {
        let handle = backend.open_namespace(&namespace)?;
        let entries = handle.load()?;
        info!(%namespace, entries = entries.len(), "Opened preference store");

        Ok(Self {
            namespace,
            handle,
            entries: RwLock::new(entries),
        })
    }

    /// The namespace this store reads and writes.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Store `value` under `key`, replacing any previous value of any type.
    pub fn set<T: PrefType>(&self, key: &str, value: T) -> Result<(), PrefsError> {
        self.set_value(key, value.into_value())
    }

    /// Store an already tagged value under `key`.
    pub fn set_value(&self, key: &str, value: PrefValue) -> Result<(), PrefsError> {
        validate_key(key)?;
        self.edit(Edit::Put {
            key: key.to_owned(),
            value,
        });
        Ok(())
    }

    /// Get the value stored under `key`, or `default` if it is missing or holds another type.
    pub fn get<T: PrefType>(&self, key: &str, default: T) -> T {
        match self.try_get(key) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(e) => {
                warn!(%e, "Returning default for unreadable preference");
                default
            }
        }
    }

    /// Get the value stored under `key`.
    ///
    /// Returns `Ok(None)` if the key is missing.
    ///
    /// # Errors
    ///
    /// - [`PrefsError::InvalidKey`] for malformed keys
    /// - [`PrefsError::TypeMismatch`] if the key was last written with another type
    pub fn try_get<T: PrefType>(&self, key: &str) -> Result<Option<T>, PrefsError> {
        validate_key(key)?;
        let Some(value) = self.get_value(key) else {
            return Ok(None);
        };

        match T::from_value(&value) {
            Some(typed) => Ok(Some(typed)),
            None => Err(PrefsError::TypeMismatch {
                key: key.to_owned(),
                expected: T::KIND,
                found: value.kind(),
            }),
        }
    }

    /// Get the value stored under `key`, whatever its type.
    pub fn get_value(&self, key: &str) -> Option<PrefValue> {
        self.entries
            .read()
            .expect("RwLock should not be poisoned")
            .get(key)
            .cloned()
    }

    /// Get the value stored under a type-safe key.
    ///
    /// Returns `None` if the key is missing or holds another type.
    pub fn read<T: PrefType>(&self, key: Key<T>) -> Option<T> {
        match self.try_get(key.name()) {
            Ok(value) => value,
            Err(e) => {
                warn!(%e, "Failed to read preference");
                None
            }
        }
    }

    /// Store `value` under a type-safe key.
    pub fn write<T: PrefType>(&self, key: Key<T>, value: T) -> Result<(), PrefsError> {
        self.set(key.name(), value)
    }

    /// Store a string under `key`.
    pub fn set_string(&self, key: &str, value: impl Into<String>) -> Result<(), PrefsError> {
        self.set(key, value.into())
    }

    /// Read the string under `key`, or a copy of `default` if it is missing or holds another type.
    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.try_get::<String>(key) {
            Ok(Some(value)) => value,
            Ok(None) => default.to_owned(),
            Err(e) => {
                warn!(%e, "Returning default for unreadable preference");
                default.to_owned()
            }
        }
    }

    /// Store a 32-bit integer under `key`.
    pub fn set_int(&self, key: &str, value: i32) -> Result<(), PrefsError> {
        self.set(key, value)
    }

    /// Read the 32-bit integer under `key`, or `default` if it is missing or holds another type.
    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        self.get(key, default)
    }

    /// Store a 64-bit integer under `key`.
    pub fn set_long(&self, key: &str, value: i64) -> Result<(), PrefsError> {
        self.set(key, value)
    }

    /// Read the 64-bit integer under `key`, or `default` if it is missing or holds another type.
    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        self.get(key, default)
    }

    /// Store a boolean under `key`.
    pub fn set_boolean(&self, key: &str, value: bool) -> Result<(), PrefsError> {
        self.set(key, value)
    }

    /// Read the boolean under `key`, or `default` if it is missing or holds another type.
    pub fn get_boolean(&self, key: &str, default: bool) -> bool {
        self.get(key, default)
    }

    /// Store a float under `key`. Infinities and NaN are kept as is.
    pub fn set_float(&self, key: &str, value: f32) -> Result<(), PrefsError> {
        self.set(key, value)
    }

    /// Read the float under `key`, or `default` if it is missing or holds another type.
    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        self.get(key, default)
    }

    /// Delete the entry for `key`. Removing a missing key does nothing.
    pub fn remove(&self, key: &str) -> Result<(), PrefsError> {
        validate_key(key)?;
        if self.contains(key) {
            self.edit(Edit::Remove {
                key: key.to_owned(),
            });
        }
        Ok(())
    }

    /// Delete every entry in the namespace.
    pub fn clear(&self) {
        self.edit(Edit::Clear);
    }

    /// Whether `key` has an entry of any type.
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .expect("RwLock should not be poisoned")
            .contains_key(key)
    }

    /// Snapshot of the keys currently present.
    pub fn get_all_keys(&self) -> HashSet<String> {
        self.entries
            .read()
            .expect("RwLock should not be poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Snapshot of every entry currently present.
    pub fn entries(&self) -> HashMap<String, PrefValue> {
        self.entries
            .read()
            .expect("RwLock should not be poisoned")
            .clone()
    }

    /// Block until every write made so far is durably stored.
    ///
    /// This is expensive and meant for rare, deliberate use, such as right before the process is
    /// terminated. Returns `false` if the medium failed to persist the writes.
    pub fn commit(&self) -> bool {
        match self.handle.flush() {
            Ok(()) => {
                debug!(namespace = %self.namespace, "Committed preferences");
                true
            }
            Err(e) => {
                warn!(namespace = %self.namespace, error = %e, "Failed to commit preferences");
                false
            }
        }
    }

    fn edit(&self, edit: Edit) {
        let mut entries = self
            .entries
            .write()
            .expect("RwLock should not be poisoned");
        edit.apply_to(&mut entries);
        // Handed over while still locked, so the medium sees edits in the order readers do.
        self.handle.apply(edit);
    }
}

#[cfg(test)]
mod tests {
    use vcamera_state::{MemoryBackend, PrefKind};

    use super::*;
    use crate::{camera, CAMERA_SETTINGS};

    fn open() -> (MemoryBackend, PreferenceStore) {
        let backend = MemoryBackend::new();
        let store = PreferenceStore::open(&backend, CAMERA_SETTINGS).unwrap();
        (backend, store)
    }

    #[test]
    fn test_round_trip_every_type() {
        let (_, store) = open();

        store.set_string("device_model", "Pixel").unwrap();
        store.set_int("zoom_level", 3).unwrap();
        store.set_long("session_id", 9_000_000_000).unwrap();
        store.set_boolean("flash_enabled", true).unwrap();
        store.set_float("exposure", -0.75).unwrap();

        assert_eq!(store.get_string("device_model", ""), "Pixel");
        assert_eq!(store.get_int("zoom_level", 0), 3);
        assert_eq!(store.get_long("session_id", 0), 9_000_000_000);
        assert!(store.get_boolean("flash_enabled", false));
        assert_eq!(store.get_float("exposure", 0.0), -0.75);
    }

    #[test]
    fn test_missing_key_returns_default() {
        let (_, store) = open();

        assert_eq!(store.get_string("device_model", "unknown"), "unknown");
        assert_eq!(store.get_int("zoom_level", 7), 7);
        assert_eq!(store.get_long("session_id", -1), -1);
        assert!(store.get_boolean("flash_enabled", true));
        assert_eq!(store.get_float("exposure", 1.5), 1.5);
        assert_eq!(store.try_get::<i32>("zoom_level").unwrap(), None);
    }

    #[test]
    fn test_zoom_level_scenario() {
        let (_, store) = open();

        store.set_int("zoom_level", 3).unwrap();
        assert_eq!(store.get_int("zoom_level", 0), 3);

        store.remove("zoom_level").unwrap();
        assert_eq!(store.get_int("zoom_level", 0), 0);
    }

    #[test]
    fn test_flash_enabled_scenario() {
        let (_, store) = open();

        store.set_boolean("flash_enabled", true).unwrap();
        assert!(store.contains("flash_enabled"));
        assert!(store.get_all_keys().contains("flash_enabled"));
    }

    #[test]
    fn test_last_writer_wins() {
        let (_, store) = open();

        store.set_string("device_model", "Pixel").unwrap();
        store.set_string("device_model", "Nexus").unwrap();
        assert_eq!(store.get_string("device_model", ""), "Nexus");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let (backend, store) = open();
        store.set_int("zoom_level", 3).unwrap();

        store.remove("missing").unwrap();
        assert_eq!(store.get_all_keys().len(), 1);
        assert_eq!(backend.pending_edits(&CAMERA_SETTINGS), 1);

        store.remove("zoom_level").unwrap();
        store.remove("zoom_level").unwrap();
        assert!(store.get_all_keys().is_empty());
        assert_eq!(backend.pending_edits(&CAMERA_SETTINGS), 2);
    }

    #[test]
    fn test_clear_removes_everything() {
        let (_, store) = open();
        store.set_int("zoom_level", 3).unwrap();
        store.set_boolean("flash_enabled", true).unwrap();

        store.clear();

        assert!(store.get_all_keys().is_empty());
        assert!(!store.contains("zoom_level"));
        assert!(!store.contains("flash_enabled"));
    }

    #[test]
    fn test_keys_snapshot_is_detached() {
        let (_, store) = open();
        store.set_int("zoom_level", 3).unwrap();

        let keys = store.get_all_keys();
        store.set_boolean("flash_enabled", true).unwrap();

        assert_eq!(keys.len(), 1);
        assert_eq!(store.get_all_keys().len(), 2);
    }

    #[test]
    fn test_type_mismatch() {
        let (_, store) = open();
        store.set_int("zoom_level", 3).unwrap();

        assert_eq!(store.get_string("zoom_level", "fallback"), "fallback");
        assert!(!store.get_boolean("zoom_level", false));
        assert_eq!(store.get_long("zoom_level", 5), 5);

        match store.try_get::<i64>("zoom_level") {
            Err(PrefsError::TypeMismatch {
                key,
                expected,
                found,
            }) => {
                assert_eq!(key, "zoom_level");
                assert_eq!(expected, PrefKind::Long);
                assert_eq!(found, PrefKind::Int);
            }
            other => panic!("Expected a type mismatch, got {other:?}"),
        }

        // Writing another type replaces the entry.
        store.set_string("zoom_level", "wide").unwrap();
        assert_eq!(store.get_string("zoom_level", ""), "wide");
        assert_eq!(store.get_int("zoom_level", 0), 0);
    }

    #[test]
    fn test_invalid_key_does_not_mutate() {
        let (backend, store) = open();

        assert!(matches!(
            store.set_int("", 1),
            Err(PrefsError::InvalidKey(_))
        ));
        assert!(matches!(
            store.set_string("  ", "x"),
            Err(PrefsError::InvalidKey(_))
        ));
        assert!(matches!(store.remove(""), Err(PrefsError::InvalidKey(_))));

        assert!(store.get_all_keys().is_empty());
        assert_eq!(backend.pending_edits(&CAMERA_SETTINGS), 0);
        assert_eq!(store.get_int("", 4), 4);
    }

    #[test]
    fn test_typed_keys() {
        let (_, store) = open();

        assert_eq!(store.read(camera::DEVICE_MODEL), None);
        store.write(camera::DEVICE_MODEL, "Pixel".to_string()).unwrap();
        store.write(camera::ZOOM_LEVEL, 2).unwrap();
        store.write(camera::FLASH_ENABLED, false).unwrap();

        assert_eq!(store.read(camera::DEVICE_MODEL), Some("Pixel".to_string()));
        assert_eq!(store.read(camera::ZOOM_LEVEL), Some(2));
        assert_eq!(store.read(camera::FLASH_ENABLED), Some(false));
        assert_eq!(store.get_value("zoom_level"), Some(PrefValue::Int(2)));
    }

    #[test]
    fn test_writes_are_durable_after_commit() {
        let (backend, store) = open();

        store.set_int("zoom_level", 3).unwrap();
        store.set_string("device_model", "Pixel").unwrap();
        assert!(backend.durable_entries(&CAMERA_SETTINGS).is_empty());

        assert!(store.commit());
        let durable = backend.durable_entries(&CAMERA_SETTINGS);
        assert_eq!(durable.get("zoom_level"), Some(&PrefValue::Int(3)));
        assert_eq!(durable.get("device_model"), Some(&PrefValue::from("Pixel")));

        let reopened = PreferenceStore::open(&backend, CAMERA_SETTINGS).unwrap();
        assert_eq!(reopened.get_int("zoom_level", 0), 3);
        assert_eq!(reopened.entries(), store.entries());
    }

    #[test]
    fn test_commit_reports_medium_failure() {
        let (backend, store) = open();
        for zoom in 0..10 {
            store.set_int("zoom_level", zoom).unwrap();
        }

        backend.set_fail_flush(true);
        assert!(!store.commit());
        // The in-process view is unaffected.
        assert_eq!(store.get_int("zoom_level", -1), 9);

        backend.set_fail_flush(false);
        assert!(store.commit());
        assert_eq!(
            backend.durable_entries(&CAMERA_SETTINGS).get("zoom_level"),
            Some(&PrefValue::Int(9))
        );
    }
}
