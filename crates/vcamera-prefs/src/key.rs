//! Type-safe keys for preference storage.

use std::{fmt, marker::PhantomData};

use crate::PrefsError;

/// Declare a type-safe preference key.
///
/// # Example
/// ```rust
/// use vcamera_prefs::pref_key;
///
/// pref_key!(pub const EXPOSURE: f32 = "exposure");
/// assert_eq!(EXPOSURE.name(), "exposure");
/// ```
#[macro_export]
macro_rules! pref_key {
    ($vis:vis const $name:ident: $ty:ty = $key:literal) => {
        $vis const $name: $crate::Key<$ty> = $crate::Key::new($key);
    };
}

/// Type-safe key for preference storage.
///
/// Associates a string key name with a value type at compile time, so reads and writes through
/// the key cannot disagree on the stored type.
///
/// # Example
/// ```rust
/// use vcamera_prefs::{Key, MemoryBackend, PreferenceStore, CAMERA_SETTINGS};
///
/// const ZOOM_LEVEL: Key<i32> = Key::new("zoom_level");
///
/// let store = PreferenceStore::open(&MemoryBackend::new(), CAMERA_SETTINGS).unwrap();
/// store.write(ZOOM_LEVEL, 3).unwrap();
/// assert_eq!(store.read(ZOOM_LEVEL), Some(3));
/// ```
pub struct Key<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Key<T> {
    /// Create a new type-safe key with the given storage name.
    pub const fn new(name: &'static str) -> Self {
        assert!(!name.is_empty(), "Preference keys must not be empty");
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Get the string key name used for storage.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> Clone for Key<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Key<T> {}

impl<T> fmt::Debug for Key<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.name).finish()
    }
}

/// Reject keys that cannot be stored unambiguously.
pub(crate) fn validate_key(key: &str) -> Result<(), PrefsError> {
    if key.trim().is_empty() || key.contains('\0') {
        return Err(PrefsError::InvalidKey(key.to_owned()));
    }
    Ok(())
}
