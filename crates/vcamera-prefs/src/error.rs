use thiserror::Error;
use vcamera_state::{MediumError, PrefKind};

/// Errors that can occur when working with the preference store.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// The store was used before it was initialized.
    #[error("Preference store not initialized. Call initialize() first.")]
    UninitializedStore,

    /// The key is empty, blank, or contains a NUL character.
    #[error("Invalid preference key: {0:?}")]
    InvalidKey(String),

    /// The stored value has a different type than the one requested.
    #[error("Preference '{key}' holds a {found} value, not a {expected}")]
    TypeMismatch {
        #[allow(missing_docs)]
        key: String,
        #[allow(missing_docs)]
        expected: PrefKind,
        #[allow(missing_docs)]
        found: PrefKind,
    },

    /// The backing medium failed.
    #[error(transparent)]
    Medium(#[from] MediumError),
}
