//! A single [`StoreCell`] for [`CAMERA_SETTINGS`] shared by the whole process.
//!
//! Prefer owning a [`StoreCell`] and passing the store to the components that need it. This
//! module exists for entry points that cannot be handed a store, such as hooks installed into
//! code this crate does not control.
//!
//! ```rust,no_run
//! use vcamera_prefs::{global, SqliteBackend};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Once, at startup
//! global::initialize(&SqliteBackend::open("/data/vcamera/prefs.sqlite")?)?;
//!
//! // Anywhere afterwards
//! let zoom = global::get_instance()?.get_int("zoom_level", 1);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use vcamera_state::Backend;

use crate::{PreferenceStore, PrefsError, StoreCell, CAMERA_SETTINGS};

static CAMERA_SETTINGS_STORE: StoreCell = StoreCell::new(CAMERA_SETTINGS);

/// The process-wide cell.
pub fn cell() -> &'static StoreCell {
    &CAMERA_SETTINGS_STORE
}

/// Bind the process-wide store. See [`StoreCell::initialize`].
pub fn initialize(context: &dyn Backend) -> Result<Arc<PreferenceStore>, PrefsError> {
    CAMERA_SETTINGS_STORE.initialize(context)
}

/// Get the process-wide store. See [`StoreCell::get_instance`].
pub fn get_instance() -> Result<Arc<PreferenceStore>, PrefsError> {
    CAMERA_SETTINGS_STORE.get_instance()
}

/// Whether the process-wide store is bound.
pub fn is_initialized() -> bool {
    CAMERA_SETTINGS_STORE.is_initialized()
}
