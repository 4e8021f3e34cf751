#![doc = include_str!("../README.md")]

mod cell;
mod error;
mod key;
mod store;

/// Process-wide store for the camera settings namespace.
pub mod global;

pub use cell::StoreCell;
pub use error::PrefsError;
pub use key::Key;
pub use store::PreferenceStore;
pub use vcamera_state::{
    Backend, MediumConfiguration, MemoryBackend, Namespace, PrefKind, PrefType, PrefValue,
    SqliteBackend,
};

/// The namespace holding camera replacement settings.
pub const CAMERA_SETTINGS: Namespace = Namespace::new("vcamera_multi_prefs");

/// Well-known camera settings keys.
pub mod camera {
    use crate::pref_key;

    pref_key!(pub const ZOOM_LEVEL: i32 = "zoom_level");
    pref_key!(pub const FLASH_ENABLED: bool = "flash_enabled");
    pref_key!(pub const DEVICE_MODEL: String = "device_model");
}
