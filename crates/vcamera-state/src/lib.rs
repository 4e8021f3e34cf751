#![doc = include_str!("../README.md")]

/// Namespace identifiers for persisted key-value collections.
pub mod namespace;

/// Tagged scalar values stored by every medium.
pub mod value;

/// The capability contract a backing medium has to provide.
pub mod medium;

/// In-memory medium, used by tests and short-lived tools.
pub mod memory;

mod configuration;
mod error;
mod sqlite;

pub use configuration::MediumConfiguration;
pub use error::MediumError;
pub use medium::{Backend, Edit, NamespaceHandle};
pub use memory::MemoryBackend;
pub use namespace::Namespace;
pub use sqlite::SqliteBackend;
pub use value::{PrefKind, PrefType, PrefValue};
