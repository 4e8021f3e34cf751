use std::collections::HashMap;

use crate::{MediumError, Namespace, PrefValue};

/// A change queued against a namespace.
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Insert or replace the value stored under `key`.
    Put {
        #[allow(missing_docs)]
        key: String,
        #[allow(missing_docs)]
        value: PrefValue,
    },
    /// Delete `key` if present.
    Remove {
        #[allow(missing_docs)]
        key: String,
    },
    /// Delete every entry in the namespace.
    Clear,
}

impl Edit {
    /// Apply this edit to an in-memory copy of a namespace.
    pub fn apply_to(&self, entries: &mut HashMap<String, PrefValue>) {
        match self {
            Edit::Put { key, value } => {
                entries.insert(key.clone(), value.clone());
            }
            Edit::Remove { key } => {
                entries.remove(key);
            }
            Edit::Clear => entries.clear(),
        }
    }
}

/// A persistence medium that can open named key-value collections.
///
/// This is the resource handed to the preference store when it is first initialized.
pub trait Backend {
    /// Open the collection identified by `namespace`, creating it if absent.
    fn open_namespace(&self, namespace: &Namespace)
        -> Result<Box<dyn NamespaceHandle>, MediumError>;
}

/// An open key-value collection.
///
/// Reads observe durable state only. Edits handed to [`NamespaceHandle::apply`] may be persisted
/// after the call returns; [`NamespaceHandle::flush`] waits until every edit applied so far is on
/// stable storage.
pub trait NamespaceHandle: Send + Sync {
    /// Read every durable entry.
    fn load(&self) -> Result<HashMap<String, PrefValue>, MediumError>;

    /// Read the durable value stored under `key`.
    fn get(&self, key: &str) -> Result<Option<PrefValue>, MediumError>;

    /// Whether `key` has a durable entry.
    fn contains(&self, key: &str) -> Result<bool, MediumError> {
        Ok(self.get(key)?.is_some())
    }

    /// The keys of every durable entry.
    fn keys(&self) -> Result<Vec<String>, MediumError> {
        Ok(self.load()?.into_keys().collect())
    }

    /// Queue an edit. Failures to persist it are reported by the next [`NamespaceHandle::flush`].
    fn apply(&self, edit: Edit);

    /// Block until all queued edits are durable.
    fn flush(&self) -> Result<(), MediumError>;
}
