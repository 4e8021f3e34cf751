use std::path::PathBuf;

use crate::{Backend, MediumError, MemoryBackend, SqliteBackend};

/// Configuration for the medium backing the preference store.
#[derive(Debug, Clone)]
pub enum MediumConfiguration {
    /// Keep everything in memory. Nothing survives the process.
    Memory,

    /// SQLite configuration, used on native platforms
    Sqlite {
        /// The file name of the database, without the `.sqlite` extension.
        db_name: String,
        /// The directory holding the database file. It is created if missing.
        folder_path: PathBuf,
    },
}

impl MediumConfiguration {
    /// Create the configured backend.
    pub fn open(self) -> Result<Box<dyn Backend>, MediumError> {
        match self {
            MediumConfiguration::Memory => Ok(Box::new(MemoryBackend::new())),
            MediumConfiguration::Sqlite {
                db_name,
                folder_path,
            } => {
                let path = folder_path.join(format!("{db_name}.sqlite"));
                Ok(Box::new(SqliteBackend::open(path)?))
            }
        }
    }
}
