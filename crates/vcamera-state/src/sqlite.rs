use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::JoinHandle,
};

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use crate::{Backend, Edit, MediumError, Namespace, NamespaceHandle, PrefValue};

/// A medium storing each namespace as a table in a single SQLite database file.
///
/// Edits are handed to a background writer thread per namespace, which applies everything queued
/// so far in one transaction. Values are stored as the tagged JSON encoding of [`PrefValue`].
#[derive(Debug, Clone)]
pub struct SqliteBackend {
    path: PathBuf,
}

impl SqliteBackend {
    /// Use the database file at `path`, creating its parent directory if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, MediumError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(Self { path })
    }

    /// Location of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Backend for SqliteBackend {
    fn open_namespace(
        &self,
        namespace: &Namespace,
    ) -> Result<Box<dyn NamespaceHandle>, MediumError> {
        let db = Connection::open(&self.path)?;

        // Set WAL mode for better concurrency
        db.query_row("PRAGMA journal_mode = WAL", [], |row| row.get::<_, String>(0))?;

        // Namespace names are restricted to letters and underscores, so quoting is sufficient.
        db.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS \"{}\" (key TEXT PRIMARY KEY, value TEXT NOT NULL);",
            namespace.name()
        ))?;

        debug!(path = %self.path.display(), %namespace, "Opened SQLite namespace");
        Ok(Box::new(SqliteNamespace::spawn(db, namespace.name())?))
    }
}

enum WriterMessage {
    Edit(Edit),
    Flush(mpsc::Sender<Result<(), MediumError>>),
    Shutdown,
}

struct SqliteNamespace {
    table: &'static str,
    connection: Arc<Mutex<Connection>>,
    sender: mpsc::Sender<WriterMessage>,
    writer: Option<JoinHandle<()>>,
}

impl SqliteNamespace {
    fn spawn(db: Connection, table: &'static str) -> Result<Self, MediumError> {
        let connection = Arc::new(Mutex::new(db));
        let (sender, receiver) = mpsc::channel();

        let writer_connection = Arc::clone(&connection);
        let writer = std::thread::Builder::new()
            .name(format!("prefs-writer-{table}"))
            .spawn(move || run_writer(table, &writer_connection, &receiver))?;

        Ok(Self {
            table,
            connection,
            sender,
            writer: Some(writer),
        })
    }

    /// Undecodable rows are treated as missing so one bad entry cannot hide the others.
    fn decode(&self, key: &str, value: &str) -> Option<PrefValue> {
        match serde_json::from_str(value) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(table = self.table, key, error = %e, "Skipping undecodable preference");
                None
            }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .expect("Mutex should not be poisoned")
    }
}

impl NamespaceHandle for SqliteNamespace {
    fn load(&self) -> Result<HashMap<String, PrefValue>, MediumError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(&format!("SELECT key, value FROM \"{}\"", self.table))?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut entries = HashMap::new();
        for row in rows {
            let (key, value) = row?;
            if let Some(value) = self.decode(&key, &value) {
                entries.insert(key, value);
            }
        }
        Ok(entries)
    }

    fn get(&self, key: &str) -> Result<Option<PrefValue>, MediumError> {
        let conn = self.lock();
        let value = conn
            .query_row(
                &format!("SELECT value FROM \"{}\" WHERE key = ?1", self.table),
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value.and_then(|value| self.decode(key, &value)))
    }

    fn apply(&self, edit: Edit) {
        if self.sender.send(WriterMessage::Edit(edit)).is_err() {
            warn!(table = self.table, "Dropping edit, background writer is not running");
        }
    }

    fn flush(&self) -> Result<(), MediumError> {
        let (reply, response) = mpsc::channel();
        self.sender
            .send(WriterMessage::Flush(reply))
            .map_err(|_| MediumError::WriterUnavailable)?;
        response
            .recv()
            .map_err(|_| MediumError::WriterUnavailable)?
    }
}

impl Drop for SqliteNamespace {
    fn drop(&mut self) {
        // The writer persists whatever is still queued before it exits.
        let _ = self.sender.send(WriterMessage::Shutdown);
        if let Some(writer) = self.writer.take() {
            if writer.join().is_err() {
                warn!(table = self.table, "Background writer panicked");
            }
        }
    }
}

fn run_writer(
    table: &'static str,
    connection: &Mutex<Connection>,
    receiver: &mpsc::Receiver<WriterMessage>,
) {
    let mut batch = Vec::new();
    // First failure since the last flush, reported to the next flush caller.
    let mut failure: Option<String> = None;

    while let Ok(mut message) = receiver.recv() {
        // Drain everything already queued so it lands in a single transaction.
        loop {
            match message {
                WriterMessage::Edit(edit) => batch.push(edit),
                WriterMessage::Flush(reply) => {
                    persist(connection, table, &mut batch, &mut failure);
                    let result = match failure.take() {
                        Some(error) => Err(MediumError::FlushFailed(error)),
                        None => Ok(()),
                    };
                    let _ = reply.send(result);
                }
                WriterMessage::Shutdown => {
                    persist(connection, table, &mut batch, &mut failure);
                    return;
                }
            }
            match receiver.try_recv() {
                Ok(next) => message = next,
                Err(_) => break,
            }
        }
        persist(connection, table, &mut batch, &mut failure);
    }

    persist(connection, table, &mut batch, &mut failure);
}

fn persist(
    connection: &Mutex<Connection>,
    table: &str,
    batch: &mut Vec<Edit>,
    failure: &mut Option<String>,
) {
    if batch.is_empty() {
        return;
    }
    if let Err(e) = write_batch(connection, table, batch) {
        warn!(table, error = %e, edits = batch.len(), "Failed to persist edits");
        failure.get_or_insert_with(|| e.to_string());
    }
    batch.clear();
}

fn write_batch(
    connection: &Mutex<Connection>,
    table: &str,
    batch: &[Edit],
) -> Result<(), MediumError> {
    let mut conn = connection.lock().expect("Mutex should not be poisoned");
    let transaction = conn.transaction()?;

    for edit in batch {
        match edit {
            Edit::Put { key, value } => {
                let value = serde_json::to_string(value)?;
                transaction.execute(
                    &format!("INSERT OR REPLACE INTO \"{table}\" (key, value) VALUES (?1, ?2)"),
                    params![key, value],
                )?;
            }
            Edit::Remove { key } => {
                transaction.execute(
                    &format!("DELETE FROM \"{table}\" WHERE key = ?1"),
                    params![key],
                )?;
            }
            Edit::Clear => {
                transaction.execute(&format!("DELETE FROM \"{table}\""), [])?;
            }
        }
    }

    transaction.commit()?;
    Ok(())
}
