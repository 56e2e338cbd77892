//! Key-value storage for the workout draft.
//!
//! The draft store is handed a `DraftStorage` implementation instead of
//! reaching for a global. `FileStorage` keeps one JSON document per namespace
//! with file locking; `MemoryStorage` keeps everything in process.

use crate::{Error, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;

/// Storage adapter trait for persisting the draft under a namespace key
pub trait DraftStorage {
    /// Return the stored document, or `None` if nothing was saved yet
    fn load(&self, namespace: &str) -> Result<Option<String>>;

    fn save(&mut self, namespace: &str, contents: &str) -> Result<()>;

    fn remove(&mut self, namespace: &str) -> Result<()>;
}

/// Namespaces become file names, so keep them to a safe alphabet
fn validate_namespace(namespace: &str) -> Result<()> {
    let valid = !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !namespace.starts_with('.');
    if valid {
        Ok(())
    } else {
        Err(Error::Storage(format!("invalid namespace {:?}", namespace)))
    }
}

/// One JSON file per namespace inside a directory
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the file backing a namespace
    pub fn path_for(&self, namespace: &str) -> Result<PathBuf> {
        validate_namespace(namespace)?;
        Ok(self.dir.join(format!("{}.json", namespace)))
    }
}

impl DraftStorage for FileStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>> {
        let path = self.path_for(namespace)?;
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path)?;

        // Acquire shared lock for reading
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read = reader.read_to_string(&mut contents);
        file.unlock()?;
        read?;

        tracing::debug!("Loaded {} bytes from {:?}", contents.len(), path);
        Ok(Some(contents))
    }

    /// Atomically writes by syncing a temp file and renaming it over the target
    fn save(&mut self, namespace: &str, contents: &str) -> Result<()> {
        let path = self.path_for(namespace)?;
        std::fs::create_dir_all(&self.dir)?;

        let temp = NamedTempFile::new_in(&self.dir)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {:?}", path);
        Ok(())
    }

    fn remove(&mut self, namespace: &str) -> Result<()> {
        let path = self.path_for(namespace)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process storage, lost when dropped
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored document, mainly for tests
    pub fn get(&self, namespace: &str) -> Option<&str> {
        self.entries.get(namespace).map(String::as_str)
    }
}

impl DraftStorage for MemoryStorage {
    fn load(&self, namespace: &str) -> Result<Option<String>> {
        Ok(self.entries.get(namespace).cloned())
    }

    fn save(&mut self, namespace: &str, contents: &str) -> Result<()> {
        self.entries.insert(namespace.to_string(), contents.to_string());
        Ok(())
    }

    fn remove(&mut self, namespace: &str) -> Result<()> {
        self.entries.remove(namespace);
        Ok(())
    }
}
