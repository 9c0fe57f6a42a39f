use std::{
    collections::BTreeMap,
    fs,
    io::{ErrorKind, Write as _},
    path::{Path, PathBuf},
};

use super::{Store, StoreError};

/// Settings kept as one flat JSON object on disk
///
/// Every write rewrites the whole file through a temporary sibling that is
/// renamed into place, so readers never see a half-written file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();

        let entries: BTreeMap<String, String> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(path = %path.display(), "Opened settings file with {} entries", entries.len());

        Ok(Self { path, entries })
    }

    /// An empty store that will replace whatever is at `path` on the next write
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), entries: BTreeMap::new() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<(), StoreError> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let contents = serde_json::to_vec_pretty(&self.entries)?;

        let mut file = fs::File::create(&tmp)?;
        file.write_all(&contents)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    /// Applies `change` to the entries and flushes, undoing it if the flush fails
    fn update(
        &mut self,
        key: &str,
        change: impl FnOnce(&mut BTreeMap<String, String>) -> Option<String>,
    ) -> Result<(), StoreError> {
        let previous = change(&mut self.entries);

        if let Err(e) = self.flush() {
            match previous {
                Some(previous) => self.entries.insert(key.to_owned(), previous),
                None => self.entries.remove(key),
            };
            return Err(e);
        }

        Ok(())
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.entries.get(key).map(String::as_str) == Some(value) && self.path.exists() {
            return Ok(());
        }

        self.update(key, |entries| entries.insert(key.to_owned(), value.to_owned()))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if !self.entries.contains_key(key) {
            return Ok(());
        }

        self.update(key, |entries| entries.remove(key))
    }
}
