use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{debug, warn};
use shadowdeck_core::settings::KeyValueStore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write preferences to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}

/// String key/value store kept in a single JSON object file.
///
/// A missing or unreadable file starts empty. Every write replaces the file
/// through a temporary sibling so a crash never leaves half a file behind.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match fs::read(&path) {
            Ok(raw) => match serde_json::from_slice::<BTreeMap<String, String>>(&raw) {
                Ok(values) => values,
                Err(err) => {
                    warn!("prefs: ignoring malformed {}: {}", path.display(), err);
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                warn!("prefs: cannot read {}: {}", path.display(), err);
                BTreeMap::new()
            }
        };

        debug!("prefs: opened {} keys={}", path.display(), values.len());
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(&self.values)?;
        let io_err = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(&encoded).map_err(io_err)?;
        tmp.persist(&self.path).map_err(|err| io_err(err.error))?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    type Error = StoreError;

    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), Self::Error> {
        if self.values.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }

        let previous = self.values.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist() {
            match previous {
                Some(previous) => self.values.insert(key.to_string(), previous),
                None => self.values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }
}
