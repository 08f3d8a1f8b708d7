//! Keyed dataset store.
//!
//! Layout under the store root:
//! - `manifest.json` — key → [`EntryMeta`]
//! - `{key}.parquet` — tabular payloads (index columns first)
//! - `{key}.npy` — raw `u8` arrays
//! - `.lock` — held while a [`KeyedStore`] handle is alive
//!
//! Features:
//! - Atomic per-key writes (write to .tmp, rename into place)
//! - Overwrite on re-put: a key only ever holds its latest payload
//! - Exclusive lock file so two processes never write concurrently
//!
//! There is no cross-key transaction. A crash mid-run leaves the keys written
//! so far and nothing else.

pub mod manifest;
pub mod npy;

pub use manifest::{EntryKind, EntryMeta, Manifest};
pub use npy::U8Array;

use crate::frame::IndexedFrame;
use polars::prelude::*;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

const LOCK_FILE: &str = ".lock";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error at {path}: {message}")]
    Io { path: String, message: String },

    #[error("store at {path} is locked by another process (remove {path}/.lock if it is stale)")]
    Locked { path: String },

    #[error("invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("no entry for key '{key}'")]
    MissingKey { key: String },

    #[error("key '{key}' holds {actual}, not {expected}")]
    WrongKind {
        key: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("array error: {0}")]
    Array(String),

    #[error("manifest error: {0}")]
    Manifest(String),
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |e| StoreError::Io {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

/// Exclusive lock on a store directory, released on drop.
#[derive(Debug)]
struct StoreLock {
    path: PathBuf,
}

impl StoreLock {
    fn acquire(root: &Path) -> Result<Self, StoreError> {
        let path = root.join(LOCK_FILE);
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StoreError::Locked {
                    path: root.display().to_string(),
                },
                _ => io_err(&path)(e),
            })?;
        // Best effort: the pid only helps an operator find the holder.
        let _ = writeln!(file, "{}", std::process::id());
        Ok(Self { path })
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Check that `key` is a non-empty `/`-separated path of safe segments.
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    let invalid = |reason: &str| StoreError::InvalidKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if key.is_empty() {
        return Err(invalid("empty"));
    }
    for segment in key.split('/') {
        if segment.is_empty() {
            return Err(invalid("empty segment"));
        }
        if segment == "." || segment == ".." {
            return Err(invalid("relative segment"));
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        {
            return Err(invalid("segments may only contain [A-Za-z0-9_.-]"));
        }
    }
    Ok(())
}

/// Handle on an open store. Dropping it releases the lock.
#[derive(Debug)]
pub struct KeyedStore {
    root: PathBuf,
    manifest: Manifest,
    _lock: StoreLock,
}

impl KeyedStore {
    /// Open the store at `root`, creating the directory on first use.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(io_err(&root))?;
        let lock = StoreLock::acquire(&root)?;

        let manifest_path = root.join(manifest::MANIFEST_FILE);
        let manifest = match fs::read_to_string(&manifest_path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StoreError::Manifest(format!("{}: {e}", manifest_path.display()))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Manifest::default(),
            Err(e) => return Err(io_err(&manifest_path)(e)),
        };

        debug!(root = %root.display(), keys = manifest.entries.len(), "opened store");
        Ok(Self {
            root,
            manifest,
            _lock: lock,
        })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.manifest.entries.keys().map(|k| k.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.manifest.entries.contains_key(key)
    }

    pub fn entry(&self, key: &str) -> Option<&EntryMeta> {
        self.manifest.entries.get(key)
    }

    /// Write a table under `key`, replacing whatever was there.
    pub fn put_table(
        &mut self,
        key: &str,
        frame: &IndexedFrame,
        source: &str,
    ) -> Result<&EntryMeta, StoreError> {
        validate_key(key)?;

        let mut buf = Vec::new();
        ParquetWriter::new(&mut buf)
            .finish(&mut frame.data.clone())
            .map_err(|e| StoreError::Parquet(format!("write {key}: {e}")))?;

        let kind = EntryKind::Table {
            index: frame.index.clone(),
            columns: frame.value_columns(),
            rows: frame.height(),
        };
        self.put_payload(key, "parquet", &buf, kind, source)
    }

    /// Write a raw `u8` array under `key`, replacing whatever was there.
    pub fn put_array(
        &mut self,
        key: &str,
        array: &U8Array,
        source: &str,
    ) -> Result<&EntryMeta, StoreError> {
        validate_key(key)?;
        let kind = EntryKind::Array {
            shape: array.shape.clone(),
            dtype: "u8".into(),
        };
        self.put_payload(key, "npy", &npy::encode(array), kind, source)
    }

    fn put_payload(
        &mut self,
        key: &str,
        extension: &str,
        bytes: &[u8],
        kind: EntryKind,
        source: &str,
    ) -> Result<&EntryMeta, StoreError> {
        let file = format!("{key}.{extension}");
        let path = self.root.join(&file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        write_atomic(&path, bytes)?;

        // A key switching between table and array leaves its old payload behind.
        if let Some(previous) = self.manifest.entries.get(key) {
            if previous.file != file {
                let _ = fs::remove_file(self.root.join(&previous.file));
            }
        }

        let meta = EntryMeta {
            key: key.to_string(),
            kind,
            file,
            data_hash: blake3::hash(bytes).to_hex().to_string(),
            source: source.to_string(),
            written_at: chrono::Local::now().naive_local(),
        };
        self.manifest.entries.insert(key.to_string(), meta);
        self.save_manifest()?;

        info!(key, bytes = bytes.len(), source, "stored");
        self.manifest
            .entries
            .get(key)
            .ok_or_else(|| StoreError::MissingKey { key: key.to_string() })
    }

    /// Read the table stored under `key`.
    pub fn get_table(&self, key: &str) -> Result<IndexedFrame, StoreError> {
        let meta = self.require(key)?;
        let EntryKind::Table { index, .. } = &meta.kind else {
            return Err(wrong_kind(key, "table", &meta.kind));
        };

        let path = self.root.join(&meta.file);
        let file = fs::File::open(&path).map_err(io_err(&path))?;
        let data = ParquetReader::new(file)
            .finish()
            .map_err(|e| StoreError::Parquet(format!("read {key}: {e}")))?;

        Ok(IndexedFrame {
            data,
            index: index.clone(),
        })
    }

    /// Read the array stored under `key`.
    pub fn get_array(&self, key: &str) -> Result<U8Array, StoreError> {
        let meta = self.require(key)?;
        if !matches!(meta.kind, EntryKind::Array { .. }) {
            return Err(wrong_kind(key, "array", &meta.kind));
        }
        let path = self.root.join(&meta.file);
        let bytes = fs::read(&path).map_err(io_err(&path))?;
        npy::decode(&bytes)
    }

    fn require(&self, key: &str) -> Result<&EntryMeta, StoreError> {
        self.manifest
            .entries
            .get(key)
            .ok_or_else(|| StoreError::MissingKey { key: key.to_string() })
    }

    fn save_manifest(&self) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(&self.manifest)
            .map_err(|e| StoreError::Manifest(format!("serialize: {e}")))?;
        write_atomic(&self.root.join(manifest::MANIFEST_FILE), &json)
    }
}

fn wrong_kind(key: &str, expected: &'static str, actual: &EntryKind) -> StoreError {
    StoreError::WrongKind {
        key: key.to_string(),
        expected,
        actual: match actual {
            EntryKind::Table { .. } => "table",
            EntryKind::Array { .. } => "array",
        },
    }
}

/// Write to `{path}.tmp`, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, bytes).map_err(io_err(&tmp))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        io_err(path)(e)
    })
}
