//! Manifest sidecar: one JSON document describing every key in the store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Payload shape recorded for a key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EntryKind {
    Table {
        index: Vec<String>,
        columns: Vec<String>,
        rows: usize,
    },
    Array {
        shape: Vec<usize>,
        dtype: String,
    },
}

/// Metadata for a single stored key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryMeta {
    pub key: String,
    pub kind: EntryKind,
    /// Payload path relative to the store root.
    pub file: String,
    /// blake3 hash of the payload file.
    pub data_hash: String,
    /// Provider the payload came from.
    pub source: String,
    pub written_at: chrono::NaiveDateTime,
}

/// All entries, ordered by key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: BTreeMap<String, EntryMeta>,
}
