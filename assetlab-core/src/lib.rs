//! AssetLab Core — dataset importers, normalizing transforms, keyed store.
//!
//! This crate contains everything the importer does:
//! - Source providers behind a narrow fetch interface (local CSV, FRED,
//!   Wikipedia table scrape, legacy exchange listings, OpenML)
//! - Light per-source transforms (index + sort, dedupe, market-cap
//!   normalization, business-day resampling)
//! - A directory-backed keyed store holding Parquet tables and `.npy` arrays
//! - The sequential import pipeline tying them together

pub mod config;
pub mod frame;
pub mod import;
pub mod source;
pub mod store;
pub mod transform;

pub use config::{ImportConfig, DATA_STORE};
pub use frame::IndexedFrame;
pub use import::{Dataset, ImportError, ImportSummary, Importer};
pub use store::{KeyedStore, StoreError, U8Array};
