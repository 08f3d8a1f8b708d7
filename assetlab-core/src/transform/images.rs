//! Image dataset payloads: pixel and label arrays plus a label-name lookup.

use crate::frame::IndexedFrame;
use crate::source::arff::ImageData;
use crate::source::SourceError;
use crate::store::{StoreError, U8Array};
use polars::prelude::*;

/// Fashion-MNIST class id → display name.
pub const FASHION_LABELS: [(u8, &str); 10] = [
    (0, "T-shirt/top"),
    (1, "Trouser"),
    (2, "Pullover"),
    (3, "Dress"),
    (4, "Coat"),
    (5, "Sandal"),
    (6, "Shirt"),
    (7, "Sneaker"),
    (8, "Bag"),
    (9, "Ankle boot"),
];

/// Split decoded image data into a `rows × features` pixel array and a
/// `rows` label array.
pub fn to_arrays(data: ImageData) -> Result<(U8Array, U8Array), StoreError> {
    let pixels = U8Array::new(vec![data.rows, data.features], data.pixels)?;
    let labels = U8Array::new(vec![data.rows], data.labels)?;
    Ok((pixels, labels))
}

/// Lookup table of class ids to names, indexed by `label`.
pub fn label_names(labels: &[(u8, &str)]) -> Result<IndexedFrame, SourceError> {
    let ids: Vec<u8> = labels.iter().map(|(id, _)| *id).collect();
    let names: Vec<&str> = labels.iter().map(|(_, name)| *name).collect();
    let df = DataFrame::new(vec![
        Column::new("label".into(), ids),
        Column::new("name".into(), names),
    ])?;
    IndexedFrame::new(df, &["label"])
}
