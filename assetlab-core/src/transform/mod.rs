//! Source-specific reshapes applied between fetch and store.

pub mod canonicalize;
pub mod constituents;
pub mod images;
pub mod market_cap;
pub mod prices;
pub mod reference;
pub mod series;

pub use canonicalize::Canonicalizer;
pub use market_cap::{normalize as normalize_market_caps, parse_market_cap};
pub use series::SeriesTable;
