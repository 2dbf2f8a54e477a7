//! Domain types for tickwise

pub mod bar;
pub mod series;
pub mod snapshot;

pub use bar::Bar;
pub use series::{BarSeries, InputError, SeriesFingerprint};
pub use snapshot::PriceSnapshot;
