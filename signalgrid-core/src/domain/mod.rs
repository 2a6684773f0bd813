//! Domain types for SignalGrid

pub mod bar;
pub mod series;
pub mod signal;

pub use bar::Bar;
pub use series::{PriceSeries, SeriesError};
pub use signal::{Signal, SignalPoint, SignalSeries};
