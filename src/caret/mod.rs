//! Caret tracking: parsing watcher records and mapping them into overlay space.

pub mod mapper;
pub mod source;
pub mod types;

pub use mapper::{CoordinateMapper, DisplayLookup, DisplayMetrics, LogicalPosition, Rect};
pub use types::{parse_record, CaretObservation, ObservationError};
