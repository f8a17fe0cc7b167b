//! Asynchronous boundary between the pure circadian core and an external
//! health-event store.
//!
//! Callers implement [`EventSource`] (and [`MeasureSource`] for
//! correlation); [`TimelineService`] issues the concurrent fetches each
//! operation needs, fails fast on the first store error, and hands the
//! joined snapshots to `circa-core`'s pure reconstruction and aggregation.

pub mod error;
pub mod service;
pub mod source;

pub use error::{InputSide, QueryError};
pub use service::TimelineService;
pub use source::{EventSource, MeasureSource};
