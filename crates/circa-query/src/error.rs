//! Error types for store-backed operations.

use std::fmt;

use thiserror::Error;

/// A boxed store error, preserved as the failure's source.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which correlation input could not be produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSide {
    Measure,
    Fasting,
}

impl InputSide {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Measure => "measure",
            Self::Fasting => "fasting",
        }
    }
}

impl fmt::Display for InputSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures surfaced by [`TimelineService`](crate::TimelineService).
///
/// Store errors propagate immediately and unchanged to the caller; there is
/// no retry and no partial aggregation. Retry policy, if any, belongs to the
/// store implementation.
#[derive(Debug, Error)]
pub enum QueryError {
    /// An underlying event fetch failed. Carries the first error observed;
    /// outstanding sibling fetches are abandoned.
    #[error("event fetch failed")]
    FetchFailed(#[source] BoxError),

    /// A correlation was attempted with one side missing.
    #[error("missing {side} inputs for correlation")]
    IncompleteInputs {
        side: InputSide,
        #[source]
        source: BoxError,
    },
}
