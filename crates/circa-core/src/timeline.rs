//! Circadian timeline reconstruction.
//!
//! Health stores only make positive assertions ("asleep from X to Y"); every
//! moment not covered by one is implicitly fasting. Reconstruction turns a
//! bag of possibly-overlapping raw events into a chronologically ordered
//! sequence of timeline points covering a query window, synthesizing fasting
//! spans for the gaps.
//!
//! # Algorithm summary
//!
//! 1. Clip each event's start to the window start; ends are left as reported
//! 2. Expand each event into a start point and an end point, then sort all
//!    points by timestamp (stable, so simultaneous points keep insertion
//!    order)
//! 3. Walk the points with alternating parity (even index = interval start),
//!    inserting fasting pairs for the lead-in, for every gap, and for the
//!    tail out to the window end
//!
//! Boundaries that coincide exactly are nudged forward by one second so no
//! zero-length interval survives into aggregation; synthesized gap fills are
//! shrunk by the same epsilon on both ends.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::event::{Event, EventCategory};

/// A mutually exclusive circadian state.
///
/// `Fasting` is the residual state: it is never reported by a store, only
/// synthesized during reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircadianState {
    Sleep,
    Exercise,
    Meal,
    Fasting,
}

impl CircadianState {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Exercise => "exercise",
            Self::Meal => "meal",
            Self::Fasting => "fasting",
        }
    }

    /// Whether this state counts toward a fasting window (anything but a
    /// meal).
    #[must_use]
    pub const fn is_fasting_class(&self) -> bool {
        !matches!(self, Self::Meal)
    }
}

impl std::fmt::Display for CircadianState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EventCategory> for CircadianState {
    fn from(category: EventCategory) -> Self {
        match category {
            EventCategory::Sleep => Self::Sleep,
            EventCategory::Exercise => Self::Exercise,
            EventCategory::Meal => Self::Meal,
        }
    }
}

/// One endpoint on the reconstructed timeline.
///
/// Points come in adjacent pairs: an even-indexed point opens an interval and
/// its successor closes it. Consumers that want plain intervals should use
/// [`Timeline::intervals`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelinePoint {
    /// The endpoint's timestamp.
    pub at: DateTime<Utc>,
    /// The state of the interval this endpoint belongs to.
    pub state: CircadianState,
}

/// A closed span in a single circadian state, derived from a point pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub state: CircadianState,
}

impl Interval {
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// An ordered sequence of timeline points covering a query window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Timeline {
    points: Vec<TimelinePoint>,
}

impl Timeline {
    /// Wraps an already-ordered point sequence.
    #[must_use]
    pub const fn from_points(points: Vec<TimelinePoint>) -> Self {
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[TimelinePoint] {
        &self.points
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The pairwise interval view of the point sequence.
    ///
    /// States are read from the closing point of each pair; if raw events
    /// overlapped each other the two points of a pair can disagree, which is
    /// a data anomaly the reconstruction does not try to repair.
    pub fn intervals(&self) -> impl Iterator<Item = Interval> + '_ {
        self.points.chunks_exact(2).map(|pair| Interval {
            start: pair[0].at,
            end: pair[1].at,
            state: pair[1].state,
        })
    }
}

/// Configuration for timeline reconstruction.
#[derive(Debug, Clone)]
pub struct TimelineConfig {
    /// Nudge applied to coinciding boundaries and synthesized gap fills so
    /// no zero-length interval is produced. Default: 1 second.
    pub epsilon_s: i64,

    /// Gaps longer than this are treated as a data-quality anomaly rather
    /// than a true multi-day fast: the synthesized fasting span is clamped
    /// to this length and a warning is logged. Default: 86400 (24 hours).
    pub max_gap_s: i64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            epsilon_s: 1,
            max_gap_s: 86_400, // 24 hours
        }
    }
}

/// The sentinel start for whole-history queries.
///
/// A window starting here never receives a synthesized lead-in fasting pair,
/// since "fasting since the beginning of time" is meaningless.
#[must_use]
pub const fn distant_past() -> DateTime<Utc> {
    DateTime::<Utc>::MIN_UTC
}

/// Reconstructs the circadian timeline for `[window_start, window_end]` from
/// raw store events.
///
/// The result partitions the window into contiguous, non-overlapping
/// intervals (modulo the documented epsilon nudges), with fasting filling
/// everything no event covers. An empty event slice produces an empty
/// timeline: callers distinguish "no data" from an error and the
/// reconstruction does not invent a window-long fast out of silence.
///
/// Event ends are taken as reported, even past `window_end`; the trailing
/// fasting pair then runs from that late endpoint back to the window end.
#[must_use]
pub fn reconstruct_timeline(
    events: &[Event],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    config: &TimelineConfig,
) -> Timeline {
    let mut endpoints: Vec<TimelinePoint> = Vec::with_capacity(events.len() * 2);
    for event in events {
        let state = CircadianState::from(event.category);
        endpoints.push(TimelinePoint {
            at: event.start.max(window_start),
            state,
        });
        endpoints.push(TimelinePoint {
            at: event.end,
            state,
        });
    }
    endpoints.sort_by_key(|point| point.at);

    let Some(last) = endpoints.last().copied() else {
        return Timeline::default();
    };

    let epsilon = Duration::seconds(config.epsilon_s);
    let max_gap = Duration::seconds(config.max_gap_s);
    let fasting = |at: DateTime<Utc>| TimelinePoint {
        at,
        state: CircadianState::Fasting,
    };

    let mut points: Vec<TimelinePoint> = Vec::with_capacity(endpoints.len() + 4);
    let mut at_interval_start = true;
    let mut prev: Option<TimelinePoint> = None;

    for point in endpoints {
        if let Some(prev_point) = prev {
            if at_interval_start && prev_point.at == point.at {
                // The previous interval ends exactly where this one starts;
                // nudge the start forward instead of emitting a zero-length
                // fasting fill.
                points.push(TimelinePoint {
                    at: point.at + epsilon,
                    state: point.state,
                });
            } else if at_interval_start {
                let fast_start = prev_point.at + epsilon;
                let moved_end = point.at - epsilon;
                let fast_end = if fast_start < moved_end - max_gap {
                    tracing::warn!(
                        gap_s = (moved_end - fast_start).num_seconds(),
                        clamp_s = config.max_gap_s,
                        "anomalous gap between events, clamping fasting span"
                    );
                    fast_start + max_gap
                } else {
                    moved_end
                };
                points.push(fasting(fast_start));
                points.push(fasting(fast_end));
                points.push(point);
            } else {
                points.push(point);
            }
        } else {
            // Lead-in: unless the first endpoint already sits on the window
            // start (or the window is open-ended into the past), the subject
            // was fasting from the window start up to it.
            let skip_prefix = point.at == window_start || window_start == distant_past();
            if !skip_prefix {
                points.push(fasting(window_start));
                points.push(fasting(point.at));
            }
            points.push(point);
        }

        at_interval_start = !at_interval_start;
        prev = Some(point);
    }

    // Tail out to the window end.
    if last.at != window_end {
        points.push(fasting(last.at));
        points.push(fasting(window_end));
    }

    Timeline::from_points(points)
}
