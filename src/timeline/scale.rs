//! Timeline Scale Constants and Conversion
//!
//! The timeline maps seconds onto a fixed horizontal scale ("points").
//! The scale constant affects layout only, never semantics, so it is a
//! compile-time constant rather than runtime configuration.

use serde::{Deserialize, Serialize};

use crate::types::{Points, TimeSec};

/// Points per second of timeline (`K`)
pub const POINTS_PER_SECOND: f64 = 124.0;

/// Playhead lead in seconds applied when matching captions against the
/// current playback time. The playhead is rendered half a second ahead of
/// the content; this offset keeps caption visibility aligned with it.
pub const HALF_SECOND_OFFSET: TimeSec = 0.5;

/// UI tick frequency for playhead updates (throttles availability checks)
pub const UI_TICKS_PER_SECOND: u32 = 15;

/// Timescale used for precise seeks and export timing
pub const SEEK_TIMESCALE: u32 = 40_000;

/// Converts seconds to timeline points.
pub fn to_points(seconds: TimeSec) -> Points {
    seconds * POINTS_PER_SECOND
}

/// Converts timeline points to seconds. Exact inverse of [`to_points`].
pub fn to_seconds(points: Points) -> TimeSec {
    points / POINTS_PER_SECOND
}

/// Timeline geometry configuration.
///
/// `min_width` is the smallest usable caption width in points; `spacing` is
/// the minimum gap enforced between adjacent captions so hit-testing never
/// sees a zero-width boundary.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineConfig {
    pub min_width: Points,
    pub spacing: Points,
}

impl TimelineConfig {
    pub fn new(min_width: Points, spacing: Points) -> Self {
        Self { min_width, spacing }
    }

    /// Minimum room a neighbor must keep for itself plus the gap.
    pub fn min_width_with_spacing(&self) -> Points {
        self.min_width + self.spacing
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            min_width: POINTS_PER_SECOND / 2.0,
            spacing: 1.0,
        }
    }
}
