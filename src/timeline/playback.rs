//! Playback State
//!
//! Snapshot of the preview player the timeline engine reads on every tick.
//! The engine never owns the underlying player; the playback component
//! pushes updates into the engine at a fixed tick rate.

use serde::{Deserialize, Serialize};

use crate::types::{format_min_sec, TimeSec};

/// Current playback position and flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub current_time: TimeSec,
    pub is_playing: bool,
    pub is_auto_scrolling: bool,
    pub duration_sec: TimeSec,
}

impl PlaybackState {
    pub fn new(duration_sec: TimeSec) -> Self {
        Self {
            duration_sec,
            ..Self::default()
        }
    }

    /// `mm:ss / mm:ss` readout shown next to the timeline.
    pub fn time_description(&self) -> String {
        format!(
            "{} / {}",
            format_min_sec(self.current_time),
            format_min_sec(self.duration_sec)
        )
    }
}
