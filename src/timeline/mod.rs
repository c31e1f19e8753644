//! Caption Timeline Module
//!
//! Converts between time and timeline points, stores caption intervals with
//! the non-overlap invariant, and keeps playback-derived UI state consistent.

mod caption;
mod engine;
mod list;
mod playback;
pub mod scale;

pub use caption::{CaptionEdge, CaptionItem};
pub use engine::{TimelineEngine, TimelineSnapshot};
pub use list::{Availability, CaptionList};
pub use playback::PlaybackState;
pub use scale::{
    to_points, to_seconds, TimelineConfig, HALF_SECOND_OFFSET, POINTS_PER_SECOND,
    SEEK_TIMESCALE, UI_TICKS_PER_SECOND,
};
