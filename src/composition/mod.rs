//! Composition Module
//!
//! Derives the export overlay plan from the caption timeline: orientation
//! and render-size math, caption panel placement, and time-windowed opacity
//! schedules, independent of any specific rendering technology.

mod geometry;
mod planner;

pub use geometry::{
    caption_frame, estimate_text_box, font_scale, render_size, Orientation, VideoTransform,
};
pub use planner::{
    opacity_keyframes, CompositionLayer, CompositionPlan, CompositionPlanner, OpacityKeyframe,
};
