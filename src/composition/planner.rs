//! Composition Planner
//!
//! Converts the source's true size/orientation/duration and a caption
//! snapshot into a deterministic, ordered list of positioned, time-windowed
//! overlay layers at export resolution. The output is renderer-agnostic: a
//! layer is an opaque colored panel containing text, with a step opacity
//! schedule driving visibility.

use serde::{Deserialize, Serialize};

use crate::composition::geometry;
use crate::error::{CoreError, CoreResult};
use crate::media::SourceMetadata;
use crate::style::{self, StyleConfig, TextAlignment};
use crate::timeline::TimelineSnapshot;
use crate::types::{CaptionId, Color, RectPx, Size2D, TimeRange};

/// Keyframe boundary offset in normalized time. Small enough to read as a
/// crisp cut at any practical frame rate while keeping times monotonic.
const EPS: f64 = 1e-4;

// =============================================================================
// Composition Layers
// =============================================================================

/// One point of an opacity schedule, at a time normalized to `[0, 1]` of
/// the total video duration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpacityKeyframe {
    pub time: f64,
    pub opacity: f64,
}

impl OpacityKeyframe {
    fn new(time: f64, opacity: f64) -> Self {
        Self { time, opacity }
    }
}

/// A derived, time-windowed caption overlay in export pixel space.
/// Produced fresh per export, never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionLayer {
    pub caption_id: CaptionId,
    pub text: String,
    /// Panel rectangle, bottom-left origin
    pub frame: RectPx,
    pub text_color: Color,
    pub background_color: Color,
    pub font_name: String,
    /// Font size scaled to export resolution
    pub font_size: f64,
    pub alignment: TextAlignment,
    pub opacity_keyframes: Vec<OpacityKeyframe>,
}

/// Full composition plan for one export job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionPlan {
    /// True render size after orientation is applied
    pub render_size: Size2D,
    pub frame_rate: f64,
    pub duration_sec: f64,
    /// Layers in caption source order
    pub layers: Vec<CompositionLayer>,
}

// =============================================================================
// Planner
// =============================================================================

/// Fraction of the render width a caption panel may occupy.
const MAX_PANEL_WIDTH: f64 = 0.8;

/// Plans export overlay layers from a timeline snapshot.
pub struct CompositionPlanner {
    style: StyleConfig,
    /// Preview viewport the reference font size was authored against
    preview_viewport: Size2D,
}

impl CompositionPlanner {
    pub fn new(style: StyleConfig, preview_viewport: Size2D) -> Self {
        Self {
            style,
            preview_viewport,
        }
    }

    /// Builds the ordered layer list for the given snapshot and source.
    ///
    /// Deterministic: identical input produces an identical plan.
    pub fn plan(
        &self,
        snapshot: &TimelineSnapshot,
        source: &SourceMetadata,
    ) -> CoreResult<CompositionPlan> {
        if !source.has_video_track {
            return Err(CoreError::NoVideoTrack);
        }
        if source.duration_sec <= 0.0 {
            return Err(CoreError::UnsupportedFormat(
                "source has zero duration".to_string(),
            ));
        }

        let render = geometry::render_size(source.natural_size, &source.transform);
        let scale = geometry::font_scale(render, self.preview_viewport);
        let font_size = self.style.text.font_size * scale;

        let layers = snapshot
            .captions
            .iter()
            .map(|item| {
                let resolved = style::resolve(item, &self.style);
                let box_size = geometry::estimate_text_box(
                    &item.text,
                    font_size,
                    render.width * MAX_PANEL_WIDTH,
                );
                let frame = geometry::caption_frame(render, box_size, item.position);
                CompositionLayer {
                    caption_id: item.id.clone(),
                    text: item.text.clone(),
                    frame,
                    text_color: resolved.text_color,
                    background_color: resolved.background_color,
                    font_name: resolved.font_name,
                    font_size,
                    alignment: resolved.alignment,
                    opacity_keyframes: opacity_keyframes(
                        item.visible_range(),
                        source.duration_sec,
                    ),
                }
            })
            .collect();

        Ok(CompositionPlan {
            render_size: render,
            frame_rate: source.frame_rate,
            duration_sec: source.duration_sec,
            layers,
        })
    }
}

/// Step opacity schedule for a visibility window within a video of
/// `duration_sec`: 0 outside, 1 inside, with boundary keyframes just outside
/// the window so transitions are crisp cuts rather than linear ramps.
pub fn opacity_keyframes(window: TimeRange, duration_sec: f64) -> Vec<OpacityKeyframe> {
    let start = (window.start_sec / duration_sec).clamp(0.0, 1.0);
    let end = (window.end_sec / duration_sec).clamp(0.0, 1.0);

    let mut keyframes = Vec::with_capacity(6);
    if start > EPS {
        keyframes.push(OpacityKeyframe::new(0.0, 0.0));
        keyframes.push(OpacityKeyframe::new(start - EPS, 0.0));
        keyframes.push(OpacityKeyframe::new(start, 1.0));
    } else {
        keyframes.push(OpacityKeyframe::new(0.0, 1.0));
    }
    if end < 1.0 - EPS {
        keyframes.push(OpacityKeyframe::new(end, 1.0));
        keyframes.push(OpacityKeyframe::new(end + EPS, 0.0));
        keyframes.push(OpacityKeyframe::new(1.0, 0.0));
    } else {
        keyframes.push(OpacityKeyframe::new(1.0, 1.0));
    }
    keyframes
}
