//! Composition Geometry
//!
//! Orientation detection from the source's preferred transform, render-size
//! derivation, and the deterministic text-box estimate used to place caption
//! panels in export pixel space.
//!
//! Layer frames use a bottom-left origin, matching common media-composition
//! layer spaces; normalized caption positions arrive top-left (screen
//! coordinates) and are flipped during conversion.

use serde::{Deserialize, Serialize};

use crate::types::{Point2D, RectPx, Size2D};

// =============================================================================
// Orientation
// =============================================================================

/// Source video orientation derived from the preferred transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Orientation {
    Up,
    Down,
    /// Rotated 90° counter-clockwise (portrait)
    Left,
    /// Rotated 90° clockwise (portrait)
    Right,
}

impl Orientation {
    pub fn is_portrait(&self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }
}

/// 2x2 rotation part of the source's preferred transform.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VideoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl VideoTransform {
    pub fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
        }
    }

    /// 90° clockwise rotation (portrait recorded on a phone)
    pub fn rotated_90() -> Self {
        Self {
            a: 0.0,
            b: 1.0,
            c: -1.0,
            d: 0.0,
        }
    }

    /// Classifies the transform into one of the four supported orientations.
    /// Anything else is treated as upright.
    pub fn orientation(&self) -> Orientation {
        let (a, b, c, d) = (self.a, self.b, self.c, self.d);
        if a == 0.0 && b == 1.0 && c == -1.0 && d == 0.0 {
            Orientation::Right
        } else if a == 0.0 && b == -1.0 && c == 1.0 && d == 0.0 {
            Orientation::Left
        } else if a == -1.0 && b == 0.0 && c == 0.0 && d == -1.0 {
            Orientation::Down
        } else {
            Orientation::Up
        }
    }
}

impl Default for VideoTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// True render size of the source: portrait sources store their natural
/// size pre-rotation, so width and height swap.
pub fn render_size(natural_size: Size2D, transform: &VideoTransform) -> Size2D {
    if transform.orientation().is_portrait() {
        Size2D::new(natural_size.height, natural_size.width)
    } else {
        natural_size
    }
}

/// Font scale factor keeping preview and export visually consistent:
/// the ratio of the longest render dimension to the longest
/// preview-viewport dimension.
pub fn font_scale(render: Size2D, preview_viewport: Size2D) -> f64 {
    let preview_max = preview_viewport.max_dimension();
    if preview_max <= 0.0 {
        return 1.0;
    }
    render.max_dimension() / preview_max
}

// =============================================================================
// Text Metrics
// =============================================================================

/// Average glyph advance as a fraction of the font size. A deterministic
/// stand-in for real glyph metrics, which belong to the renderer.
const AVG_GLYPH_ADVANCE: f64 = 0.52;

/// Line height as a fraction of the font size.
const LINE_HEIGHT: f64 = 1.2;

/// Horizontal panel padding as a fraction of the font size, each side.
const PANEL_PADDING: f64 = 0.4;

/// Estimates the wrapped bounding box of `text` at `font_size`, greedy
/// word-wrapped to `max_width` pixels. Deterministic for identical input.
pub fn estimate_text_box(text: &str, font_size: f64, max_width: f64) -> Size2D {
    let advance = font_size * AVG_GLYPH_ADVANCE;
    let space = advance;
    let padding = font_size * PANEL_PADDING;

    let mut lines = 1usize;
    let mut line_width: f64 = 0.0;
    let mut widest: f64 = 0.0;

    for word in text.split_whitespace() {
        let word_width = word.chars().count() as f64 * advance;
        let extended = if line_width == 0.0 {
            word_width
        } else {
            line_width + space + word_width
        };
        if extended > max_width && line_width > 0.0 {
            widest = widest.max(line_width);
            lines += 1;
            line_width = word_width;
        } else {
            line_width = extended;
        }
    }
    widest = widest.max(line_width);

    Size2D::new(
        (widest + 2.0 * padding).min(max_width),
        lines as f64 * font_size * LINE_HEIGHT + 2.0 * padding,
    )
}

// =============================================================================
// Caption Frames
// =============================================================================

/// Fraction of the render height kept as a margin below the default caption.
const BOTTOM_MARGIN: f64 = 0.10;

/// Positions a caption box of `box_size` inside `render` pixel space.
///
/// With a normalized position (top-left screen coordinates of the box
/// center) the vertical axis is flipped into the bottom-left layer space
/// and the box is clamped fully inside the frame. Without one, the box is
/// horizontally centered with a 10% bottom margin.
pub fn caption_frame(
    render: Size2D,
    box_size: Size2D,
    position: Option<Point2D>,
) -> RectPx {
    let bounds = RectPx::new(0.0, 0.0, render.width, render.height);
    match position {
        Some(p) => {
            let center_x = p.x * render.width;
            // Flip: normalized y grows downward, layer space grows upward
            let center_y = (1.0 - p.y) * render.height;
            RectPx::new(
                center_x - box_size.width / 2.0,
                center_y - box_size.height / 2.0,
                box_size.width,
                box_size.height,
            )
            .clamped_within(&bounds)
        }
        None => RectPx::new(
            (render.width - box_size.width) / 2.0,
            render.height * BOTTOM_MARGIN,
            box_size.width,
            box_size.height,
        )
        .clamped_within(&bounds),
    }
}
