//! Capreel Core Type Definitions
//!
//! Defines fundamental types used throughout the engine.

use serde::{Deserialize, Serialize};
use tracing::warn;

// =============================================================================
// ID Types
// =============================================================================

/// Caption unique identifier (ULID)
pub type CaptionId = String;

/// Media asset unique identifier (library-scoped)
pub type AssetId = String;

/// Project unique identifier (ULID)
pub type ProjectId = String;

// =============================================================================
// Time Types
// =============================================================================

/// Time in seconds (floating point)
pub type TimeSec = f64;

/// Horizontal timeline distance in points
pub type Points = f64;

// =============================================================================
// Spatial Types
// =============================================================================

/// 2D coordinates (normalized or pixel)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns center coordinates
    pub fn center() -> Self {
        Self { x: 0.5, y: 0.5 }
    }
}

impl Default for Point2D {
    fn default() -> Self {
        Self::center()
    }
}

/// 2D pixel size
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f64,
    pub height: f64,
}

impl Size2D {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Longest dimension, used for font scale factors
    pub fn max_dimension(&self) -> f64 {
        self.width.max(self.height)
    }
}

/// Axis-aligned rectangle in export pixel space
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RectPx {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RectPx {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn mid_x(&self) -> f64 {
        self.x + self.width / 2.0
    }

    /// Moves the rectangle the minimum distance needed to fit inside `bounds`.
    ///
    /// A rectangle larger than the bounds is pinned to the bounds origin.
    pub fn clamped_within(&self, bounds: &RectPx) -> RectPx {
        let x = self
            .x
            .min(bounds.max_x() - self.width)
            .max(bounds.x);
        let y = self
            .y
            .min(bounds.max_y() - self.height)
            .max(bounds.y);
        RectPx::new(x, y, self.width, self.height)
    }
}

// =============================================================================
// Color
// =============================================================================

/// Color (RGBA, components in 0.0 ~ 1.0)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self {
            r: r.clamp(0.0, 1.0),
            g: g.clamp(0.0, 1.0),
            b: b.clamp(0.0, 1.0),
            a: a.clamp(0.0, 1.0),
        }
    }

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Parses a stored hex color string.
    ///
    /// 8 hex digits are `AARRGGBB` (the persisted per-caption format),
    /// 6 hex digits are `RRGGBB` with full opacity. Anything else is `None`.
    pub fn try_from_argb_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 && hex.len() != 8 {
            return None;
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f64 / 255.0);

        if hex.len() == 8 {
            let a = channel(&hex[0..2])?;
            let r = channel(&hex[2..4])?;
            let g = channel(&hex[4..6])?;
            let b = channel(&hex[6..8])?;
            Some(Self::rgba(r, g, b, a))
        } else {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            Some(Self::rgb(r, g, b))
        }
    }

    /// Parses a stored hex color, logging and returning `None` on bad input.
    ///
    /// Invalid stored colors are never surfaced to the caller as errors;
    /// styling falls back to the project default instead.
    pub fn from_stored_hex(hex: &str) -> Option<Self> {
        let parsed = Self::try_from_argb_hex(hex);
        if parsed.is_none() {
            warn!("Ignoring invalid stored color '{}'", hex);
        }
        parsed
    }

    /// Formats as the canonical stored form, `#AARRGGBB`.
    pub fn to_argb_hex(&self) -> String {
        let to_byte = |v: f64| (v * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}{:02X}",
            to_byte(self.a),
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::white()
    }
}

// =============================================================================
// Time Range
// =============================================================================

/// Closed time range in seconds
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub start_sec: TimeSec,
    pub end_sec: TimeSec,
}

impl TimeRange {
    pub fn new(start_sec: TimeSec, end_sec: TimeSec) -> Self {
        if start_sec > end_sec {
            warn!(
                "TimeRange created with start > end ({} > {}), swapping",
                start_sec, end_sec
            );
            return Self {
                start_sec: end_sec,
                end_sec: start_sec,
            };
        }
        Self { start_sec, end_sec }
    }

    pub fn duration(&self) -> TimeSec {
        self.end_sec - self.start_sec
    }

    pub fn contains(&self, time: TimeSec) -> bool {
        time >= self.start_sec && time <= self.end_sec
    }
}

// =============================================================================
// Formatting
// =============================================================================

/// Formats seconds as `mm:ss` for timeline labels and duration readouts.
pub fn format_min_sec(seconds: TimeSec) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}
