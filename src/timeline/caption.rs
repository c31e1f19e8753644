//! Caption Item Model

use serde::{Deserialize, Serialize};

use crate::timeline::scale::{self, TimelineConfig};
use crate::types::{CaptionId, Point2D, Points, TimeRange, TimeSec};

/// Which edge of a caption a drag gesture is resizing.
///
/// Drag intent is passed into the resize call rather than stored on the
/// item, so a finished drag cannot leave a stale flag behind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptionEdge {
    Left,
    Right,
}

/// A timed caption card on the timeline.
///
/// `start_point`/`end_point` are horizontal-scale units (points); the list
/// that owns the item maintains `end_point > start_point` and non-overlap
/// with neighbors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptionItem {
    pub id: CaptionId,
    pub text: String,
    pub start_point: Points,
    pub end_point: Points,
    /// Per-caption text color override (`#AARRGGBB`), `None` = project default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_color_hex: Option<String>,
    /// Per-caption background color override, `None` = project default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color_hex: Option<String>,
    /// Normalized center position within the video frame (0.0..=1.0).
    /// `None` = default bottom-center placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Point2D>,
}

impl CaptionItem {
    /// Creates an empty caption spanning `[start_point, end_point]`.
    pub fn new(start_point: Points, end_point: Points) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            text: String::new(),
            start_point,
            end_point,
            text_color_hex: None,
            background_color_hex: None,
            position: None,
        }
    }

    /// Creates a caption with text, for tests and import paths.
    pub fn with_text(start_point: Points, end_point: Points, text: &str) -> Self {
        let mut item = Self::new(start_point, end_point);
        item.text = text.to_string();
        item
    }

    /// Rendered width in points, floored at the configured minimum.
    pub fn width(&self, config: &TimelineConfig) -> Points {
        (self.end_point - self.start_point).max(config.min_width)
    }

    /// Start of the caption's visibility window in seconds.
    pub fn start_sec(&self) -> TimeSec {
        scale::to_seconds(self.start_point)
    }

    /// End of the caption's visibility window in seconds.
    pub fn end_sec(&self) -> TimeSec {
        scale::to_seconds(self.end_point)
    }

    /// The caption's visibility window in seconds.
    pub fn visible_range(&self) -> TimeRange {
        TimeRange::new(self.start_sec(), self.end_sec())
    }

    /// True when the point interval contains `point`.
    pub fn contains_point(&self, point: Points) -> bool {
        self.start_point < self.end_point
            && point >= self.start_point
            && point <= self.end_point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_creation() {
        let item = CaptionItem::new(0.0, 124.0);
        assert!(!item.id.is_empty());
        assert!(item.text.is_empty());
        assert!(item.text_color_hex.is_none());
        assert!(item.position.is_none());
    }

    #[test]
    fn test_width_floors_at_min_width() {
        let config = TimelineConfig::default();
        let narrow = CaptionItem::new(0.0, 10.0);
        assert_eq!(narrow.width(&config), config.min_width);

        let wide = CaptionItem::new(0.0, 200.0);
        assert_eq!(wide.width(&config), 200.0);
    }

    #[test]
    fn test_seconds_projection() {
        let item = CaptionItem::new(124.0, 372.0);
        assert_eq!(item.start_sec(), 1.0);
        assert_eq!(item.end_sec(), 3.0);

        let range = item.visible_range();
        assert_eq!(range.start_sec, 1.0);
        assert_eq!(range.end_sec, 3.0);
        assert_eq!(range.duration(), 2.0);
        assert!(range.contains(2.0));
    }

    #[test]
    fn test_contains_point() {
        let item = CaptionItem::new(100.0, 200.0);
        assert!(item.contains_point(100.0));
        assert!(item.contains_point(150.0));
        assert!(item.contains_point(200.0));
        assert!(!item.contains_point(99.9));

        // Degenerate interval never matches
        let empty = CaptionItem::new(100.0, 100.0);
        assert!(!empty.contains_point(100.0));
    }

    #[test]
    fn test_serialization_skips_absent_overrides() {
        let item = CaptionItem::with_text(0.0, 124.0, "hello");
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("textColorHex"));
        assert!(!json.contains("position"));

        let parsed: CaptionItem = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, item);
    }
}
