//! Caption Styling
//!
//! Project-level style defaults, per-caption overrides, and the resolver
//! that merges them into the final render style. Defaults are an explicit
//! value passed into the engine and planner constructors — there is no
//! process-wide settings singleton.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::timeline::CaptionItem;
use crate::types::Color;

// =============================================================================
// Text Style
// =============================================================================

/// Horizontal alignment of caption text
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextAlignment {
    Left,
    #[default]
    Center,
    Right,
}

/// Project-default text style (font, size, color, alignment)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextStyle {
    pub font_name: String,
    /// Reference font size in preview points; the planner rescales it to
    /// export resolution.
    pub font_size: f64,
    pub color: Color,
    pub alignment: TextAlignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_name: "Helvetica".to_string(),
            font_size: 24.0,
            color: Color::white(),
            alignment: TextAlignment::Center,
        }
    }
}

// =============================================================================
// Style Config
// =============================================================================

/// Project-scoped style configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    pub text: TextStyle,
    pub background_color: Color,
    pub active_word_color: Color,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            text: TextStyle::default(),
            // Semi-transparent black panel behind the text
            background_color: Color::rgba(0.0, 0.0, 0.0, 0.4),
            active_word_color: Color::rgb(1.0, 0.9, 0.2),
        }
    }
}

// =============================================================================
// Render Style Resolution
// =============================================================================

/// Final style for rendering one caption at one instant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderStyle {
    pub font_name: String,
    pub font_size: f64,
    pub alignment: TextAlignment,
    pub text_color: Color,
    pub background_color: Color,
    pub active_word_color: Color,
}

/// Merges a caption's color overrides with the project defaults.
///
/// Only text and background colors may be overridden per caption; font,
/// size and alignment always come from the defaults. An unparseable stored
/// color is logged and treated as absent, never surfaced as an error.
pub fn resolve(item: &CaptionItem, defaults: &StyleConfig) -> RenderStyle {
    let text_color = item
        .text_color_hex
        .as_deref()
        .and_then(Color::from_stored_hex)
        .unwrap_or(defaults.text.color);
    let background_color = item
        .background_color_hex
        .as_deref()
        .and_then(Color::from_stored_hex)
        .unwrap_or(defaults.background_color);

    RenderStyle {
        font_name: defaults.text.font_name.clone(),
        font_size: defaults.text.font_size,
        alignment: defaults.text.alignment,
        text_color,
        background_color,
        active_word_color: defaults.active_word_color,
    }
}

// =============================================================================
// Capitalization
// =============================================================================

/// Whole-timeline text capitalization applied from the editor toolbar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Capitalization {
    Upper,
    Lower,
    /// First letter of every word uppercased, the rest lowercased
    Title,
}

impl Capitalization {
    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Upper => text.to_uppercase(),
            Self::Lower => text.to_lowercase(),
            Self::Title => text
                .split(' ')
                .map(|word| {
                    let mut chars = word.chars();
                    match chars.next() {
                        Some(first) => {
                            first.to_uppercase().collect::<String>()
                                + &chars.as_str().to_lowercase()
                        }
                        None => String::new(),
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Detects which capitalization, if any, the text already uses.
    pub fn detect(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        if text == text.to_uppercase() {
            Some(Self::Upper)
        } else if text == text.to_lowercase() {
            Some(Self::Lower)
        } else if text == Self::Title.apply(text) {
            Some(Self::Title)
        } else {
            None
        }
    }
}

/// Logs a one-line warning when a persisted style override cannot be used.
///
/// Kept separate so callers validating whole projects can report without
/// resolving.
pub fn validate_stored_color(hex: &str) -> bool {
    let valid = Color::try_from_argb_hex(hex).is_some();
    if !valid {
        warn!("Stored caption color '{}' is not 6- or 8-digit hex", hex);
    }
    valid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with_overrides(
        text_color: Option<&str>,
        background: Option<&str>,
    ) -> CaptionItem {
        let mut item = CaptionItem::new(0.0, 124.0);
        item.text_color_hex = text_color.map(String::from);
        item.background_color_hex = background.map(String::from);
        item
    }

    #[test]
    fn test_resolve_defaults_when_no_overrides() {
        let defaults = StyleConfig::default();
        let style = resolve(&item_with_overrides(None, None), &defaults);

        assert_eq!(style.text_color, defaults.text.color);
        assert_eq!(style.background_color, defaults.background_color);
        assert_eq!(style.font_name, defaults.text.font_name);
        assert_eq!(style.alignment, TextAlignment::Center);
    }

    #[test]
    fn test_resolve_per_caption_colors_win() {
        let defaults = StyleConfig::default();
        let style = resolve(
            &item_with_overrides(Some("#FFFF0000"), Some("#8000FF00")),
            &defaults,
        );

        assert_eq!(style.text_color, Color::rgb(1.0, 0.0, 0.0));
        assert!((style.background_color.a - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(style.background_color.g, 1.0);
        // Font and alignment are never overridden per caption
        assert_eq!(style.font_name, defaults.text.font_name);
        assert_eq!(style.font_size, defaults.text.font_size);
    }

    #[test]
    fn test_resolve_invalid_override_falls_back() {
        let defaults = StyleConfig::default();
        let style = resolve(
            &item_with_overrides(Some("not-a-color"), Some("#12345")),
            &defaults,
        );

        assert_eq!(style.text_color, defaults.text.color);
        assert_eq!(style.background_color, defaults.background_color);
    }

    #[test]
    fn test_capitalization_apply() {
        assert_eq!(Capitalization::Upper.apply("hello world"), "HELLO WORLD");
        assert_eq!(Capitalization::Lower.apply("HeLLo"), "hello");
        assert_eq!(Capitalization::Title.apply("hello WORLD again"), "Hello World Again");
        assert_eq!(Capitalization::Title.apply(""), "");
    }

    #[test]
    fn test_capitalization_detect() {
        assert_eq!(Capitalization::detect("HELLO"), Some(Capitalization::Upper));
        assert_eq!(Capitalization::detect("hello"), Some(Capitalization::Lower));
        assert_eq!(Capitalization::detect("Hello World"), Some(Capitalization::Title));
        assert_eq!(Capitalization::detect("hELLo"), None);
        assert_eq!(Capitalization::detect("  "), None);
    }

    #[test]
    fn test_validate_stored_color() {
        assert!(validate_stored_color("#AABBCCDD"));
        assert!(validate_stored_color("112233"));
        assert!(!validate_stored_color("#ABC"));
    }

    #[test]
    fn test_style_config_serialization_round_trip() {
        let config = StyleConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: StyleConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
