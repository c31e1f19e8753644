//! Export Presets
//!
//! Resolution/bitrate presets for the encode step, chosen by
//! nearest-supported render size: the smallest preset ceiling that contains
//! the source resolution, falling back to a generic highest-quality preset
//! above the 4K platform ceiling.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::Size2D;

/// Export preset tiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportPreset {
    /// 1280x720 ceiling
    Hd720,
    /// 1920x1080 ceiling
    FullHd1080,
    /// 3840x2160 platform ceiling
    Uhd4k,
    /// Generic high-quality fallback, no resize
    HighestQuality,
}

impl ExportPreset {
    /// Smallest preset whose ceiling contains the render size.
    pub fn nearest_for(render_size: Size2D) -> Self {
        let max_dim = render_size.max_dimension();
        if max_dim <= 1280.0 {
            Self::Hd720
        } else if max_dim <= 1920.0 {
            Self::FullHd1080
        } else if max_dim <= 3840.0 {
            Self::Uhd4k
        } else {
            Self::HighestQuality
        }
    }

    /// Target video bitrate for the tier.
    pub fn video_bitrate(&self) -> &'static str {
        match self {
            Self::Hd720 => "5M",
            Self::FullHd1080 => "8M",
            Self::Uhd4k => "35M",
            Self::HighestQuality => "50M",
        }
    }
}

/// Settings handed to the encode step for one export job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    pub preset: ExportPreset,
    /// Output container path (`.mov`)
    pub output_path: PathBuf,
    /// Output frame size: the true render size, never upscaled
    pub width: u32,
    pub height: u32,
    pub video_bitrate: String,
    /// Original audio passes through unmodified
    pub audio_passthrough: bool,
}

impl ExportSettings {
    /// Builds settings for a render size, picking the nearest preset.
    pub fn for_render_size(render_size: Size2D, output_path: PathBuf) -> Self {
        let preset = ExportPreset::nearest_for(render_size);
        Self {
            preset,
            output_path,
            width: render_size.width.round() as u32,
            height: render_size.height.round() as u32,
            video_bitrate: preset.video_bitrate().to_string(),
            audio_passthrough: true,
        }
    }
}
