//! Media Library Interface
//!
//! Abstracts the platform photo/video library behind a future-returning
//! trait. The engine never talks to the platform media framework directly;
//! the UI shell supplies an implementation and the export pipeline consumes
//! playable-asset metadata through it.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::composition::VideoTransform;
use crate::error::CoreResult;
use crate::types::{format_min_sec, AssetId, Size2D, TimeSec};

// =============================================================================
// Library Models
// =============================================================================

/// A video in the platform library.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoAsset {
    pub id: AssetId,
    pub duration_sec: TimeSec,
}

impl VideoAsset {
    pub fn new(id: &str, duration_sec: TimeSec) -> Self {
        Self {
            id: id.to_string(),
            duration_sec,
        }
    }

    /// `mm:ss` duration label for pickers.
    pub fn formatted_duration(&self) -> String {
        format_min_sec(self.duration_sec)
    }
}

/// A library album containing at least one video.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub name: String,
    pub videos: Vec<VideoAsset>,
}

/// Decoded thumbnail pixels for a picker cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Thumbnail {
    pub size: Size2D,
    /// RGBA8, row-major
    pub pixels: Vec<u8>,
}

// =============================================================================
// Playable Source Metadata
// =============================================================================

/// Metadata of a playable source asset, resolved once per load.
///
/// `natural_size` is the stored (pre-rotation) frame size; combine it with
/// `transform` to obtain the true render size and orientation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMetadata {
    pub asset_id: AssetId,
    /// Location the decoder reads from
    pub uri: String,
    pub natural_size: Size2D,
    pub transform: VideoTransform,
    pub duration_sec: TimeSec,
    pub frame_rate: f64,
    pub has_video_track: bool,
    pub has_audio_track: bool,
}

// =============================================================================
// Media Library Trait
// =============================================================================

/// Platform media library capability.
///
/// All operations may fail with `PermissionDenied`, `AssetUnavailable` or
/// `AssetLoadFailed`; callers may retry the same operation, no partial
/// state is retained.
#[async_trait]
pub trait MediaLibrary: Send + Sync {
    /// Lists albums that contain at least one video.
    async fn list_albums(&self) -> CoreResult<Vec<Album>>;

    /// Loads a small thumbnail for a picker cell.
    async fn load_thumbnail(&self, asset: &VideoAsset) -> CoreResult<Thumbnail>;

    /// Resolves a playable handle's metadata for preview and export.
    async fn load_playable(&self, asset: &VideoAsset) -> CoreResult<SourceMetadata>;

    /// Persists an exported video file into the library.
    async fn save_video(&self, path: &Path) -> CoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatted_duration() {
        assert_eq!(VideoAsset::new("a", 75.0).formatted_duration(), "01:15");
    }

    #[test]
    fn test_source_metadata_serialization() {
        let meta = SourceMetadata {
            asset_id: "asset_1".to_string(),
            uri: "file:///tmp/video.mov".to_string(),
            natural_size: Size2D::new(1920.0, 1080.0),
            transform: VideoTransform::rotated_90(),
            duration_sec: 10.0,
            frame_rate: 30.0,
            has_video_track: true,
            has_audio_track: true,
        };
        let json = serde_json::to_string(&meta).unwrap();
        let parsed: SourceMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, meta);
    }
}
