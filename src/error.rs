//! Capreel Error Definitions
//!
//! Defines error types used throughout the engine.

use thiserror::Error;

use crate::types::{AssetId, ProjectId};

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Media Library Errors
    // =========================================================================
    #[error("Media library access denied: {0}")]
    PermissionDenied(String),

    #[error("Asset unavailable: {0}")]
    AssetUnavailable(AssetId),

    #[error("Failed to load asset: {0}")]
    AssetLoadFailed(String),

    // =========================================================================
    // Export Errors
    // =========================================================================
    #[error("Source has no video track")]
    NoVideoTrack,

    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    #[error("Failed to persist exported video: {0}")]
    PersistFailed(String),

    #[error("Export cancelled")]
    Cancelled,

    // =========================================================================
    // Project Store Errors
    // =========================================================================
    #[error("Project not found: {0}")]
    ProjectNotFound(ProjectId),

    #[error("Project record corrupted: {0}")]
    ProjectCorrupted(String),

    #[error("Failed to save project: {0}")]
    ProjectSaveFailed(String),

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Converts to a user-facing message for the UI shell.
    pub fn to_user_message(&self) -> String {
        self.to_string()
    }

    /// Returns true when re-invoking the failed operation may succeed.
    ///
    /// Library and asset errors keep no partial state, so the caller is free
    /// to retry them. Export failures are terminal for that export job.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied(_) | Self::AssetUnavailable(_) | Self::AssetLoadFailed(_)
        )
    }
}
