//! Export Module
//!
//! Turns a caption snapshot plus a source asset into a rendered `.mov`
//! with captions burned in, persisted to the platform media library.

mod pipeline;
mod presets;

pub use pipeline::{
    CompositionEncoder, ExportJob, ExportOutput, ExportPipeline, ExportProgress, ExportState,
};
pub use presets::{ExportPreset, ExportSettings};
