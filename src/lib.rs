//! capreel - caption timeline and export engine for short-form video.
//!
//! The crate is organized around three stages:
//!
//! - [`timeline`]: the interactive caption track. Time maps to a point scale,
//!   captions are kept sorted and non-overlapping, and edge drags resolve
//!   collisions against neighbors.
//! - [`composition`]: turns a timeline snapshot plus source metadata into a
//!   renderer-agnostic plan of text layers with step opacity keyframes.
//! - [`export`]: drives an encoder over a composition plan with progress
//!   reporting, cancellation, and persistence into the media library.
//!
//! [`project`] persists caption work per asset, and [`media`] abstracts the
//! device library behind async traits so the pipeline stays testable.

pub mod composition;
pub mod error;
pub mod export;
pub mod media;
pub mod project;
pub mod style;
pub mod timeline;
pub mod types;

pub use error::{CoreError, CoreResult};
pub use timeline::{
    CaptionEdge, CaptionItem, CaptionList, TimelineConfig, TimelineEngine, TimelineSnapshot,
    POINTS_PER_SECOND,
};
