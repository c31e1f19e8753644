//! Timeline Engine
//!
//! Owns the caption list and keeps the UI-facing fields derived from it —
//! add/remove availability, the active caption, spacer widths — consistent
//! with the playback position. Recomputation is eager and synchronous: it
//! runs after every playback tick and every mutation, never lazily, because
//! control affordances depend on it deterministically.
//!
//! The engine lives on a single logical owner (the UI context); callers
//! serialize access externally. Export takes an immutable snapshot, so
//! concurrent edits never corrupt an in-flight export.

use tracing::debug;

use crate::style::Capitalization;
use crate::timeline::caption::{CaptionEdge, CaptionItem};
use crate::timeline::list::CaptionList;
use crate::timeline::playback::PlaybackState;
use crate::timeline::scale::{self, TimelineConfig, POINTS_PER_SECOND};
use crate::types::{CaptionId, Point2D, Points, TimeSec};

/// Immutable copy of the timeline taken at export start.
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineSnapshot {
    pub captions: Vec<CaptionItem>,
    pub config: TimelineConfig,
    pub duration_sec: TimeSec,
}

/// Caption timeline engine.
pub struct TimelineEngine {
    config: TimelineConfig,
    captions: CaptionList,
    playback: PlaybackState,
    // Derived state, recomputed after every tick and mutation
    is_able_to_add_caption: bool,
    is_able_to_remove_caption: bool,
    active_caption_id: Option<CaptionId>,
    active_caption_text: String,
    // Transient: caption currently being drag-resized
    dragging: Option<CaptionId>,
}

impl TimelineEngine {
    pub fn new(duration_sec: TimeSec, config: TimelineConfig, items: Vec<CaptionItem>) -> Self {
        let mut engine = Self {
            config,
            captions: CaptionList::from_items(items),
            playback: PlaybackState::new(duration_sec),
            is_able_to_add_caption: false,
            is_able_to_remove_caption: false,
            active_caption_id: None,
            active_caption_text: String::new(),
            dragging: None,
        };
        engine.recompute();
        engine
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn config(&self) -> &TimelineConfig {
        &self.config
    }

    pub fn captions(&self) -> &[CaptionItem] {
        self.captions.items()
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn duration_points(&self) -> Points {
        scale::to_points(self.playback.duration_sec)
    }

    pub fn can_add_caption(&self) -> bool {
        self.is_able_to_add_caption
    }

    pub fn can_remove_caption(&self) -> bool {
        self.is_able_to_remove_caption
    }

    pub fn active_caption_id(&self) -> Option<&CaptionId> {
        self.active_caption_id.as_ref()
    }

    /// Text of the caption under the playhead, empty when none.
    pub fn active_caption_text(&self) -> &str {
        &self.active_caption_text
    }

    /// Caption currently being drag-resized, if any.
    pub fn dragging_caption(&self) -> Option<&CaptionId> {
        self.dragging.as_ref()
    }

    /// Width of the spacer rendered before caption `index`.
    pub fn spacer_width(&self, index: usize) -> Points {
        self.captions.spacer_width(index)
    }

    // =========================================================================
    // Playback updates
    // =========================================================================

    /// Applies a periodic playback-time update and recomputes derived state.
    ///
    /// Bounded and synchronous; must never block on I/O since it runs on
    /// every player tick.
    pub fn on_time_update(&mut self, current_time: TimeSec, is_playing: bool) {
        self.playback.current_time = current_time;
        self.playback.is_playing = is_playing;
        self.recompute();
    }

    pub fn set_auto_scrolling(&mut self, auto_scrolling: bool) {
        self.playback.is_auto_scrolling = auto_scrolling;
    }

    /// Converts a timeline scroll offset to a clamped seek time in seconds.
    ///
    /// The playhead is rendered half a timeline-second ahead of the scroll
    /// origin, so that offset is subtracted before converting. Seeking
    /// pauses playback.
    pub fn seek_to_point(&mut self, x: Points) -> TimeSec {
        let without_offset = x - POINTS_PER_SECOND / 2.0;
        let time = scale::to_seconds(without_offset).clamp(0.0, self.playback.duration_sec);
        self.playback.current_time = time;
        self.playback.is_playing = false;
        self.recompute();
        time
    }

    // =========================================================================
    // Caption mutation
    // =========================================================================

    /// Inserts a minimum-width caption at the current playback time.
    ///
    /// No-op returning `None` when add is not available. Pauses playback.
    pub fn add_caption(&mut self) -> Option<CaptionItem> {
        self.playback.is_playing = false;
        let added = self.captions.add(
            self.playback.current_time,
            self.duration_points(),
            &self.config,
        );
        if let Some(item) = &added {
            debug!(
                "Added caption {} at [{}, {}]",
                item.id, item.start_point, item.end_point
            );
        }
        self.recompute();
        added
    }

    /// Removes the caption under the playhead. No-op when there is none.
    pub fn remove_caption(&mut self) -> Option<CaptionItem> {
        self.playback.is_playing = false;
        let id = self.active_caption_id.clone()?;
        let removed = self.captions.remove(&id);
        self.recompute();
        removed
    }

    /// Drag-resizes one edge of a caption to timeline coordinate `x`.
    ///
    /// Marks the caption as the drag target until [`Self::end_drag`]; the
    /// drag edge is a call parameter, never stored on the item.
    pub fn resize_caption(&mut self, id: &str, edge: CaptionEdge, x: Points) {
        if !self.captions.resize(id, edge, x, self.duration_points(), &self.config) {
            return;
        }
        self.dragging = Some(id.to_string());
        self.recompute();
    }

    /// Clears the transient drag flag once the gesture ends.
    pub fn end_drag(&mut self) {
        self.dragging = None;
    }

    /// Replaces a caption's text.
    pub fn set_caption_text(&mut self, id: &str, text: &str) {
        if let Some(item) = self.captions.get_mut(id) {
            item.text = text.to_string();
        }
        self.recompute();
    }

    /// Sets or clears per-caption color overrides (stored `#AARRGGBB`).
    pub fn set_caption_colors(
        &mut self,
        id: &str,
        text_color_hex: Option<String>,
        background_color_hex: Option<String>,
    ) {
        if let Some(item) = self.captions.get_mut(id) {
            item.text_color_hex = text_color_hex;
            item.background_color_hex = background_color_hex;
        }
    }

    /// Sets or clears a caption's normalized on-video position.
    pub fn set_caption_position(&mut self, id: &str, position: Option<Point2D>) {
        if let Some(item) = self.captions.get_mut(id) {
            item.position = position.map(|p| Point2D::new(p.x.clamp(0.0, 1.0), p.y.clamp(0.0, 1.0)));
        }
    }

    /// Rewrites every caption's text with the given capitalization.
    pub fn apply_capitalization(&mut self, capitalization: Capitalization) {
        for index in 0..self.captions.len() {
            let id = self.captions.items()[index].id.clone();
            if let Some(item) = self.captions.get_mut(&id) {
                item.text = capitalization.apply(&item.text);
            }
        }
        self.recompute();
    }

    // =========================================================================
    // Export hand-off
    // =========================================================================

    /// Copy-on-start snapshot handed to the export worker.
    pub fn snapshot(&self) -> TimelineSnapshot {
        TimelineSnapshot {
            captions: self.captions.items().to_vec(),
            config: self.config,
            duration_sec: self.playback.duration_sec,
        }
    }

    // =========================================================================
    // Derived state
    // =========================================================================

    fn recompute(&mut self) {
        let availability = self.captions.availability_at(
            self.playback.current_time,
            self.duration_points(),
            &self.config,
        );
        self.is_able_to_add_caption = availability.can_add;
        self.is_able_to_remove_caption = availability.can_remove;
        self.active_caption_id = availability.active;
        self.active_caption_text = self
            .captions
            .active_at(self.playback.current_time)
            .map(|item| item.text.clone())
            .unwrap_or_default();
    }
}
