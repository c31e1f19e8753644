//! Caption List
//!
//! Ordered collection of caption intervals, sorted by start point, with the
//! non-overlap invariant maintained locally by every edit: an edit touches at
//! most the immediate neighbor, so no global re-validation pass exists.

use serde::{Deserialize, Serialize};

use crate::timeline::caption::{CaptionEdge, CaptionItem};
use crate::timeline::scale::{self, TimelineConfig, HALF_SECOND_OFFSET};
use crate::types::{CaptionId, Points, TimeSec};

/// Result of the availability scan for a given playback time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Availability {
    /// A minimum-width caption can be inserted at the playhead
    pub can_add: bool,
    /// The playhead is inside an existing caption, which can be removed
    pub can_remove: bool,
    /// The caption containing the playhead, if any
    pub active: Option<CaptionId>,
}

/// Sorted caption intervals within `[0, duration_points]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptionList {
    items: Vec<CaptionItem>,
}

impl CaptionList {
    pub fn new() -> Self {
        Self { items: vec![] }
    }

    /// Builds a list from persisted items, restoring the sort order.
    pub fn from_items(mut items: Vec<CaptionItem>) -> Self {
        items.sort_by(|a, b| a.start_point.total_cmp(&b.start_point));
        Self { items }
    }

    pub fn items(&self) -> &[CaptionItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CaptionItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut CaptionItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    fn index_of(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    // =========================================================================
    // Availability & Active Caption
    // =========================================================================

    /// Scans the sorted list for the playhead state at time `t`.
    ///
    /// `t` is offset by the fixed half-second playhead lead. The scan stops
    /// at the first caption that either contains the playhead or starts
    /// after it; past the last caption, the remaining room to the timeline
    /// end decides whether add is allowed.
    pub fn availability_at(
        &self,
        t: TimeSec,
        duration_points: Points,
        config: &TimelineConfig,
    ) -> Availability {
        let playhead = scale::to_points(t + HALF_SECOND_OFFSET);

        for item in &self.items {
            if item.contains_point(playhead) {
                return Availability {
                    can_add: false,
                    can_remove: true,
                    active: Some(item.id.clone()),
                };
            }
            if item.start_point > playhead {
                return Availability {
                    can_add: item.start_point - playhead > config.min_width,
                    can_remove: false,
                    active: None,
                };
            }
        }

        Availability {
            can_add: duration_points - playhead > config.min_width,
            can_remove: false,
            active: None,
        }
    }

    /// First caption whose interval contains the offset playback time.
    pub fn active_at(&self, t: TimeSec) -> Option<&CaptionItem> {
        let playhead = scale::to_points(t + HALF_SECOND_OFFSET);
        self.items.iter().find(|item| item.contains_point(playhead))
    }

    /// True iff a minimum-width caption can be inserted at time `t`.
    pub fn can_add_at(&self, t: TimeSec, duration_points: Points, config: &TimelineConfig) -> bool {
        self.availability_at(t, duration_points, config).can_add
    }

    /// True iff a caption interval contains the offset time `t`.
    pub fn can_remove_at(
        &self,
        t: TimeSec,
        duration_points: Points,
        config: &TimelineConfig,
    ) -> bool {
        self.availability_at(t, duration_points, config).can_remove
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Inserts a minimum-width caption at time `t`, keeping the sort order.
    ///
    /// A no-op returning `None` when insertion would overlap an existing
    /// caption or run past the timeline end; adding is gated by the same
    /// availability check that drives the UI controls.
    pub fn add(
        &mut self,
        t: TimeSec,
        duration_points: Points,
        config: &TimelineConfig,
    ) -> Option<CaptionItem> {
        if !self.can_add_at(t, duration_points, config) {
            return None;
        }

        let start = scale::to_points(t + HALF_SECOND_OFFSET);
        let item = CaptionItem::new(start, start + config.min_width);
        let inserted = item.clone();

        match self
            .items
            .iter()
            .position(|existing| existing.start_point > start)
        {
            Some(index) => self.items.insert(index, item),
            None => self.items.push(item),
        }

        Some(inserted)
    }

    /// Removes a caption by identity. No-op when absent.
    pub fn remove(&mut self, id: &str) -> Option<CaptionItem> {
        let index = self.index_of(id)?;
        Some(self.items.remove(index))
    }

    /// Drag-resizes one edge of a caption to the timeline coordinate `x`.
    ///
    /// Collision with the immediate neighbor is resolved locally: when the
    /// neighbor has room above its minimum width it is shrunk to `x` minus
    /// the gap, otherwise the dragged edge snaps against the neighbor's
    /// boundary. The non-overlap invariant therefore holds after every call.
    pub fn resize(
        &mut self,
        id: &str,
        edge: CaptionEdge,
        x: Points,
        duration_points: Points,
        config: &TimelineConfig,
    ) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        match edge {
            CaptionEdge::Left => self.set_left_edge(index, x, config),
            CaptionEdge::Right => self.set_right_edge(index, x, duration_points, config),
        }
        true
    }

    fn set_left_edge(&mut self, index: usize, x: Points, config: &TimelineConfig) {
        if index > 0 && x < self.items[index - 1].end_point {
            let prev = &self.items[index - 1];
            if x < prev.start_point + config.min_width_with_spacing() {
                // Not enough room to shrink the neighbor further: push against it
                self.items[index].start_point = prev.end_point + config.spacing;
            } else {
                self.items[index].start_point = x;
                self.items[index - 1].end_point = x - config.spacing;
            }
        } else {
            // A restored caption may be narrower than the configured minimum;
            // the clamp range must stay valid for it too.
            let max_start = (self.items[index].end_point - config.min_width).max(0.0);
            self.items[index].start_point = x.clamp(0.0, max_start);
        }
    }

    fn set_right_edge(
        &mut self,
        index: usize,
        x: Points,
        duration_points: Points,
        config: &TimelineConfig,
    ) {
        if index < self.items.len() - 1 && x > self.items[index + 1].start_point {
            let next = &self.items[index + 1];
            if x > next.end_point - config.min_width_with_spacing() {
                self.items[index].end_point = next.start_point - config.spacing;
            } else {
                self.items[index].end_point = x;
                self.items[index + 1].start_point = x + config.spacing;
            }
        } else {
            let min_end = self.items[index].start_point + config.min_width;
            self.items[index].end_point = x.clamp(min_end, duration_points.max(min_end));
        }
    }

    // =========================================================================
    // Layout helpers
    // =========================================================================

    /// Width of the spacer rendered before item `index` (0 when out of range).
    pub fn spacer_width(&self, index: usize) -> Points {
        if self.items.is_empty() || index >= self.items.len() {
            return 0.0;
        }
        if index == 0 {
            return self.items[0].start_point.max(0.0);
        }
        (self.items[index].start_point - self.items[index - 1].end_point).max(0.0)
    }
}
