//! Scroll snap selector: snaps a continuous list offset to whole items.

use crate::ensure_positive;
use crate::error::ConfigError;
use crate::gesture::Millis;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ITEM_EXTENT: f64 = 50.0;
pub const DEFAULT_VISIBLE_ITEMS: usize = 5;
/// How long a programmatic snap blocks further snap requests.
pub const SNAP_COOLDOWN: Millis = Millis(100);
/// Items this many extents (or more) from the center are fully de-emphasized.
pub const MAX_WEIGHT: f64 = 2.0;

// Emphasis at weight 0, 1 and 2.
const SCALE_STOPS: [f64; 3] = [1.0, 0.9, 0.8];
const OPACITY_STOPS: [f64; 3] = [1.0, 0.5, 0.3];
const TRANSLATE_STOPS: [f64; 3] = [0.0, 10.0, 20.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub item_extent: f64,
    pub visible_items: usize,
    pub snap_cooldown: Millis,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            item_extent: DEFAULT_ITEM_EXTENT,
            visible_items: DEFAULT_VISIBLE_ITEMS,
            snap_cooldown: SNAP_COOLDOWN,
        }
    }
}

impl ScrollConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive!(self, item_extent);
        if self.visible_items == 0 {
            return Err(ConfigError::NoVisibleItems);
        }
        Ok(())
    }

    pub fn viewport_extent(&self) -> f64 {
        self.item_extent * self.visible_items as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollPhase {
    Idle,
    Dragging,
    Snapping,
}

/// Visual weighting of one item relative to the viewport center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemEmphasis {
    pub scale: f64,
    pub opacity: f64,
    pub translate_x: f64,
}

/// What the host should do after a snap decision.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SnapOutcome {
    /// Offset to scroll to, animated.
    pub scroll_to: Option<f64>,
    /// Newly selected item, if the selection changed.
    pub changed: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct ScrollSnapSelector {
    config: ScrollConfig,
    item_count: usize,
    offset: f64,
    selected: Option<usize>,
    dragging: bool,
    busy_until: Option<Millis>,
}

impl ScrollSnapSelector {
    pub fn new(config: ScrollConfig, item_count: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            item_count,
            offset: 0.0,
            selected: None,
            dragging: false,
            busy_until: None,
        })
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn item_count(&self) -> usize {
        self.item_count
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// The item nearest the viewport center; `None` for an empty list.
    pub fn current_index(&self) -> Option<usize> {
        let last = self.item_count.checked_sub(1)?;
        let nearest = (self.offset / self.config.item_extent).round();
        Some(nearest.clamp(0.0, last as f64) as usize)
    }

    pub fn phase(&self, now: Millis) -> ScrollPhase {
        if self.is_snapping(now) {
            ScrollPhase::Snapping
        } else if self.dragging {
            ScrollPhase::Dragging
        } else {
            ScrollPhase::Idle
        }
    }

    pub fn is_snapping(&self, now: Millis) -> bool {
        self.busy_until.is_some_and(|until| now < until)
    }

    /// Vertical padding that lets the first and last items reach the center.
    pub fn content_padding(&self) -> f64 {
        self.config.viewport_extent() / 2.0 - self.config.item_extent / 2.0
    }

    pub fn begin_drag(&mut self) {
        self.dragging = true;
    }

    pub fn on_scroll(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// `0` when the item sits at the center, `1` one extent away, capped at
    /// [`MAX_WEIGHT`].
    pub fn distance_weight(&self, index: usize) -> f64 {
        let item_offset = index as f64 * self.config.item_extent;
        ((self.offset - item_offset).abs() / self.config.item_extent).clamp(0.0, MAX_WEIGHT)
    }

    pub fn emphasis(&self, index: usize) -> ItemEmphasis {
        let weight = self.distance_weight(index);
        ItemEmphasis {
            scale: interpolate(&SCALE_STOPS, weight),
            opacity: interpolate(&OPACITY_STOPS, weight),
            translate_x: interpolate(&TRANSLATE_STOPS, weight),
        }
    }

    pub fn on_drag_end(&mut self, now: Millis) -> SnapOutcome {
        self.dragging = false;
        self.snap(now)
    }

    pub fn on_momentum_end(&mut self, now: Millis) -> SnapOutcome {
        self.snap(now)
    }

    /// Scrolls to `index` on behalf of the caller, who already knows about
    /// the selection. Ignored while a snap is in flight.
    pub fn scroll_to_index(&mut self, index: usize, now: Millis) -> Option<f64> {
        self.expire(now);
        if self.is_snapping(now) {
            return None;
        }
        let last = self.item_count.checked_sub(1)?;
        let index = index.min(last);
        self.selected = Some(index);
        Some(self.start_snap(index, now))
    }

    /// A press on a list item selects it and brings it to the center.
    pub fn press_item(&mut self, index: usize, now: Millis) -> SnapOutcome {
        if index >= self.item_count {
            return SnapOutcome::default();
        }
        let changed = self.select(index);
        SnapOutcome {
            scroll_to: self.scroll_to_index(index, now),
            changed,
        }
    }

    /// The list was (re)loaded. With no selection yet the first item is
    /// selected; a selection past the new end is clamped.
    pub fn set_item_count(&mut self, count: usize, now: Millis) -> SnapOutcome {
        self.item_count = count;
        let Some(last) = count.checked_sub(1) else {
            self.selected = None;
            return SnapOutcome::default();
        };

        let index = self.selected.map_or(0, |s| s.min(last));
        let changed = self.select(index);
        SnapOutcome {
            scroll_to: self.scroll_to_index(index, now),
            changed,
        }
    }

    fn snap(&mut self, now: Millis) -> SnapOutcome {
        self.expire(now);
        if self.is_snapping(now) {
            log::trace!("snap request dropped, one is in flight");
            return SnapOutcome::default();
        }
        let Some(index) = self.current_index() else {
            return SnapOutcome::default();
        };

        let scroll_to = self.start_snap(index, now);
        SnapOutcome {
            scroll_to: Some(scroll_to),
            changed: self.select(index),
        }
    }

    fn start_snap(&mut self, index: usize, now: Millis) -> f64 {
        self.busy_until = Some(now.saturating_add(self.config.snap_cooldown));
        index as f64 * self.config.item_extent
    }

    fn expire(&mut self, now: Millis) {
        if self.busy_until.is_some_and(|until| now >= until) {
            self.busy_until = None;
        }
    }

    fn select(&mut self, index: usize) -> Option<usize> {
        if self.selected == Some(index) {
            return None;
        }
        log::debug!("scroll selection {:?} -> {}", self.selected, index);
        self.selected = Some(index);
        Some(index)
    }
}

fn interpolate(stops: &[f64; 3], weight: f64) -> f64 {
    let (from, to, t) = if weight <= 1.0 {
        (stops[0], stops[1], weight)
    } else {
        (stops[1], stops[2], weight - 1.0)
    };
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(count: usize) -> ScrollSnapSelector {
        ScrollSnapSelector::new(ScrollConfig::default(), count).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn current_index_rounds_and_clamps() {
        let mut scroll = list(5);
        for (offset, expected) in [(-30.0, 0), (74.0, 1), (76.0, 2), (1000.0, 4)] {
            scroll.on_scroll(offset);
            assert_eq!(scroll.current_index(), Some(expected), "{offset}");
        }
        assert_eq!(list(0).current_index(), None);
    }

    #[test]
    fn weights_follow_distance_in_extents() {
        let mut scroll = list(10);
        scroll.on_scroll(100.0);
        assert_eq!(scroll.distance_weight(2), 0.0);
        assert_eq!(scroll.distance_weight(1), 1.0);
        assert_eq!(scroll.distance_weight(3), 1.0);
        assert_eq!(scroll.distance_weight(0), 2.0);
        assert_eq!(scroll.distance_weight(7), 2.0);

        scroll.on_scroll(125.0);
        assert_eq!(scroll.distance_weight(2), 0.5);
    }

    #[test]
    fn emphasis_interpolates_between_stops() {
        let mut scroll = list(10);
        scroll.on_scroll(125.0);
        let half = scroll.emphasis(2);
        assert!(close(half.scale, 0.95));
        assert!(close(half.opacity, 0.75));
        assert!(close(half.translate_x, 5.0));

        let far = scroll.emphasis(9);
        assert!(close(far.scale, 0.8));
        assert!(close(far.opacity, 0.3));
        assert!(close(far.translate_x, 20.0));
    }

    #[test]
    fn release_snaps_to_nearest_item() {
        let mut scroll = list(5);
        scroll.begin_drag();
        scroll.on_scroll(130.0);
        assert_eq!(scroll.phase(Millis(0)), ScrollPhase::Dragging);

        let outcome = scroll.on_drag_end(Millis(1000));
        assert_eq!(
            outcome,
            SnapOutcome {
                scroll_to: Some(150.0),
                changed: Some(3)
            }
        );
        assert_eq!(scroll.phase(Millis(1050)), ScrollPhase::Snapping);
        assert_eq!(scroll.phase(Millis(1100)), ScrollPhase::Idle);
    }

    #[test]
    fn snap_in_flight_blocks_repeats() {
        let mut scroll = list(5);
        scroll.on_scroll(60.0);
        let first = scroll.on_drag_end(Millis(1000));
        assert_eq!(first.changed, Some(1));

        scroll.on_scroll(70.0);
        assert_eq!(scroll.on_momentum_end(Millis(1040)), SnapOutcome::default());
        assert_eq!(scroll.on_drag_end(Millis(1099)), SnapOutcome::default());
        assert_eq!(scroll.scroll_to_index(3, Millis(1099)), None);

        let later = scroll.on_momentum_end(Millis(1100));
        assert_eq!(later.scroll_to, Some(50.0));
        assert_eq!(later.changed, None);
    }

    #[test]
    fn programmatic_scroll_is_silent_and_clamped() {
        let mut scroll = list(4);
        assert_eq!(scroll.scroll_to_index(99, Millis(0)), Some(150.0));
        assert_eq!(scroll.selected(), Some(3));

        scroll.on_scroll(150.0);
        let outcome = scroll.on_momentum_end(Millis(500));
        assert_eq!(outcome.changed, None);

        assert_eq!(list(0).scroll_to_index(2, Millis(0)), None);
    }

    #[test]
    fn pressing_an_item_selects_it() {
        let mut scroll = list(6);
        let outcome = scroll.press_item(4, Millis(0));
        assert_eq!(
            outcome,
            SnapOutcome {
                scroll_to: Some(200.0),
                changed: Some(4)
            }
        );
        assert_eq!(scroll.press_item(6, Millis(500)), SnapOutcome::default());
    }

    #[test]
    fn loading_items_selects_the_first() {
        let mut scroll = list(0);
        let outcome = scroll.set_item_count(8, Millis(0));
        assert_eq!(outcome.changed, Some(0));
        assert_eq!(outcome.scroll_to, Some(0.0));

        scroll.press_item(7, Millis(200));
        let shrunk = scroll.set_item_count(3, Millis(400));
        assert_eq!(shrunk.changed, Some(2));
        assert_eq!(shrunk.scroll_to, Some(100.0));

        assert_eq!(scroll.set_item_count(0, Millis(600)), SnapOutcome::default());
        assert_eq!(scroll.selected(), None);
    }

    #[test]
    fn padding_centers_the_ends() {
        assert_eq!(list(3).content_padding(), 100.0);
    }

    #[test]
    fn rejects_empty_viewport() {
        let config = ScrollConfig {
            visible_items: 0,
            ..ScrollConfig::default()
        };
        assert_eq!(
            ScrollSnapSelector::new(config, 3).err(),
            Some(ConfigError::NoVisibleItems)
        );
    }
}
