use crate::geometry::Point;
use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Movement (in px, either axis) before a press counts as a drag.
pub const DRAG_SLOP_PX: f64 = 2.0;
/// Taps this soon after a drag release belong to the drag.
pub const TAP_SUPPRESSION: Millis = Millis(250);
pub const DOUBLE_TAP_WINDOW: Millis = Millis(300);

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    From,
    Into,
    Serialize,
    Deserialize,
)]
#[display("{_0}ms")]
#[serde(transparent)]
pub struct Millis(pub u64);

impl Millis {
    pub fn since(self, earlier: Millis) -> Millis {
        Millis(self.0.saturating_sub(earlier.0))
    }

    pub fn saturating_add(self, other: Millis) -> Millis {
        Millis(self.0.saturating_add(other.0))
    }
}

/// One observation of an ongoing gesture; `dx`/`dy` are cumulative from the
/// press, `absolute` is where the pointer is now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSample {
    pub dx: f64,
    pub dy: f64,
    pub absolute: Point,
    pub t: Millis,
}

impl GestureSample {
    pub fn new(origin: Point, absolute: Point, t: Millis) -> Self {
        Self {
            dx: absolute.x - origin.x,
            dy: absolute.y - origin.y,
            absolute,
            t,
        }
    }
}

pub fn should_begin_drag(sample: &GestureSample) -> bool {
    sample.dx.abs() > DRAG_SLOP_PX || sample.dy.abs() > DRAG_SLOP_PX
}

pub fn is_suppressed_tap(now: Millis, last_drag_release: Option<Millis>) -> bool {
    last_drag_release.is_some_and(|released| now.since(released) < TAP_SUPPRESSION)
}

pub fn is_double_activation(now: Millis, last_tap: Option<Millis>, window: Millis) -> bool {
    last_tap.is_some_and(|tapped| now.since(tapped) < window)
}

/// Remembers the last tap per target so a second tap on the same target
/// inside the window reads as a double activation.
#[derive(Debug, Clone, Copy)]
pub struct TapTracker {
    last: Option<(usize, Millis)>,
    window: Millis,
}

impl Default for TapTracker {
    fn default() -> Self {
        Self::new(DOUBLE_TAP_WINDOW)
    }
}

impl TapTracker {
    pub fn new(window: Millis) -> Self {
        Self { last: None, window }
    }

    /// Records a tap on `target`; returns `true` when it completes a double
    /// activation, which also clears the memory.
    pub fn register(&mut self, target: usize, now: Millis) -> bool {
        let previous = self
            .last
            .filter(|(last_target, _)| *last_target == target)
            .map(|(_, t)| t);

        if is_double_activation(now, previous, self.window) {
            self.last = None;
            return true;
        }

        self.last = Some((target, now));
        false
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point, Millis),
    Move(Point, Millis),
    Up(Point, Millis),
}

/// What a pointer sequence means once the slop rule has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    DragStart { origin: Point, t: Millis },
    DragMove(GestureSample),
    DragEnd(GestureSample),
    Tap { at: Point, t: Millis },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
enum Press {
    #[default]
    Released,
    Pressed { origin: Point },
    Dragging { origin: Point },
}

/// Splits raw pointer events into taps and drags for one control.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointerTracker {
    press: Press,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.press, Press::Dragging { .. })
    }

    /// Feeds one pointer event. A move past the slop produces both the
    /// `DragStart` and the first `DragMove`.
    pub fn handle(&mut self, event: PointerEvent) -> Vec<Gesture> {
        match (self.press, event) {
            (_, PointerEvent::Down(at, _)) => {
                self.press = Press::Pressed { origin: at };
                Vec::new()
            }
            (Press::Pressed { origin }, PointerEvent::Move(at, t)) => {
                let sample = GestureSample::new(origin, at, t);
                if !should_begin_drag(&sample) {
                    return Vec::new();
                }
                self.press = Press::Dragging { origin };
                vec![Gesture::DragStart { origin, t }, Gesture::DragMove(sample)]
            }
            (Press::Dragging { origin }, PointerEvent::Move(at, t)) => {
                vec![Gesture::DragMove(GestureSample::new(origin, at, t))]
            }
            (Press::Pressed { origin }, PointerEvent::Up(_, t)) => {
                self.press = Press::Released;
                vec![Gesture::Tap { at: origin, t }]
            }
            (Press::Dragging { origin }, PointerEvent::Up(at, t)) => {
                self.press = Press::Released;
                vec![Gesture::DragEnd(GestureSample::new(origin, at, t))]
            }
            (Press::Released, PointerEvent::Move(..) | PointerEvent::Up(..)) => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(dx: f64, dy: f64) -> GestureSample {
        GestureSample {
            dx,
            dy,
            absolute: Point::new(dx, dy),
            t: Millis(0),
        }
    }

    #[test]
    fn drag_needs_more_than_slop() {
        assert!(!should_begin_drag(&sample(2.0, -2.0)));
        assert!(should_begin_drag(&sample(2.5, 0.0)));
        assert!(should_begin_drag(&sample(0.0, -3.0)));
    }

    #[test]
    fn tap_suppression_window_is_exclusive() {
        assert!(!is_suppressed_tap(Millis(1000), None));
        assert!(is_suppressed_tap(Millis(1249), Some(Millis(1000))));
        assert!(!is_suppressed_tap(Millis(1250), Some(Millis(1000))));
    }

    #[test]
    fn double_tap_is_scoped_to_target() {
        let mut taps = TapTracker::default();
        assert!(!taps.register(3, Millis(0)));
        assert!(!taps.register(4, Millis(100)));
        assert!(!taps.register(3, Millis(150)));
        assert!(taps.register(3, Millis(400)));
        // consumed: a third tap starts over
        assert!(!taps.register(3, Millis(450)));
    }

    #[test]
    fn double_tap_expires() {
        let mut taps = TapTracker::default();
        assert!(!taps.register(0, Millis(0)));
        assert!(!taps.register(0, Millis(300)));
        assert!(taps.register(0, Millis(599)));
    }

    #[test]
    fn still_press_becomes_tap() {
        let mut tracker = PointerTracker::new();
        let origin = Point::new(10.0, 10.0);
        assert!(tracker.handle(PointerEvent::Down(origin, Millis(0))).is_empty());
        assert!(
            tracker
                .handle(PointerEvent::Move(Point::new(11.0, 12.0), Millis(5)))
                .is_empty()
        );
        assert_eq!(
            tracker.handle(PointerEvent::Up(Point::new(11.0, 12.0), Millis(40))),
            vec![Gesture::Tap {
                at: origin,
                t: Millis(40)
            }]
        );
    }

    #[test]
    fn moving_press_becomes_drag() {
        let mut tracker = PointerTracker::new();
        let origin = Point::new(10.0, 10.0);
        tracker.handle(PointerEvent::Down(origin, Millis(0)));

        let started = tracker.handle(PointerEvent::Move(Point::new(20.0, 10.0), Millis(16)));
        assert_eq!(started.len(), 2);
        assert_eq!(
            started[0],
            Gesture::DragStart {
                origin,
                t: Millis(16)
            }
        );
        assert!(tracker.is_dragging());

        let ended = tracker.handle(PointerEvent::Up(Point::new(30.0, 5.0), Millis(32)));
        match ended.as_slice() {
            [Gesture::DragEnd(sample)] => {
                assert_eq!((sample.dx, sample.dy), (20.0, -5.0));
            }
            other => panic!("unexpected gestures: {other:?}"),
        }
        assert!(!tracker.is_dragging());
    }

    #[test]
    fn millis_deserializes_transparently() {
        let t: Millis = serde_json::from_str("250").unwrap();
        assert_eq!(t, TAP_SUPPRESSION);
    }
}
