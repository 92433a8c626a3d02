//! Rotation dial: a ring of fixed positions turned by dragging around its hub
//! or by tapping a position.
//!
//! The dial keeps a continuous rotation measured in positions. Rotating by
//! `+1` turns the ring clockwise by one position, which brings the previous
//! index to the top, so the committed index is `(N - round(rotation)) mod N`.

use crate::ensure_positive;
use crate::error::ConfigError;
use crate::geometry::{self, Point};
use crate::gesture::{self, GestureSample, Millis, TapTracker};
use crate::spring::{Animated, SpringSpec};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_POSITIONS: usize = 12;
pub const DEFAULT_MIN_DRAG_DISTANCE: f64 = 20.0;
pub const DEFAULT_RADIUS: f64 = 250.0;
/// Position 0 sits at the top of the ring.
pub const START_ANGLE_DEGREES: f64 = -90.0;

// A single sample moving this far cannot be a real reversal.
const NOISE_MIN_DEGREES: f64 = 90.0;
const NOISE_MAX_DEGREES: f64 = 270.0;
const MIN_ANGLE_STEP_DEGREES: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialConfig {
    pub positions: usize,
    pub center: Point,
    /// Hub dead zone; drags starting inside it never rotate the dial.
    pub min_drag_distance: f64,
    /// Outer edge for tap hit-testing.
    pub radius: f64,
}

impl Default for DialConfig {
    fn default() -> Self {
        Self {
            positions: DEFAULT_POSITIONS,
            center: Point::new(DEFAULT_RADIUS, DEFAULT_RADIUS),
            min_drag_distance: DEFAULT_MIN_DRAG_DISTANCE,
            radius: DEFAULT_RADIUS,
        }
    }
}

impl DialConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.positions < 2 || self.positions % 2 != 0 {
            return Err(ConfigError::PositionCount(self.positions));
        }
        if !self.center.is_finite() {
            return Err(ConfigError::NonFiniteCenter {
                x: self.center.x,
                y: self.center.y,
            });
        }
        ensure_positive!(self, min_drag_distance, radius);
        Ok(())
    }

    pub fn step_degrees(&self) -> f64 {
        360.0 / self.positions as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialPhase {
    Idle,
    Dragging,
    Animating,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    initial_angle: f64,
    last_angle: f64,
    start_rotation: f64,
    moved: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Drag {
    #[default]
    None,
    /// Started inside the hub; ignored until released.
    DeadZone,
    Active(DragAnchor),
}

#[derive(Debug, Clone)]
pub struct RotationDial {
    config: DialConfig,
    rotation: Animated<f64>,
    committed: usize,
    drag: Drag,
    last_release: Option<Millis>,
    taps: TapTracker,
}

impl RotationDial {
    pub fn new(config: DialConfig, committed_index: usize) -> Result<Self, ConfigError> {
        config.validate()?;
        let committed = if committed_index < config.positions {
            committed_index
        } else {
            log::warn!(
                "initial dial index {committed_index} out of range for {} positions, using 0",
                config.positions
            );
            0
        };

        let mut dial = Self {
            config,
            rotation: Animated::default(),
            committed,
            drag: Drag::None,
            last_release: None,
            taps: TapTracker::default(),
        };
        dial.rotation.set_value(dial.base_rotation(committed));
        Ok(dial)
    }

    pub fn config(&self) -> &DialConfig {
        &self.config
    }

    pub fn committed_index(&self) -> usize {
        self.committed
    }

    /// Continuous rotation in positions, for the render transform.
    pub fn rotation(&self) -> f64 {
        self.rotation.value()
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.value() * self.config.step_degrees()
    }

    pub fn animation(&self) -> &Animated<f64> {
        &self.rotation
    }

    pub fn phase(&self) -> DialPhase {
        match self.drag {
            Drag::Active(_) => DialPhase::Dragging,
            _ if self.rotation.is_animating() => DialPhase::Animating,
            _ => DialPhase::Idle,
        }
    }

    /// Moves the hub, e.g. after a layout change.
    ///
    /// # Panics
    ///
    /// If `center` is not finite.
    pub fn set_center(&mut self, center: Point) {
        assert!(center.is_finite(), "dial center must be finite: {center:?}");
        self.config.center = center;
    }

    pub fn begin_drag(&mut self, origin: Point) {
        let polar = geometry::angle_and_distance(origin, self.config.center);
        if polar.distance <= self.config.min_drag_distance {
            log::trace!("drag starts in hub dead zone ({:.1}px)", polar.distance);
            self.drag = Drag::DeadZone;
            return;
        }

        // Anchor on the live value so an interrupted settle does not jump.
        let live = self.rotation.value();
        self.rotation.set_value(live);
        self.drag = Drag::Active(DragAnchor {
            initial_angle: polar.angle_degrees,
            last_angle: polar.angle_degrees,
            start_rotation: live,
            moved: false,
        });
    }

    pub fn update_drag(&mut self, sample: &GestureSample) {
        let Drag::Active(mut anchor) = self.drag else {
            return;
        };

        let polar = geometry::angle_and_distance(sample.absolute, self.config.center);
        if polar.distance < self.config.min_drag_distance {
            return;
        }

        let current = polar.angle_degrees;
        let step = (current - anchor.last_angle).abs();
        if anchor.moved && step > NOISE_MIN_DEGREES && step < NOISE_MAX_DEGREES {
            log::trace!("discarding angle spike of {step:.1}°");
            return;
        }
        if !geometry::crosses_seam(anchor.last_angle, current) && step < MIN_ANGLE_STEP_DEGREES {
            return;
        }

        let swept = geometry::normalize_degrees(current - anchor.initial_angle);
        self.rotation
            .set_value(anchor.start_rotation + swept / self.config.step_degrees());

        anchor.last_angle = current;
        anchor.moved = true;
        self.drag = Drag::Active(anchor);
    }

    /// Ends a drag. Returns the new index when the selection changed.
    pub fn end_drag(&mut self, now: Millis) -> Option<usize> {
        match std::mem::take(&mut self.drag) {
            Drag::None => None,
            Drag::DeadZone => {
                self.last_release = Some(now);
                None
            }
            Drag::Active(_) => {
                self.last_release = Some(now);
                let rounded = self.rotation.value().round();
                let wrapped = rounded.rem_euclid(self.config.positions as f64) as usize;
                let index = (self.config.positions - wrapped) % self.config.positions;

                self.rotation.spring_to(rounded, SpringSpec::release());
                self.commit(index)
            }
        }
    }

    /// Handles a tap on position `target`. Returns the new index when the
    /// selection changed.
    pub fn tap(&mut self, target: usize, now: Millis) -> Option<usize> {
        if gesture::is_suppressed_tap(now, self.last_release) {
            log::trace!("tap on {target} swallowed by drag release");
            return None;
        }
        if target >= self.config.positions {
            return None;
        }

        if target == self.committed {
            if !self.taps.register(target, now) {
                return None;
            }
            let opposite = (target + self.config.positions / 2) % self.config.positions;
            self.settle_on(opposite, SpringSpec::double_activation());
            return self.commit(opposite);
        }

        self.taps.clear();
        let distance = self.distance_to(target);
        self.settle_on(
            target,
            SpringSpec::tap(distance, self.config.min_drag_distance),
        );
        self.commit(target)
    }

    /// Follows a selection made elsewhere. Never reports a change back.
    pub fn set_external_index(&mut self, index: usize) {
        if index >= self.config.positions || index == self.committed {
            return;
        }

        let distance = self.distance_to(index);
        self.settle_on(
            index,
            SpringSpec::external(distance, self.config.min_drag_distance),
        );
        self.committed = index;
        self.taps.clear();
    }

    /// The position under `point`, if it lies on the ring.
    pub fn position_at(&self, point: Point) -> Option<usize> {
        let polar = geometry::angle_and_distance(point, self.config.center);
        if polar.distance <= self.config.min_drag_distance || polar.distance > self.config.radius {
            return None;
        }

        let step = self.config.step_degrees();
        (0..self.config.positions).min_by(|&a, &b| {
            let da = self.angular_offset(a, polar.angle_degrees, step);
            let db = self.angular_offset(b, polar.angle_degrees, step);
            da.total_cmp(&db)
        })
    }

    pub fn advance(&mut self, dt: Duration) -> bool {
        self.rotation.advance(dt)
    }

    fn angular_offset(&self, index: usize, angle: f64, step: f64) -> f64 {
        let shown = START_ANGLE_DEGREES + (index as f64 + self.rotation.value()) * step;
        geometry::normalize_degrees(angle - shown).abs()
    }

    fn base_rotation(&self, index: usize) -> f64 {
        let n = self.config.positions;
        ((n - index) % n) as f64
    }

    fn distance_to(&self, index: usize) -> f64 {
        geometry::ring_distance(
            self.rotation.value(),
            self.base_rotation(index),
            self.config.positions,
        )
    }

    fn settle_on(&mut self, index: usize, spec: SpringSpec) {
        let live = self.rotation.value();
        let delta = geometry::shortest_delta(live, self.base_rotation(index), self.config.positions);
        self.rotation.spring_to((live + delta).round(), spec);
    }

    fn commit(&mut self, index: usize) -> Option<usize> {
        if index == self.committed {
            return None;
        }
        log::debug!("dial committed {} -> {}", self.committed, index);
        self.committed = index;
        Some(index)
    }
}
