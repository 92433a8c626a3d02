//! Spring settle animations.
//!
//! Springs are parameterised the way the content app tunes them (tension,
//! friction, initial velocity) and integrated as a damped harmonic oscillator
//! with unit mass. The host calls [`Animated::advance`] once per frame.

use crate::geometry::Point;
use std::fmt::Debug;
use std::time::Duration;

/// Integration sub-step; frames longer than this are split.
const TIMESTEP: f64 = 1.0 / 240.0;
const REST_DISPLACEMENT: f64 = 0.001;
const REST_SPEED: f64 = 0.001;
/// Floor for the path length used to scale tension, so a zero-length move
/// does not divide by zero.
const MIN_TENSION_DISTANCE: f64 = 0.1;
const BASE_TENSION: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringSpec {
    pub tension: f64,
    pub friction: f64,
    /// Units per second along the direction of travel.
    pub initial_velocity: f64,
}

impl SpringSpec {
    pub fn new(tension: f64, friction: f64, initial_velocity: f64) -> Self {
        Self {
            tension,
            friction,
            initial_velocity,
        }
    }

    /// Settle after a drag release.
    pub fn release() -> Self {
        Self::new(BASE_TENSION, 5.0, 0.0)
    }

    /// Settle after a tap on another position. Shorter paths get stiffer springs.
    pub fn tap(distance: f64, min_tap_distance: f64) -> Self {
        let tension = min_tap_distance + min_tap_distance / distance.max(MIN_TENSION_DISTANCE);
        Self::new(tension.max(BASE_TENSION), 6.0, 0.5)
    }

    /// Settle after a selection made outside the control.
    pub fn external(distance: f64, min_tap_distance: f64) -> Self {
        let tension = BASE_TENSION + min_tap_distance / distance.max(MIN_TENSION_DISTANCE);
        Self::new(tension.max(BASE_TENSION), 6.0, 0.5)
    }

    /// The livelier jump to the opposite position.
    pub fn double_activation() -> Self {
        Self::new(60.0, 6.0, 1.5)
    }

    pub fn return_to_origin() -> Self {
        Self::new(BASE_TENSION, 7.0, 0.0)
    }

    pub fn stiffness(&self) -> f64 {
        (self.tension - 30.0) * 3.62 + 194.0
    }

    pub fn damping(&self) -> f64 {
        (self.friction - 8.0) * 3.0 + 25.0
    }
}

impl Default for SpringSpec {
    fn default() -> Self {
        Self::return_to_origin()
    }
}

pub trait Animatable: Copy + PartialEq + Debug {
    fn zero() -> Self;
    fn plus(self, other: Self) -> Self;
    fn minus(self, other: Self) -> Self;
    fn scaled(self, factor: f64) -> Self;
    fn magnitude(self) -> f64;
}

impl Animatable for f64 {
    fn zero() -> Self {
        0.0
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn minus(self, other: Self) -> Self {
        self - other
    }

    fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    fn magnitude(self) -> f64 {
        self.abs()
    }
}

impl Animatable for Point {
    fn zero() -> Self {
        Point::ORIGIN
    }

    fn plus(self, other: Self) -> Self {
        self + other
    }

    fn minus(self, other: Self) -> Self {
        self - other
    }

    fn scaled(self, factor: f64) -> Self {
        self * factor
    }

    fn magnitude(self) -> f64 {
        self.length()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Motion<T> {
    target: T,
    spec: SpringSpec,
}

/// A value observed by the renderer every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animated<T: Animatable> {
    value: T,
    velocity: T,
    motion: Option<Motion<T>>,
}

impl<T: Animatable> Animated<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            velocity: T::zero(),
            motion: None,
        }
    }

    pub fn value(&self) -> T {
        self.value
    }

    /// Where the value is heading; the value itself when at rest.
    pub fn target(&self) -> T {
        self.motion.map_or(self.value, |m| m.target)
    }

    pub fn spec(&self) -> Option<SpringSpec> {
        self.motion.map(|m| m.spec)
    }

    pub fn is_animating(&self) -> bool {
        self.motion.is_some()
    }

    /// Writes the value directly, cancelling any running spring.
    pub fn set_value(&mut self, value: T) {
        self.value = value;
        self.velocity = T::zero();
        self.motion = None;
    }

    pub fn spring_to(&mut self, target: T, spec: SpringSpec) {
        let offset = target.minus(self.value);
        let length = offset.magnitude();
        self.velocity = if length > 0.0 {
            offset.scaled(spec.initial_velocity / length)
        } else {
            T::zero()
        };
        self.motion = Some(Motion { target, spec });
    }

    /// Steps the spring by `dt`. Returns `true` while still moving.
    pub fn advance(&mut self, dt: Duration) -> bool {
        let Some(Motion { target, spec }) = self.motion else {
            return false;
        };

        let (stiffness, damping) = (spec.stiffness(), spec.damping());
        let mut remaining = dt.as_secs_f64();

        while remaining > 0.0 {
            let step = remaining.min(TIMESTEP);
            let displacement = self.value.minus(target);
            let force = displacement
                .scaled(-stiffness)
                .minus(self.velocity.scaled(damping));
            self.velocity = self.velocity.plus(force.scaled(step));
            self.value = self.value.plus(self.velocity.scaled(step));
            remaining -= step;

            if self.is_at_rest(target) {
                self.set_value(target);
                return false;
            }
        }

        true
    }

    fn is_at_rest(&self, target: T) -> bool {
        self.velocity.magnitude() <= REST_SPEED
            && self.value.minus(target).magnitude() <= REST_DISPLACEMENT
    }
}

impl<T: Animatable> Default for Animated<T> {
    fn default() -> Self {
        Self::new(T::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_rest<T: Animatable>(value: &mut Animated<T>) {
        for _ in 0..600 {
            if !value.advance(Duration::from_millis(16)) {
                return;
            }
        }
    }

    #[test]
    fn tension_shrinks_with_distance() {
        let near = SpringSpec::tap(0.5, 20.0);
        let far = SpringSpec::tap(6.0, 20.0);
        assert_eq!(near.tension, 60.0);
        assert_eq!(far.tension, 40.0);
        assert!(near.tension > far.tension);
        assert!(SpringSpec::external(1.0, 20.0).tension > SpringSpec::external(6.0, 20.0).tension);
        assert_eq!(SpringSpec::tap(0.0, 20.0).tension, 220.0);
        assert_eq!(SpringSpec::external(6.0, 0.0).tension, 40.0);
    }

    #[test]
    fn origami_mapping() {
        let spec = SpringSpec::release();
        assert!((spec.stiffness() - 230.2).abs() < 1e-9);
        assert_eq!(spec.damping(), 16.0);
    }

    #[test]
    fn scalar_settles_exactly_on_target() {
        let mut value = Animated::new(-5.33);
        value.spring_to(-5.0, SpringSpec::release());
        assert!(value.is_animating());
        assert_eq!(value.target(), -5.0);

        run_to_rest(&mut value);
        assert!(!value.is_animating());
        assert_eq!(value.value(), -5.0);
    }

    #[test]
    fn vector_returns_to_origin() {
        let mut offset = Animated::new(Point::new(30.0, -12.0));
        offset.spring_to(Point::ORIGIN, SpringSpec::return_to_origin());

        assert!(offset.advance(Duration::from_millis(16)));
        let first = offset.value();
        assert!(first.length() < Point::new(30.0, -12.0).length());

        run_to_rest(&mut offset);
        assert_eq!(offset.value(), Point::ORIGIN);
    }

    #[test]
    fn direct_write_cancels_motion() {
        let mut value = Animated::new(0.0);
        value.spring_to(4.0, SpringSpec::double_activation());
        value.advance(Duration::from_millis(16));
        value.set_value(1.5);
        assert!(!value.is_animating());
        assert!(!value.advance(Duration::from_millis(16)));
        assert_eq!(value.value(), 1.5);
    }
}
