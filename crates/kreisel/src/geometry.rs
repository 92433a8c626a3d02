use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// Seam guard: angles beyond this magnitude on opposite sides of ±180° are
/// a wraparound, not a reversal.
pub const SEAM_DEGREES: f64 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// A pointer position relative to a reference center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Polar {
    /// In (-180, 180], screen coordinates (positive is clockwise, y grows down).
    pub angle_degrees: f64,
    pub distance: f64,
}

pub fn angle_and_distance(point: Point, center: Point) -> Polar {
    let (dx, dy) = (point.x - center.x, point.y - center.y);
    Polar {
        angle_degrees: normalize_degrees(dy.atan2(dx).to_degrees()),
        distance: dx.hypot(dy),
    }
}

/// Wraps an angle into (-180, 180].
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

pub fn crosses_seam(previous: f64, current: f64) -> bool {
    (previous > SEAM_DEGREES && current < -SEAM_DEGREES)
        || (previous < -SEAM_DEGREES && current > SEAM_DEGREES)
}

/// Signed step from `from` to `to` on a ring of `count` positions, taking the
/// shorter arc. The magnitude never exceeds `count / 2`.
pub fn shortest_delta(from: f64, to: f64, count: usize) -> f64 {
    let n = count as f64;
    let delta = (to - from).rem_euclid(n);
    if delta > n / 2.0 { delta - n } else { delta }
}

/// Shortest unsigned distance between two positions on a ring of `count`.
pub fn ring_distance(a: f64, b: f64, count: usize) -> f64 {
    shortest_delta(a, b, count).abs()
}
