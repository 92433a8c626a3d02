//! Radial quadrant selector: a draggable indicator resolving into one of four
//! directional outcomes, or none.

use crate::ensure_positive;
use crate::error::ConfigError;
use crate::geometry::Point;
use crate::spring::{Animated, SpringSpec};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumIter};

/// Entry 0 is the neutral outcome; 1..=4 follow [`Direction`] order.
pub const REQUIRED_OUTCOMES: usize = 5;
/// Compression applied to displacement beyond half the radius.
pub const DAMPING_FACTOR: f64 = 0.3;
pub const DEFAULT_RADIUS: f64 = 80.0;
pub const DEFAULT_CENTER_ZONE: f64 = 100.0;
pub const DEFAULT_THRESHOLD_FRACTION: f64 = 0.75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Right,
    Down,
    Left,
    Up,
}

impl Direction {
    /// Buckets a screen angle (y grows down) into 90° sectors centered on
    /// the cardinal directions.
    pub fn from_degrees(degrees: f64) -> Self {
        match degrees {
            d if d > -45.0 && d <= 45.0 => Direction::Right,
            d if d > 45.0 && d <= 135.0 => Direction::Down,
            d if d > 135.0 || d <= -135.0 => Direction::Left,
            _ => Direction::Up,
        }
    }

    /// Position of this direction in the outcome list.
    pub fn outcome_index(self) -> usize {
        self as usize + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadrantConfig {
    /// Damping radius; movement beyond half of it meets resistance.
    pub radius: f64,
    /// Size of the central no-decision zone.
    pub center_zone: f64,
    pub threshold_fraction: f64,
}

impl Default for QuadrantConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            center_zone: DEFAULT_CENTER_ZONE,
            threshold_fraction: DEFAULT_THRESHOLD_FRACTION,
        }
    }
}

impl QuadrantConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive!(self, radius, center_zone, threshold_fraction);
        Ok(())
    }

    pub fn threshold(&self) -> f64 {
        self.center_zone * self.threshold_fraction
    }
}

/// Soft resistance: values within `radius / 2` pass through, the excess is
/// compressed by [`DAMPING_FACTOR`].
pub fn damp(value: f64, radius: f64) -> f64 {
    let half = radius / 2.0;
    if value.abs() <= half {
        return value;
    }
    value.signum() * (half + (value.abs() - half) * DAMPING_FACTOR)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadrantPhase {
    Idle,
    Dragging,
    /// Springing back to the origin after an undecided release.
    Returning,
    Committed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuadrantCommit<T> {
    pub direction: Direction,
    pub outcome: T,
}

#[derive(Debug, Clone)]
pub struct RadialQuadrantSelector<T> {
    config: QuadrantConfig,
    outcomes: Vec<T>,
    offset: Animated<Point>,
    candidate: Option<Direction>,
    committed: Option<Direction>,
    dragging: bool,
}

impl<T: Clone> RadialQuadrantSelector<T> {
    pub fn new(config: QuadrantConfig, outcomes: Vec<T>) -> Result<Self, ConfigError> {
        config.validate()?;
        if outcomes.len() < REQUIRED_OUTCOMES {
            return Err(ConfigError::TooFewOutcomes {
                required: REQUIRED_OUTCOMES,
                found: outcomes.len(),
            });
        }

        Ok(Self {
            config,
            outcomes,
            offset: Animated::default(),
            candidate: None,
            committed: None,
            dragging: false,
        })
    }

    pub fn config(&self) -> &QuadrantConfig {
        &self.config
    }

    pub fn outcomes(&self) -> &[T] {
        &self.outcomes
    }

    /// Rendered indicator offset.
    pub fn offset(&self) -> Point {
        self.offset.value()
    }

    pub fn animation(&self) -> &Animated<Point> {
        &self.offset
    }

    pub fn candidate(&self) -> Option<Direction> {
        self.candidate
    }

    pub fn committed(&self) -> Option<Direction> {
        self.committed
    }

    /// Indicator channel for the host: `-1` with no candidate, else the
    /// sector number `0..=3`.
    pub fn indicator(&self) -> i8 {
        self.candidate.map_or(-1, |d| d as i8)
    }

    pub fn phase(&self) -> QuadrantPhase {
        if self.dragging {
            QuadrantPhase::Dragging
        } else if self.offset.is_animating() {
            QuadrantPhase::Returning
        } else if self.committed.is_some() {
            QuadrantPhase::Committed
        } else {
            QuadrantPhase::Idle
        }
    }

    /// Clean slate for a new activation.
    pub fn reset(&mut self) {
        self.offset.set_value(Point::ORIGIN);
        self.candidate = None;
        self.committed = None;
        self.dragging = false;
    }

    pub fn update_drag(&mut self, dx: f64, dy: f64) {
        self.dragging = true;
        let damped = Point::new(damp(dx, self.config.radius), damp(dy, self.config.radius));
        self.offset.set_value(damped);

        let threshold = self.config.threshold();
        self.candidate = if damped.x.abs() > threshold || damped.y.abs() > threshold {
            Some(Direction::from_degrees(dy.atan2(dx).to_degrees()))
        } else {
            None
        };
    }

    /// Ends the gesture. With a candidate the selection is committed and
    /// returned, and the host should show its confirmation view; the
    /// indicator stays where it is. Without one the indicator springs home.
    pub fn end_drag(&mut self) -> Option<QuadrantCommit<T>> {
        self.dragging = false;
        match self.candidate.take() {
            Some(direction) => {
                log::debug!("quadrant committed {direction}");
                self.committed = Some(direction);
                Some(QuadrantCommit {
                    direction,
                    outcome: self.outcomes[direction.outcome_index()].clone(),
                })
            }
            None => {
                self.offset
                    .spring_to(Point::ORIGIN, SpringSpec::return_to_origin());
                None
            }
        }
    }

    pub fn advance(&mut self, dt: Duration) -> bool {
        self.offset.advance(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTCOMES: [&str; 5] = ["neutral", "right", "down", "left", "up"];

    fn selector(center_zone: f64) -> RadialQuadrantSelector<&'static str> {
        let config = QuadrantConfig {
            radius: 80.0,
            center_zone,
            threshold_fraction: 0.75,
        };
        RadialQuadrantSelector::new(config, OUTCOMES.to_vec()).unwrap()
    }

    #[test]
    fn damping_is_linear_then_compressed() {
        assert_eq!(damp(30.0, 80.0), 30.0);
        assert_eq!(damp(40.0, 80.0), 40.0);
        assert_eq!(damp(-40.0, 80.0), -40.0);
        assert!((damp(120.0, 80.0) - 64.0).abs() < 1e-9);
        assert!((damp(-140.0, 80.0) + 70.0).abs() < 1e-9);
    }

    #[test]
    fn sectors_are_centered_on_cardinals() {
        let cases = vec![
            (0.0, Direction::Right),
            (45.0, Direction::Right),
            (45.1, Direction::Down),
            (135.0, Direction::Down),
            (135.1, Direction::Left),
            (-135.0, Direction::Left),
            (180.0, Direction::Left),
            (-134.9, Direction::Up),
            (-45.0, Direction::Up),
            (-44.9, Direction::Right),
        ];
        for (degrees, expected) in cases {
            assert_eq!(Direction::from_degrees(degrees), expected, "{degrees}");
        }
    }

    #[test]
    fn outcome_indices_skip_neutral_entry() {
        assert_eq!(Direction::Right.outcome_index(), 1);
        assert_eq!(Direction::Up.outcome_index(), 4);
        assert_eq!(Direction::Down.outcome_index(), 2);
    }

    #[test]
    fn needs_five_outcomes() {
        let err = RadialQuadrantSelector::new(QuadrantConfig::default(), vec![1, 2, 3, 4])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::TooFewOutcomes {
                required: 5,
                found: 4
            }
        );
    }

    #[test]
    fn threshold_defaults_to_three_quarters_of_center_zone() {
        assert_eq!(QuadrantConfig::default().threshold(), 75.0);
    }

    #[test]
    fn far_right_drag_commits_right() {
        let mut quadrant = selector(80.0);
        quadrant.update_drag(120.0, 10.0);

        assert!((quadrant.offset().x - 64.0).abs() < 1e-9);
        assert_eq!(quadrant.offset().y, 10.0);
        assert_eq!(quadrant.candidate(), Some(Direction::Right));
        assert_eq!(quadrant.indicator(), 0);
        assert_eq!(quadrant.phase(), QuadrantPhase::Dragging);

        let commit = quadrant.end_drag();
        assert_eq!(
            commit,
            Some(QuadrantCommit {
                direction: Direction::Right,
                outcome: "right"
            })
        );
        assert_eq!(quadrant.committed(), Some(Direction::Right));
        assert!(!quadrant.animation().is_animating());
        assert_eq!(quadrant.phase(), QuadrantPhase::Committed);
    }

    #[test]
    fn candidate_collapses_back_inside_threshold() {
        let mut quadrant = selector(80.0);
        quadrant.update_drag(0.0, -150.0);
        assert_eq!(quadrant.candidate(), Some(Direction::Up));

        quadrant.update_drag(20.0, -50.0);
        assert_eq!(quadrant.candidate(), None);
        assert_eq!(quadrant.indicator(), -1);
    }

    #[test]
    fn undecided_release_springs_home() {
        let mut quadrant = selector(80.0);
        quadrant.update_drag(50.0, 50.0);
        assert_eq!(quadrant.candidate(), None);

        assert_eq!(quadrant.end_drag(), None);
        assert_eq!(quadrant.phase(), QuadrantPhase::Returning);
        assert_eq!(quadrant.animation().target(), Point::ORIGIN);

        while quadrant.advance(Duration::from_millis(16)) {}
        assert_eq!(quadrant.offset(), Point::ORIGIN);
        assert_eq!(quadrant.committed(), None);
        assert_eq!(quadrant.phase(), QuadrantPhase::Idle);
    }

    #[test]
    fn same_direction_fires_every_time() {
        let mut quadrant = selector(80.0);
        for _ in 0..2 {
            quadrant.update_drag(-200.0, 0.0);
            let commit = quadrant.end_drag().map(|c| c.outcome);
            assert_eq!(commit, Some("left"));
        }
    }

    #[test]
    fn reset_clears_previous_session() {
        let mut quadrant = selector(80.0);
        quadrant.update_drag(0.0, 200.0);
        quadrant.end_drag();
        quadrant.reset();

        assert_eq!(quadrant.offset(), Point::ORIGIN);
        assert_eq!(quadrant.candidate(), None);
        assert_eq!(quadrant.committed(), None);
        assert_eq!(quadrant.phase(), QuadrantPhase::Idle);
    }
}
