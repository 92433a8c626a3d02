//! Gesture-to-selection engine.
//!
//! Three controllers turn a stream of pointer samples into one discrete,
//! animated selection: [`dial::RotationDial`] (a ring of fixed positions),
//! [`quadrant::RadialQuadrantSelector`] (four directional outcomes) and
//! [`scroll::ScrollSnapSelector`] (a snapping list). None of them render
//! anything; they expose animated values and return selection events.

pub mod arena;
pub mod dial;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod macros;
pub mod quadrant;
pub mod scroll;
pub mod spring;

pub use error::ConfigError;
pub use geometry::{Point, Polar};
pub use gesture::{GestureSample, Millis};
