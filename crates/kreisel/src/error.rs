use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("center point must be finite, got ({x}, {y})")]
    NonFiniteCenter { x: f64, y: f64 },
    #[error("`{field}` must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("dial needs an even number of positions (at least 2), got {0}")]
    PositionCount(usize),
    #[error("list must show at least one item")]
    NoVisibleItems,
    #[error("quadrant selector needs at least {required} outcomes, got {found}")]
    TooFewOutcomes { required: usize, found: usize },
}
