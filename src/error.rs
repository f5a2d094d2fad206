use thiserror::Error;

/// Rejected shape configuration. Raised at construction, never clamped away.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Upper bound below lower bound (e.g. `max_speed < min_speed`).
    #[error("max {name} ({max}) cannot be lower than min {name} ({min})")]
    InvertedLimits {
        name: &'static str,
        min: f64,
        max: f64,
    },
    /// Negative or NaN bound.
    #[error("{name} bound must be a non-negative number, got {value}")]
    InvalidLimit { name: &'static str, value: f64 },
    /// Radius, width or height that is not a positive finite number.
    #[error("{name} must be positive and finite, got {value}")]
    InvalidDimension { name: &'static str, value: f64 },
}

/// Unknown collision event name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown collision event `{0}` (expected leave, enter, collide, collide-inner or collide-outer)")]
pub struct ParseEventError(pub String);
