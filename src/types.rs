use core::fmt;
use core::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use glam::DVec2;

use crate::error::{ConfigError, ParseEventError};
use crate::geom::VectorExt;

/// Stable shape handle. Process-wide unique and never reused.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeId(pub u64);

impl ShapeId {
    /// Allocate the next identifier.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ShapeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported shapes. Dimensions are fixed at construction.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShapeKind {
    /// Centered circle, represented by a single center vertex plus radius.
    Circle { radius: f64 },
    /// Centered rectangle with four corners.
    Rectangle { width: f64, height: f64 },
    /// Transform-only body that never collides.
    None,
}

impl ShapeKind {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dimension = |name: &'static str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidDimension { name, value })
            }
        };
        match *self {
            ShapeKind::Circle { radius } => dimension("radius", radius),
            ShapeKind::Rectangle { width, height } => {
                dimension("width", width)?;
                dimension("height", height)
            }
            ShapeKind::None => Ok(()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Circle { .. } => "circle",
            ShapeKind::Rectangle { .. } => "rectangle",
            ShapeKind::None => "none",
        }
    }
}

/// Lower/upper bound pair for a magnitude.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    pub min: f64,
    pub max: f64,
}

impl Default for Limits {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl Limits {
    pub const UNBOUNDED: Limits = Limits {
        min: 0.0,
        max: f64::INFINITY,
    };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Reject negative/NaN bounds and `max < min`.
    pub fn validate(&self, name: &'static str) -> Result<(), ConfigError> {
        if self.min.is_nan() || self.min < 0.0 {
            return Err(ConfigError::InvalidLimit {
                name,
                value: self.min,
            });
        }
        if self.max.is_nan() {
            return Err(ConfigError::InvalidLimit {
                name,
                value: self.max,
            });
        }
        if self.max < self.min {
            return Err(ConfigError::InvertedLimits {
                name,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Sign-preserving clamp of `|value|` into `[min, max]`.
    pub fn clamp_signed(&self, value: f64) -> f64 {
        let magnitude = value.abs();
        if magnitude > self.max {
            self.max * value.signum()
        } else if magnitude < self.min {
            self.min * value.signum()
        } else {
            value
        }
    }

    /// Clamp the length of `v` into `[min, max]`, keeping its direction.
    pub fn clamp_magnitude(&self, v: DVec2) -> DVec2 {
        let magnitude = v.length();
        if magnitude > self.max {
            v.with_magnitude(self.max)
        } else if magnitude < self.min {
            v.with_magnitude(self.min)
        } else {
            v
        }
    }
}

/// Per-shape bounds and behaviour switches.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeConfig {
    /// Velocity magnitude bounds (units per tick).
    pub speed: Limits,
    /// Rotation rate bounds (degrees per tick).
    pub rotation: Limits,
    /// Per-axis scale factor bounds.
    pub size: Limits,
    /// Per-axis dilation rate bounds.
    pub growth: Limits,
    /// Re-aim velocity along the shape's angle whenever the angle changes.
    pub lock_velocity_to_angle: bool,
}

impl ShapeConfig {
    pub fn with_speed(mut self, min: f64, max: f64) -> Self {
        self.speed = Limits::new(min, max);
        self
    }

    pub fn with_rotation(mut self, min: f64, max: f64) -> Self {
        self.rotation = Limits::new(min, max);
        self
    }

    pub fn with_size(mut self, min: f64, max: f64) -> Self {
        self.size = Limits::new(min, max);
        self
    }

    pub fn with_growth(mut self, min: f64, max: f64) -> Self {
        self.growth = Limits::new(min, max);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.speed.validate("speed")?;
        self.rotation.validate("rotation")?;
        self.size.validate("size")?;
        self.growth.validate("growth")
    }
}

/// World-level configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorldConfig {
    /// Keep emitted events in a journal readable through `drain_events`.
    pub record_events: bool,
    /// Maximum number of journaled events between drains; extra are dropped.
    pub max_events: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            record_events: true,
            max_events: 1024,
        }
    }
}

/// Collision notifications.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum EventKind {
    Leave,
    Enter,
    Collide,
    /// Co-emitted with `Collide` when coming from `Inside`.
    CollideInner,
    /// Co-emitted with `Collide` when coming from `Outside`.
    CollideOuter,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Leave,
        EventKind::Enter,
        EventKind::Collide,
        EventKind::CollideInner,
        EventKind::CollideOuter,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Leave => "leave",
            EventKind::Enter => "enter",
            EventKind::Collide => "collide",
            EventKind::CollideInner => "collide-inner",
            EventKind::CollideOuter => "collide-outer",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| ParseEventError(s.to_owned()))
    }
}

/// Collision event delivered to listeners and the world journal.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub actor: ShapeId,
    pub interactor: ShapeId,
}

/// Discrete relationship remembered per pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollisionState {
    Outside,
    Inside,
    Colliding,
}

impl CollisionState {
    /// Edge-triggered events for moving from `previous` (if any) to `next`.
    pub fn transition(previous: Option<CollisionState>, next: CollisionState) -> Vec<EventKind> {
        let mut events = Vec::with_capacity(2);
        if previous == Some(next) {
            return events;
        }
        match next {
            CollisionState::Outside => events.push(EventKind::Leave),
            CollisionState::Inside => events.push(EventKind::Enter),
            CollisionState::Colliding => {
                events.push(EventKind::Collide);
                match previous {
                    Some(CollisionState::Inside) => events.push(EventKind::CollideInner),
                    Some(CollisionState::Outside) => events.push(EventKind::CollideOuter),
                    _ => {}
                }
            }
        }
        events
    }
}

/// Raw geometric classification of a pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SatState {
    Separate,
    Overlapping,
    /// One shape lies entirely within the other (either way round).
    Enclosed,
}

impl From<SatState> for CollisionState {
    fn from(s: SatState) -> Self {
        match s {
            SatState::Separate => CollisionState::Outside,
            SatState::Enclosed => CollisionState::Inside,
            SatState::Overlapping => CollisionState::Colliding,
        }
    }
}

/// Interval of a shape projected onto an axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    pub min: f64,
    pub max: f64,
}

impl Projection {
    pub const EMPTY: Projection = Projection {
        min: f64::INFINITY,
        max: f64::NEG_INFINITY,
    };

    /// A gap exists between the intervals. Touching intervals are not separated.
    pub fn separated_from(&self, other: &Projection) -> bool {
        self.min > other.max || other.min > self.max
    }

    /// `self` lies fully inside `other`.
    pub fn within(&self, other: &Projection) -> bool {
        self.min >= other.min && self.max <= other.max
    }
}

/// What a watcher checks its actor against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Every current member of a named layer.
    Layer(String),
    Shape(ShapeId),
    Shapes(Vec<ShapeId>),
}

impl Target {
    /// Deterministic watcher key for this target.
    pub fn watcher_id(&self) -> String {
        match self {
            Target::Layer(name) => name.clone(),
            Target::Shape(id) => id.to_string(),
            Target::Shapes(ids) => {
                let mut sorted = ids.clone();
                sorted.sort_unstable();
                sorted
                    .iter()
                    .map(ShapeId::to_string)
                    .collect::<Vec<_>>()
                    .join("-")
            }
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Target::Layer(crate::DEFAULT_LAYER.to_owned())
    }
}

impl From<&str> for Target {
    fn from(layer: &str) -> Self {
        Target::Layer(layer.to_owned())
    }
}

impl From<String> for Target {
    fn from(layer: String) -> Self {
        Target::Layer(layer)
    }
}

impl From<ShapeId> for Target {
    fn from(id: ShapeId) -> Self {
        Target::Shape(id)
    }
}

impl From<Vec<ShapeId>> for Target {
    fn from(ids: Vec<ShapeId>) -> Self {
        Target::Shapes(ids)
    }
}

impl From<&[ShapeId]> for Target {
    fn from(ids: &[ShapeId]) -> Self {
        Target::Shapes(ids.to_vec())
    }
}

/// Debug counters for a world.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub shapes: usize,
    pub layers: usize,
    pub watchers: usize,
    pub listeners: usize,
    /// Pair states remembered across all watchers.
    pub tracked_pairs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits_validate() {
        assert!(Limits::UNBOUNDED.validate("speed").is_ok());
        assert!(Limits::new(2.0, 2.0).validate("speed").is_ok());
        assert_eq!(
            Limits::new(3.0, 1.0).validate("speed"),
            Err(ConfigError::InvertedLimits {
                name: "speed",
                min: 3.0,
                max: 1.0
            })
        );
        assert!(matches!(
            Limits::new(-1.0, 1.0).validate("size"),
            Err(ConfigError::InvalidLimit { name: "size", .. })
        ));
    }

    #[test]
    fn test_clamp_signed_preserves_sign() {
        let l = Limits::new(1.0, 5.0);
        assert_eq!(l.clamp_signed(-9.0), -5.0);
        assert_eq!(l.clamp_signed(0.5), 1.0);
        assert_eq!(l.clamp_signed(-0.5), -1.0);
        assert_eq!(l.clamp_signed(3.0), 3.0);
    }

    #[test]
    fn test_clamp_magnitude() {
        let l = Limits::new(1.0, 5.0);
        let v = l.clamp_magnitude(DVec2::new(30.0, 40.0));
        assert!((v - DVec2::new(3.0, 4.0)).length() < 1e-9);
        assert_eq!(l.clamp_magnitude(DVec2::ZERO), DVec2::new(1.0, 0.0));
    }

    #[test]
    fn test_event_kind_parse_roundtrip_names() {
        assert_eq!("collide-inner".parse::<EventKind>(), Ok(EventKind::CollideInner));
        assert_eq!(EventKind::CollideOuter.to_string(), "collide-outer");
        assert!("explode".parse::<EventKind>().is_err());
    }

    #[test]
    fn test_transition_edges() {
        use CollisionState::*;
        use EventKind::*;
        assert_eq!(CollisionState::transition(None, Outside), vec![Leave]);
        assert_eq!(CollisionState::transition(None, Colliding), vec![Collide]);
        assert_eq!(
            CollisionState::transition(Some(Outside), Colliding),
            vec![Collide, CollideOuter]
        );
        assert_eq!(
            CollisionState::transition(Some(Inside), Colliding),
            vec![Collide, CollideInner]
        );
        assert_eq!(CollisionState::transition(Some(Colliding), Inside), vec![Enter]);
        assert!(CollisionState::transition(Some(Inside), Inside).is_empty());
    }

    #[test]
    fn test_watcher_id_is_order_independent() {
        let a = Target::from(vec![ShapeId(9), ShapeId(3), ShapeId(5)]);
        let b = Target::from(vec![ShapeId(5), ShapeId(9), ShapeId(3)]);
        assert_eq!(a.watcher_id(), "3-5-9");
        assert_eq!(a.watcher_id(), b.watcher_id());
        assert_eq!(Target::from("walls").watcher_id(), "walls");
        assert_eq!(Target::from(ShapeId(42)).watcher_id(), "42");
    }

    #[test]
    fn test_shape_kind_validate() {
        assert!(ShapeKind::Circle { radius: 1.0 }.validate().is_ok());
        assert!(ShapeKind::Circle { radius: 0.0 }.validate().is_err());
        assert!(ShapeKind::Rectangle { width: 2.0, height: f64::NAN }.validate().is_err());
    }
}
