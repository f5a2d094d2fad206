use core::fmt;

use glam::DVec2;

use crate::error::ConfigError;
use crate::geom::{ring_edges, Line, Point, Vector};
use crate::narrowphase::{Hull, Narrowphase};
use crate::api::NarrowphaseApi;
use crate::transform::{Dilation, Pose, Rotation, TransformAxis, Translation};
use crate::types::{ShapeConfig, ShapeId, ShapeKind};

/// A transformable, optionally collidable 2D shape.
///
/// State is split into a [`Pose`] plus one block per capability. [`Shape::run`] advances
/// the enabled blocks in a fixed order: translation, rotation, dilation. Collision checks
/// are driven by the owning [`World`](crate::World) after the transform.
#[derive(Debug)]
pub struct Shape {
    id: ShapeId,
    kind: ShapeKind,
    pose: Pose,
    translation: Translation,
    rotation: Rotation,
    dilation: Dilation,
    collidable: bool,
    lock_velocity_to_angle: bool,
}

fn outline(kind: ShapeKind) -> Vec<Point> {
    match kind {
        ShapeKind::Circle { .. } => vec![Point::ZERO],
        ShapeKind::Rectangle { width, height } => {
            let (hw, hh) = (width / 2.0, height / 2.0);
            vec![
                Point::new(hw, -hh),
                Point::new(hw, hh),
                Point::new(-hw, hh),
                Point::new(-hw, -hh),
            ]
        }
        ShapeKind::None => Vec::new(),
    }
}

impl Shape {
    /// Build a shape at the origin. Fails on inverted or invalid bounds and on
    /// non-positive dimensions.
    pub fn new(kind: ShapeKind, config: ShapeConfig) -> Result<Self, ConfigError> {
        kind.validate()?;
        let translation = Translation::new(config.speed)?;
        let rotation = Rotation::new(config.rotation)?;
        let dilation = Dilation::new(config.size, config.growth)?;
        let mut pose = Pose::new(outline(kind));
        // unit scale may sit outside the configured size bounds
        let unit = pose.scale();
        dilation.resize(&mut pose, unit);
        Ok(Self {
            id: ShapeId::next(),
            kind,
            pose,
            translation,
            rotation,
            dilation,
            collidable: true,
            lock_velocity_to_angle: config.lock_velocity_to_angle,
        })
    }

    pub fn circle(radius: f64, config: ShapeConfig) -> Result<Self, ConfigError> {
        Self::new(ShapeKind::Circle { radius }, config)
    }

    pub fn rectangle(width: f64, height: f64, config: ShapeConfig) -> Result<Self, ConfigError> {
        Self::new(ShapeKind::Rectangle { width, height }, config)
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Circle radius under the current scale (largest axis); `None` for other kinds.
    pub fn radius(&self) -> Option<f64> {
        match self.kind {
            ShapeKind::Circle { radius } => {
                let s = self.pose.scale().abs();
                Some(radius * s.x.max(s.y))
            }
            _ => None,
        }
    }

    /// World-space vertices. A circle has one vertex, its center.
    pub fn vertices(&self) -> &[Point] {
        self.pose.vertices()
    }

    pub fn edges(&self) -> Vec<Line> {
        ring_edges(self.pose.vertices())
    }

    /// Collision view of this shape, `None` for [`ShapeKind::None`].
    pub fn hull(&self) -> Option<Hull<'_>> {
        match self.kind {
            ShapeKind::None => None,
            ShapeKind::Circle { .. } => Some(Hull::new(self.vertices(), self.radius().unwrap_or(0.0))),
            ShapeKind::Rectangle { .. } => Some(Hull::new(self.vertices(), 0.0)),
        }
    }

    /// Inclusive point containment.
    pub fn contains(&self, point: Point) -> bool {
        Narrowphase::contains_point(self, point)
    }

    /// Advance one tick.
    pub fn run(&mut self, delta: f64) {
        if self.translation.is_enabled() {
            self.translation.tick(&mut self.pose, delta);
        }
        if self.rotation.is_enabled() {
            self.rotation.tick(&mut self.pose, delta);
            self.follow_angle();
        }
        if self.dilation.is_enabled() {
            self.dilation.tick(&mut self.pose, delta);
        }
    }

    fn follow_angle(&mut self) {
        if self.lock_velocity_to_angle {
            self.translation.steer(self.pose.angle());
        }
    }

    // --- Capabilities --------------------------------------------------------

    pub fn is_translatable(&self) -> bool {
        self.translation.is_enabled()
    }

    pub fn set_translatable(&mut self, enabled: bool) -> &mut Self {
        self.translation.set_enabled(enabled);
        self
    }

    pub fn is_rotatable(&self) -> bool {
        self.rotation.is_enabled()
    }

    pub fn set_rotatable(&mut self, enabled: bool) -> &mut Self {
        self.rotation.set_enabled(enabled);
        self
    }

    pub fn is_scalable(&self) -> bool {
        self.dilation.is_enabled()
    }

    pub fn set_scalable(&mut self, enabled: bool) -> &mut Self {
        self.dilation.set_enabled(enabled);
        self
    }

    /// Whether this shape's watchers run.
    pub fn is_collidable(&self) -> bool {
        self.collidable
    }

    pub fn set_collidable(&mut self, enabled: bool) -> &mut Self {
        self.collidable = enabled;
        self
    }

    pub fn locks_velocity_to_angle(&self) -> bool {
        self.lock_velocity_to_angle
    }

    pub fn set_lock_velocity_to_angle(&mut self, lock: bool) -> &mut Self {
        self.lock_velocity_to_angle = lock;
        self.follow_angle();
        self
    }

    // --- Translation ---------------------------------------------------------

    pub fn position(&self) -> Point {
        self.pose.position()
    }

    pub fn set_position(&mut self, position: Point) -> &mut Self {
        self.pose.set_position(position);
        self
    }

    pub fn x(&self) -> f64 {
        self.pose.position().x
    }

    pub fn set_x(&mut self, x: f64) -> &mut Self {
        let y = self.y();
        self.set_position(Point::new(x, y))
    }

    pub fn y(&self) -> f64 {
        self.pose.position().y
    }

    pub fn set_y(&mut self, y: f64) -> &mut Self {
        let x = self.x();
        self.set_position(Point::new(x, y))
    }

    pub fn shift(&mut self, offset: Vector) -> &mut Self {
        let target = self.position() + offset;
        self.set_position(target)
    }

    pub fn velocity(&self) -> Vector {
        self.translation.velocity()
    }

    /// Set velocity, clamped by magnitude into the speed bounds.
    pub fn set_velocity(&mut self, velocity: Vector) -> &mut Self {
        self.translation.set_velocity(velocity);
        self
    }

    pub fn velocity_x(&self) -> f64 {
        self.velocity().x
    }

    pub fn set_velocity_x(&mut self, x: f64) -> &mut Self {
        let y = self.velocity().y;
        self.set_velocity(DVec2::new(x, y))
    }

    pub fn velocity_y(&self) -> f64 {
        self.velocity().y
    }

    pub fn set_velocity_y(&mut self, y: f64) -> &mut Self {
        let x = self.velocity().x;
        self.set_velocity(DVec2::new(x, y))
    }

    pub fn accelerate(&mut self, change: Vector) -> &mut Self {
        let v = self.velocity() + change;
        self.set_velocity(v)
    }

    // --- Rotation ------------------------------------------------------------

    /// Degrees in `[0, 360)`.
    pub fn angle(&self) -> f64 {
        self.pose.angle()
    }

    pub fn set_angle(&mut self, degrees: f64) -> &mut Self {
        self.pose.set_angle(degrees);
        self.follow_angle();
        self
    }

    pub fn rotate(&mut self, degrees: f64) -> &mut Self {
        let target = self.angle() + degrees;
        self.set_angle(target)
    }

    /// Rotation rate in degrees per tick.
    pub fn rotation(&self) -> f64 {
        self.rotation.rate()
    }

    pub fn set_rotation(&mut self, degrees: f64) -> &mut Self {
        self.rotation.set_rate(degrees);
        self
    }

    pub fn spin(&mut self, degrees: f64) -> &mut Self {
        let rate = self.rotation() + degrees;
        self.set_rotation(rate)
    }

    // --- Dilation ------------------------------------------------------------

    pub fn scale(&self) -> Vector {
        self.pose.scale()
    }

    /// Set scale, clamped per axis into the size bounds keeping each sign.
    pub fn set_scale(&mut self, scale: Vector) -> &mut Self {
        self.dilation.resize(&mut self.pose, scale);
        self
    }

    pub fn scale_x(&self) -> f64 {
        self.scale().x
    }

    pub fn set_scale_x(&mut self, x: f64) -> &mut Self {
        let y = self.scale().y;
        self.set_scale(DVec2::new(x, y))
    }

    pub fn scale_y(&self) -> f64 {
        self.scale().y
    }

    pub fn set_scale_y(&mut self, y: f64) -> &mut Self {
        let x = self.scale().x;
        self.set_scale(DVec2::new(x, y))
    }

    pub fn dilate(&mut self, change: Vector) -> &mut Self {
        let target = self.scale() + change;
        self.set_scale(target)
    }

    /// Dilation rate per tick.
    pub fn dilation(&self) -> Vector {
        self.dilation.rate()
    }

    pub fn set_dilation(&mut self, rate: Vector) -> &mut Self {
        self.dilation.set_rate(rate);
        self
    }

    pub fn dilation_x(&self) -> f64 {
        self.dilation().x
    }

    pub fn set_dilation_x(&mut self, x: f64) -> &mut Self {
        let y = self.dilation().y;
        self.set_dilation(DVec2::new(x, y))
    }

    pub fn dilation_y(&self) -> f64 {
        self.dilation().y
    }

    pub fn set_dilation_y(&mut self, y: f64) -> &mut Self {
        let x = self.dilation().x;
        self.set_dilation(DVec2::new(x, y))
    }

    pub fn stretch(&mut self, change: Vector) -> &mut Self {
        let rate = self.dilation() + change;
        self.set_dilation(rate)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ShapeKind::Circle { radius } => {
                write!(f, "Circle[{radius}]({})#{}", self.position(), self.id)
            }
            ShapeKind::Rectangle { width, height } => {
                write!(f, "Rectangle[{width}x{height}]({})#{}", self.position(), self.id)
            }
            ShapeKind::None => write!(f, "Shape({})#{}", self.position(), self.id),
        }
    }
}
