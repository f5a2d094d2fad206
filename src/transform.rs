//! Per-tick transform model.
//!
//! A [`Pose`] holds position, angle and scale together with the world-space vertex ring.
//! Moves and turns replay the *change* onto the vertices; a scale change re-derives the ring
//! from the stored outline.
//! The three rate blocks ([`Translation`], [`Rotation`], [`Dilation`]) each own one rate and
//! its bounds and advance the pose through [`TransformAxis::tick`].

use glam::DVec2;
use tracing::trace;

use crate::error::ConfigError;
use crate::geom::{clamp_angle, Point, Vector, VectorExt};
use crate::types::Limits;

/// Placement of a shape and its vertices in world space.
#[derive(Clone, Debug)]
pub struct Pose {
    position: Point,
    /// Degrees, always in `[0, 360)`.
    angle: f64,
    scale: Vector,
    /// Vertex offsets at angle 0 and unit scale.
    outline: Vec<Point>,
    vertices: Vec<Point>,
}

impl Pose {
    /// Pose at the origin, unrotated, unit scale.
    pub fn new(outline: Vec<Point>) -> Self {
        Self {
            position: Point::ZERO,
            angle: 0.0,
            scale: DVec2::ONE,
            vertices: outline.clone(),
            outline,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn scale(&self) -> Vector {
        self.scale
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    pub fn outline(&self) -> &[Point] {
        &self.outline
    }

    /// Move to `position`, shifting every vertex by the same delta. Returns the delta.
    pub fn set_position(&mut self, position: Point) -> Vector {
        let delta = position - self.position;
        if delta == DVec2::ZERO {
            return delta;
        }
        let origin = self.position;
        self.position = position;
        for vertex in &mut self.vertices {
            vertex.translate(delta.x, delta.y);
        }
        trace!(%origin, ?delta, to = %position, "translated");
        delta
    }

    /// Set the angle (normalized) and rotate every vertex about the position by the
    /// difference from the previous angle. Returns that difference.
    pub fn set_angle(&mut self, degrees: f64) -> f64 {
        let origin = self.angle;
        self.angle = clamp_angle(degrees);
        let delta = self.angle - origin;
        if delta == 0.0 {
            return delta;
        }
        let pivot = self.position;
        for vertex in &mut self.vertices {
            vertex.rotate(pivot, delta);
        }
        trace!(origin, delta, to = self.angle, "rotated");
        delta
    }

    /// Set the scale. `scale` must already be clamped by the caller.
    ///
    /// The ring is re-derived from the outline rather than multiplied by `new / old`; a
    /// ratio replay loses the offsets for good once a component passes close to zero.
    pub fn set_scale(&mut self, scale: Vector) -> Vector {
        let origin = self.scale;
        let delta = scale - origin;
        if delta == DVec2::ZERO {
            return delta;
        }
        self.scale = scale;
        self.rebuild();
        trace!(?origin, ?delta, to = ?scale, "scaled");
        delta
    }

    /// Re-derive every vertex from the outline and the current pose.
    pub fn rebuild(&mut self) {
        let (position, angle, scale) = (self.position, self.angle, self.scale);
        self.vertices = self
            .outline
            .iter()
            .map(|offset| position + (offset.to_vector() * scale).rotated_deg(angle))
            .collect();
    }
}

/// One independently switchable transform axis.
pub trait TransformAxis {
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);
    /// Apply this axis' per-tick rate to `pose`.
    fn tick(&mut self, pose: &mut Pose, delta: f64);
}

/// Position axis: velocity with magnitude bounds.
#[derive(Clone, Debug)]
pub struct Translation {
    velocity: Vector,
    limits: Limits,
    enabled: bool,
}

impl Translation {
    pub fn new(limits: Limits) -> Result<Self, ConfigError> {
        limits.validate("speed")?;
        // with min > 0 there is no resting velocity; start along +x
        Ok(Self {
            velocity: DVec2::new(limits.min, 0.0),
            limits,
            enabled: true,
        })
    }

    pub fn velocity(&self) -> Vector {
        self.velocity
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn set_velocity(&mut self, velocity: Vector) {
        self.velocity = self.limits.clamp_magnitude(velocity);
    }

    /// Point the velocity along `degrees`, keeping its magnitude.
    pub fn steer(&mut self, degrees: f64) {
        if self.velocity != DVec2::ZERO {
            self.velocity = self.velocity.with_angle_deg(degrees);
        }
    }
}

impl TransformAxis for Translation {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn tick(&mut self, pose: &mut Pose, _delta: f64) {
        pose.set_position(pose.position() + self.velocity);
    }
}

/// Angle axis: rotation rate (degrees per tick) with magnitude bounds.
#[derive(Clone, Debug)]
pub struct Rotation {
    rate: f64,
    limits: Limits,
    enabled: bool,
}

impl Rotation {
    pub fn new(limits: Limits) -> Result<Self, ConfigError> {
        limits.validate("rotation")?;
        Ok(Self {
            rate: limits.min,
            limits,
            enabled: true,
        })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn set_rate(&mut self, degrees: f64) {
        self.rate = self.limits.clamp_signed(degrees);
    }
}

impl TransformAxis for Rotation {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn tick(&mut self, pose: &mut Pose, _delta: f64) {
        pose.set_angle(pose.angle() + self.rate);
    }
}

/// Scale axis: per-component dilation rate, bounded scale and bounded rate.
#[derive(Clone, Debug)]
pub struct Dilation {
    rate: Vector,
    size: Limits,
    growth: Limits,
    enabled: bool,
}

impl Dilation {
    pub fn new(size: Limits, growth: Limits) -> Result<Self, ConfigError> {
        size.validate("size")?;
        growth.validate("growth")?;
        Ok(Self {
            rate: DVec2::splat(growth.min),
            size,
            growth,
            enabled: true,
        })
    }

    pub fn rate(&self) -> Vector {
        self.rate
    }

    pub fn size_limits(&self) -> Limits {
        self.size
    }

    pub fn set_rate(&mut self, rate: Vector) {
        self.rate = DVec2::new(
            self.growth.clamp_signed(rate.x),
            self.growth.clamp_signed(rate.y),
        );
    }

    /// Clamp `scale` per axis (sign-preserving) and apply it to `pose`.
    pub fn resize(&self, pose: &mut Pose, scale: Vector) {
        let clamped = DVec2::new(self.size.clamp_signed(scale.x), self.size.clamp_signed(scale.y));
        pose.set_scale(clamped);
    }
}

impl TransformAxis for Dilation {
    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn tick(&mut self, pose: &mut Pose, _delta: f64) {
        let target = pose.scale() + self.rate;
        self.resize(pose, target);
    }
}
