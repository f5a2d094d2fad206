use crate::geom::{Point, Vector};
use crate::narrowphase::Hull;
use crate::shape::Shape;
use crate::types::*;

/// Public API contract for the collision world.
pub trait CollisionWorldApi {
    /// Construct a new, empty world with the given configuration.
    fn new(cfg: WorldConfig) -> Self
    where
        Self: Sized;

    // --- Membership --------------------------------------------------------

    /// Take ownership of `shape` and put it in the default layer.
    fn insert(&mut self, shape: Shape) -> ShapeId;

    /// Take ownership of `shape` and put it in `layer`.
    fn insert_into(&mut self, shape: Shape, layer: &str) -> ShapeId;

    /// Idempotent layer insert. Returns false when the shape is unknown or already a member.
    fn add(&mut self, id: ShapeId, layer: &str) -> bool;

    /// Idempotent layer removal. Returns false when the shape was not a member.
    fn remove(&mut self, id: ShapeId, layer: &str) -> bool;

    /// Drop a shape: leave every layer, detach its watchers, forget every pair state
    /// involving it.
    fn despawn(&mut self, id: ShapeId) -> Option<Shape>;

    // --- Subscriptions -----------------------------------------------------

    /// Register `listener` for `kind` on the watcher of `actor` against `target`, creating
    /// the watcher on first use. Returns false if the world does not own `actor`.
    fn on<F>(&mut self, actor: ShapeId, kind: EventKind, target: impl Into<Target>, listener: F) -> bool
    where
        F: FnMut(&Event) + 'static;

    /// Like [`CollisionWorldApi::on`] with the event given by name. Unknown names are
    /// logged and ignored.
    fn on_named<F>(&mut self, actor: ShapeId, event: &str, target: impl Into<Target>, listener: F) -> bool
    where
        F: FnMut(&Event) + 'static;

    /// Remove every listener for `kind` on one watcher. Returns how many were removed.
    fn off(&mut self, actor: ShapeId, kind: EventKind, target: impl Into<Target>) -> usize;

    /// Drop every watcher of `actor`. Returns how many were dropped.
    fn off_all(&mut self, actor: ShapeId) -> usize;

    // --- Ticking -----------------------------------------------------------

    /// Transform one shape, then run its watchers.
    fn run(&mut self, id: ShapeId, delta: f64);

    /// Transform every shape, then run every watcher.
    fn step(&mut self, delta: f64);

    /// Drain and return the journal of emitted events.
    fn drain_events(&mut self) -> Vec<Event>;

    // --- Queries -----------------------------------------------------------

    /// Current relationship of two shapes, without touching any stored state.
    fn check(&self, actor: ShapeId, interactor: ShapeId) -> Option<CollisionState>;

    /// Inclusive point containment for one shape.
    fn contains(&self, id: ShapeId, point: Point) -> bool;

    fn debug_stats(&self) -> WorldStats;
}

/// Narrowphase primitives shared by the world and by [`Shape::contains`].
pub trait NarrowphaseApi {
    // SAT building blocks ---------------------------------------------------

    fn project(hull: &Hull<'_>, axis: Vector) -> Projection;
    fn axes(hull: &Hull<'_>, other: &Hull<'_>) -> Vec<Vector>;
    fn separating_axis(a: &Hull<'_>, b: &Hull<'_>) -> SatState;

    // Specializations -------------------------------------------------------

    fn circle_circle(c0: Point, r0: f64, c1: Point, r1: f64) -> SatState;

    // Shape-level dispatch --------------------------------------------------

    fn classify(actor: &Shape, interactor: &Shape) -> Option<SatState>;
    fn contains_point(shape: &Shape, point: Point) -> bool;
}
