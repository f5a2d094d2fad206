//! satbonk: 2D transforms and SAT collision events for circles and rectangles
//!
//! Shapes move, turn and grow by bounded per-tick rates. A [`World`] owns them, groups them in
//! layers and runs watchers that report edge-triggered `leave` / `enter` / `collide` /
//! `collide-inner` / `collide-outer` events between an actor and its targets.

pub mod types;
pub mod error;
pub mod geom;
pub mod transform;
pub mod shape;
pub mod api;
pub mod narrowphase;
pub mod world;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::error::{ConfigError, ParseEventError};
pub use crate::geom::{Crossing, Line, Point, Vector, VectorExt};
pub use crate::narrowphase::{Hull, Narrowphase};
pub use crate::shape::Shape;
pub use crate::world::{Listener, PairStates, Watcher, World};

/// Layer shapes join when no layer is named, and the target of layer-less subscriptions.
pub const DEFAULT_LAYER: &str = "default";
