//! Rally Physics -- rapier2d boundary for the rally pong sample.
//!
//! This crate wraps a rapier2d simulation behind a small API: create boxes,
//! step once per frame, move kinematic bodies, enumerate contacts, and read
//! the debug-render line buffer that the renderer turns into draw calls.
//!
//! # Quick Start
//!
//! ```
//! use glam::Vec2;
//! use rally_physics::prelude::*;
//!
//! let mut world = PhysicsWorld::new_zero_gravity();
//! world.add_fixed_cuboid(&CuboidDesc::new(Vec2::new(25.0, 0.5), Vec2::new(0.0, 15.5)));
//! world.step();
//!
//! let lines = world.debug_render();
//! assert!(lines.segment_count() > 0);
//! ```

#![deny(unsafe_code)]

pub mod debug;
pub mod error;
pub mod world;

pub use error::PhysicsError;

/// rapier handle types used across the public API.
pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::debug::{DebugLineSource, DebugRenderBuffer, LineSegment};
    pub use crate::error::PhysicsError;
    pub use crate::world::{CuboidDesc, PhysicsObject, PhysicsWorld};
    pub use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};
}
