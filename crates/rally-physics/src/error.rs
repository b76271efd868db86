//! Error type for the physics boundary.

use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

/// Errors produced by [`PhysicsWorld`](crate::world::PhysicsWorld) queries
/// and by debug-render buffer validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PhysicsError {
    /// The rigid body handle does not refer to a live body.
    #[error("unknown rigid body {0:?}")]
    UnknownBody(RigidBodyHandle),

    /// The collider handle does not refer to a live collider.
    #[error("unknown collider {0:?}")]
    UnknownCollider(ColliderHandle),

    /// The body exists but its position is not driven by game logic.
    #[error("rigid body {0:?} is not kinematic")]
    NotKinematic(RigidBodyHandle),

    /// The endpoint buffer length is not a multiple of 4 floats.
    #[error("debug vertex buffer has {len} floats, expected a multiple of 4")]
    MisalignedVertices {
        /// Length of the rejected vertex buffer.
        len: usize,
    },

    /// The colour buffer does not carry 8 floats for every segment.
    #[error("debug color buffer has {colors} floats for {segments} segments, expected {expected}")]
    ColorMismatch {
        /// Number of segments in the vertex buffer.
        segments: usize,
        /// Length of the rejected colour buffer.
        colors: usize,
        /// Required colour buffer length.
        expected: usize,
    },
}
