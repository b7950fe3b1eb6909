//! Dynamics Engine Adapter boundary
//!
//! The session never touches integrator internals. It talks to a
//! `DynamicsBackend`: a world that owns static rigid bodies and cloth soft
//! bodies, hands out opaque handles, and advances everything with a fixed
//! internal step. `PbdWorld` is the in-crate implementation; tests swap in
//! doubles to exercise failure paths.

mod arena;
mod world;

use std::fmt;

use thiserror::Error;

use crate::core::Vec3;

pub use arena::Handle;
pub use world::PbdWorld;

/// Backend failures. Distinct from caller precondition violations: these mean
/// the engine refused something the session believed valid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("physics runtime failed to load: {0}")]
    LoadFailed(String),

    #[error("stale or unknown body handle {0}")]
    StaleHandle(Handle),

    #[error("node {index} out of range ({node_count} nodes)")]
    NodeOutOfRange { index: usize, node_count: usize },

    #[error("invalid body descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("body destruction failed: {0}")]
    DestroyFailed(String),
}

/// Handle to a rigid body owned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RigidHandle(pub(crate) Handle);

/// Handle to a soft body owned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SoftHandle(pub(crate) Handle);

impl fmt::Display for RigidHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rigid{}", self.0)
    }
}

impl fmt::Display for SoftHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "soft{}", self.0)
    }
}

/// World-wide parameters fixed at load time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    pub gravity: Vec3,
    pub fixed_time_step: f32,
    pub solver_iterations: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            fixed_time_step: 1.0 / 60.0,
            solver_iterations: 10,
        }
    }
}

/// Collision geometry of a rigid body, in engine terms (half sizes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColliderShape {
    Box { half_extents: Vec3 },
    /// Upright (y axis) cylinder.
    Cylinder { radius: f32, half_height: f32 },
    Sphere { radius: f32 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidBodyDesc {
    pub shape: ColliderShape,
    pub position: Vec3,
    /// Extra collision thickness around the shape.
    pub margin: f32,
    pub friction: f32,
    /// Zero means static. The in-crate world only supports static bodies.
    pub mass: f32,
}

/// Live soft-body coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftCoefficients {
    /// Structural link stiffness in [0, 1].
    pub linear_stiffness: f32,
    /// Shear (diagonal) link stiffness in [0, 1].
    pub area_stiffness: f32,
    /// Dynamic friction against rigid bodies in [0, 1].
    pub dynamic_friction: f32,
    /// Velocity damping per internal step in [0, 1].
    pub damping: f32,
    pub total_mass: f32,
}

/// Bending links connect nodes `distance` grid steps apart along each axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BendingRequest {
    pub distance: u32,
    pub stiffness: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClusterRequest {
    /// Let the engine pick a count from the node count.
    Automatic,
    /// Exactly this many clusters.
    Fixed(usize),
}

/// Rectangular patch of `res_x * res_y` nodes spanned by four corners.
///
/// Corner order is (0,0), (1,0), (0,1), (1,1) in patch coordinates; node
/// `iy * res_x + ix` lies at the bilinear blend of the corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoftPatchDesc {
    pub corners: [Vec3; 4],
    pub res_x: usize,
    pub res_y: usize,
    pub diagonal_links: bool,
    pub bending: Option<BendingRequest>,
    pub clusters: ClusterRequest,
    pub coefficients: SoftCoefficients,
    pub margin: f32,
    pub self_collision: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SoftBodyInfo {
    pub node_count: usize,
    pub link_count: usize,
    pub bending_link_count: usize,
    pub cluster_count: usize,
}

/// Bodies currently alive in the backend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiveBodies {
    pub rigid: usize,
    pub soft: usize,
}

impl LiveBodies {
    pub fn total(&self) -> usize {
        self.rigid + self.soft
    }
}

/// A physics world the session can drive.
///
/// Every method that takes a handle fails with `EngineError::StaleHandle`
/// once that body is removed.
pub trait DynamicsBackend {
    fn load(config: &WorldConfig) -> Result<Self, EngineError>
    where
        Self: Sized;

    fn add_rigid_body(&mut self, desc: &RigidBodyDesc) -> Result<RigidHandle, EngineError>;
    fn remove_rigid_body(&mut self, handle: RigidHandle) -> Result<(), EngineError>;

    fn add_soft_patch(&mut self, desc: &SoftPatchDesc) -> Result<SoftHandle, EngineError>;
    fn remove_soft_body(&mut self, handle: SoftHandle) -> Result<(), EngineError>;

    fn soft_body_info(&self, handle: SoftHandle) -> Result<SoftBodyInfo, EngineError>;
    fn soft_coefficients(&self, handle: SoftHandle) -> Result<SoftCoefficients, EngineError>;
    fn set_soft_coefficients(
        &mut self,
        handle: SoftHandle,
        coefficients: &SoftCoefficients,
    ) -> Result<(), EngineError>;

    fn node_position(&self, handle: SoftHandle, node: usize) -> Result<Vec3, EngineError>;
    fn node_velocity(&self, handle: SoftHandle, node: usize) -> Result<Vec3, EngineError>;
    /// Overwrite one node's position and velocity.
    fn set_node_state(
        &mut self,
        handle: SoftHandle,
        node: usize,
        position: Vec3,
        velocity: Vec3,
    ) -> Result<(), EngineError>;
    fn node_inverse_mass(&self, handle: SoftHandle, node: usize) -> Result<f32, EngineError>;
    /// Zero makes the node immovable.
    fn set_node_inverse_mass(&mut self, handle: SoftHandle, node: usize, inverse_mass: f32) -> Result<(), EngineError>;

    /// Copy node positions as packed xyz into `out` (length `3 * node_count`).
    fn read_node_positions(&self, handle: SoftHandle, out: &mut [f32]) -> Result<(), EngineError>;

    /// Advance by `dt` seconds using at most `max_sub_steps` internal steps.
    /// Returns the number of internal steps taken.
    fn step_simulation(&mut self, dt: f32, max_sub_steps: u32) -> u32;

    fn live_bodies(&self) -> LiveBodies;
}
