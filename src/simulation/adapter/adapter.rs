//! Dynamics Engine Adapter
//!
//! Pure translation from scene and material requests to backend descriptors.
//! Owns no state; every function here is deterministic in its inputs.

use crate::core::Vec3;
use crate::domain::{
    ClothSpec, EngineConfig, GroundConfig, LiveMaterial, MaterialUpdate, ObstacleKind, PreconditionViolation,
    ShapeDescriptor, ShapeKind,
};
use crate::systems::dynamics::{
    BendingRequest, ClusterRequest, ColliderShape, RigidBodyDesc, SoftCoefficients, SoftPatchDesc, WorldConfig,
};

/// Largest cloth that still gets automatic cluster generation.
pub const AUTO_CLUSTER_NODE_LIMIT: usize = 2500;

/// Cluster count used above `AUTO_CLUSTER_NODE_LIMIT`. Automatic generation
/// on very dense cloth exhausts the runtime, so the count is pinned.
pub const FALLBACK_CLUSTER_COUNT: usize = 16;

/// Upper bound on internal steps per `step` call, independent of dt.
pub const MAX_SUB_STEPS: u32 = 10;

/// Bending links skip one node.
pub const BENDING_LINK_DISTANCE: u32 = 2;

pub fn world_config(config: &EngineConfig) -> WorldConfig {
    WorldConfig {
        gravity: config.gravity,
        fixed_time_step: config.fixed_time_step,
        solver_iterations: config.solver_iterations,
    }
}

pub fn cluster_request(node_count: usize) -> ClusterRequest {
    if node_count <= AUTO_CLUSTER_NODE_LIMIT {
        ClusterRequest::Automatic
    } else {
        ClusterRequest::Fixed(FALLBACK_CLUSTER_COUNT)
    }
}

pub fn ground_desc(ground: &GroundConfig) -> (RigidBodyDesc, ShapeDescriptor) {
    let desc = RigidBodyDesc {
        shape: ColliderShape::Box { half_extents: ground.half_extents },
        position: ground.center,
        margin: ground.margin,
        friction: ground.friction,
        mass: 0.0,
    };
    let shape = ShapeDescriptor {
        kind: ShapeKind::Ground,
        dimensions: ground.half_extents * 2.0,
        position: ground.center,
    };
    (desc, shape)
}

/// Descriptor for the obstacle, or `None` for `ObstacleKind::None`.
///
/// Cylinders stand on their axis (y) with half extents `(r, h/2, r)`. A box
/// obstacle is `2r x h x 2r`; a sphere ignores `height`.
pub fn obstacle_desc(
    kind: ObstacleKind,
    radius: f32,
    height: f32,
    position: Vec3,
    config: &EngineConfig,
) -> Result<Option<(RigidBodyDesc, ShapeDescriptor)>, PreconditionViolation> {
    if kind == ObstacleKind::None {
        return Ok(None);
    }
    if !position.is_finite() {
        return Err(PreconditionViolation::NonFinitePosition("create_obstacle"));
    }
    if !(radius.is_finite() && radius > 0.0) {
        return Err(PreconditionViolation::InvalidObstacle(format!("radius must be > 0, got {}", radius)));
    }
    let needs_height = matches!(kind, ObstacleKind::Cylinder | ObstacleKind::Box);
    if needs_height && !(height.is_finite() && height > 0.0) {
        return Err(PreconditionViolation::InvalidObstacle(format!("height must be > 0, got {}", height)));
    }

    let (shape, shape_kind, dimensions) = match kind {
        ObstacleKind::Cylinder => (
            ColliderShape::Cylinder { radius, half_height: height / 2.0 },
            ShapeKind::Cylinder,
            Vec3::new(radius, height, radius),
        ),
        ObstacleKind::Sphere => (ColliderShape::Sphere { radius }, ShapeKind::Sphere, Vec3::splat(radius)),
        ObstacleKind::Box => (
            ColliderShape::Box { half_extents: Vec3::new(radius, height / 2.0, radius) },
            ShapeKind::Box,
            Vec3::new(radius * 2.0, height, radius * 2.0),
        ),
        ObstacleKind::None => return Ok(None),
    };

    let desc = RigidBodyDesc {
        shape,
        position,
        margin: config.obstacle_margin,
        friction: config.obstacle_friction,
        mass: 0.0,
    };
    Ok(Some((desc, ShapeDescriptor { kind: shape_kind, dimensions, position })))
}

/// Live material to engine coefficients. Stiffness drives both structural
/// and shear links.
pub fn coefficients_for(live: &LiveMaterial) -> SoftCoefficients {
    SoftCoefficients {
        linear_stiffness: live.stiffness,
        area_stiffness: live.stiffness,
        dynamic_friction: live.friction,
        damping: live.damping,
        total_mass: live.mass,
    }
}

/// Apply a partial update. Coefficients the update does not name keep their
/// current values bit for bit.
pub fn apply_update(current: &SoftCoefficients, update: &MaterialUpdate) -> SoftCoefficients {
    let mut next = *current;
    if let Some(stiffness) = update.stiffness {
        next.linear_stiffness = stiffness;
        next.area_stiffness = stiffness;
    }
    if let Some(friction) = update.friction {
        next.dynamic_friction = friction;
    }
    if let Some(damping) = update.damping {
        next.damping = damping;
    }
    if let Some(mass) = update.mass {
        next.total_mass = mass;
    }
    next
}

pub fn patch_desc(spec: &ClothSpec, config: &EngineConfig) -> SoftPatchDesc {
    let topology = &spec.topology;
    let bending_factor = spec.material.bending_factor();
    SoftPatchDesc {
        corners: topology.corners(),
        res_x: topology.nodes_w(),
        res_y: topology.nodes_h(),
        diagonal_links: true,
        bending: (bending_factor > 0.0).then_some(BendingRequest {
            distance: BENDING_LINK_DISTANCE,
            stiffness: bending_factor,
        }),
        clusters: cluster_request(topology.node_count()),
        coefficients: coefficients_for(&spec.material.live),
        margin: config.cloth_margin,
        self_collision: config.self_collision,
    }
}
