use crate::core::Vec3;
use crate::systems::dynamics::{ColliderShape, EngineError, RigidBodyDesc};

/// A fixed collider
pub struct StaticBody {
    // === Shape ===
    pub shape: ColliderShape,
    /// World position (shape center)
    pub position: Vec3,
    /// Collision thickness added around the shape
    pub margin: f32,

    // === Bounding Box (AABB, margin included) ===
    pub aabb_min: Vec3,
    pub aabb_max: Vec3,

    // === Material ===
    /// Friction against cloth (0.0 = frictionless, 1.0 = sticky)
    pub friction: f32,
}

impl StaticBody {
    pub fn new(desc: &RigidBodyDesc) -> Result<Self, EngineError> {
        if desc.mass != 0.0 {
            return Err(EngineError::InvalidDescriptor(format!(
                "only static bodies are supported, got mass {}",
                desc.mass
            )));
        }
        if !desc.position.is_finite() {
            return Err(EngineError::InvalidDescriptor("body position must be finite".to_string()));
        }
        if !(desc.margin.is_finite() && desc.margin >= 0.0) {
            return Err(EngineError::InvalidDescriptor(format!("margin must be >= 0, got {}", desc.margin)));
        }
        let half = match desc.shape {
            ColliderShape::Box { half_extents } => half_extents,
            ColliderShape::Cylinder { radius, half_height } => Vec3::new(radius, half_height, radius),
            ColliderShape::Sphere { radius } => Vec3::splat(radius),
        };
        if !(half.is_finite() && half.x > 0.0 && half.y > 0.0 && half.z > 0.0) {
            return Err(EngineError::InvalidDescriptor(format!(
                "collider dimensions must be positive, got {:?}",
                desc.shape
            )));
        }

        let reach = half + Vec3::splat(desc.margin);
        Ok(Self {
            shape: desc.shape,
            position: desc.position,
            margin: desc.margin,
            aabb_min: desc.position - reach,
            aabb_max: desc.position + reach,
            friction: desc.friction.clamp(0.0, 1.0),
        })
    }

    /// Cheap reject before the exact shape test.
    #[inline]
    pub fn may_touch(&self, p: Vec3, thickness: f32) -> bool {
        p.x >= self.aabb_min.x - thickness
            && p.x <= self.aabb_max.x + thickness
            && p.y >= self.aabb_min.y - thickness
            && p.y <= self.aabb_max.y + thickness
            && p.z >= self.aabb_min.z - thickness
            && p.z <= self.aabb_max.z + thickness
    }
}
