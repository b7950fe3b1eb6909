use crate::core::Vec3;
use crate::systems::dynamics::ColliderShape;

use super::body::StaticBody;

/// Result of pushing a point out of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Closest point on the inflated surface.
    pub position: Vec3,
    /// Outward surface normal at `position`.
    pub normal: Vec3,
    /// How far inside the inflated surface the point was.
    pub depth: f32,
}

impl StaticBody {
    /// Project `p` out of this body inflated by its margin plus `thickness`.
    ///
    /// Returns `None` when the point is already outside.
    pub fn project_out(&self, p: Vec3, thickness: f32) -> Option<Contact> {
        if !self.may_touch(p, thickness) {
            return None;
        }
        let inflate = self.margin + thickness;
        let local = p - self.position;

        let (local_hit, normal, depth) = match self.shape {
            ColliderShape::Box { half_extents } => project_box(local, half_extents + Vec3::splat(inflate))?,
            ColliderShape::Cylinder { radius, half_height } => {
                project_cylinder(local, radius + inflate, half_height + inflate)?
            }
            ColliderShape::Sphere { radius } => project_sphere(local, radius + inflate)?,
        };

        Some(Contact {
            position: self.position + local_hit,
            normal,
            depth,
        })
    }
}

#[inline]
fn sign(v: f32) -> f32 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Push out along the axis of least penetration.
fn project_box(local: Vec3, extents: Vec3) -> Option<(Vec3, Vec3, f32)> {
    let pen = Vec3::new(
        extents.x - local.x.abs(),
        extents.y - local.y.abs(),
        extents.z - local.z.abs(),
    );
    if pen.x <= 0.0 || pen.y <= 0.0 || pen.z <= 0.0 {
        return None;
    }

    let mut hit = local;
    if pen.y <= pen.x && pen.y <= pen.z {
        hit.y = extents.y * sign(local.y);
        Some((hit, Vec3::new(0.0, sign(local.y), 0.0), pen.y))
    } else if pen.x <= pen.z {
        hit.x = extents.x * sign(local.x);
        Some((hit, Vec3::new(sign(local.x), 0.0, 0.0), pen.x))
    } else {
        hit.z = extents.z * sign(local.z);
        Some((hit, Vec3::new(0.0, 0.0, sign(local.z)), pen.z))
    }
}

/// Upright cylinder: either out through a cap or out through the side.
fn project_cylinder(local: Vec3, radius: f32, half_height: f32) -> Option<(Vec3, Vec3, f32)> {
    let radial = (local.x * local.x + local.z * local.z).sqrt();
    let pen_side = radius - radial;
    let pen_cap = half_height - local.y.abs();
    if pen_side <= 0.0 || pen_cap <= 0.0 {
        return None;
    }

    if pen_cap <= pen_side {
        let hit = Vec3::new(local.x, half_height * sign(local.y), local.z);
        return Some((hit, Vec3::new(0.0, sign(local.y), 0.0), pen_cap));
    }

    let dir = if radial > 1e-6 {
        Vec3::new(local.x / radial, 0.0, local.z / radial)
    } else {
        Vec3::new(1.0, 0.0, 0.0)
    };
    let hit = Vec3::new(dir.x * radius, local.y, dir.z * radius);
    Some((hit, dir, pen_side))
}

fn project_sphere(local: Vec3, radius: f32) -> Option<(Vec3, Vec3, f32)> {
    let dist = local.length();
    if dist >= radius {
        return None;
    }
    let dir = if dist > 1e-6 { local * (1.0 / dist) } else { Vec3::UP };
    Some((dir * radius, dir, radius - dist))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::dynamics::RigidBodyDesc;
    use approx::assert_abs_diff_eq;

    fn body(shape: ColliderShape, position: Vec3, margin: f32) -> StaticBody {
        StaticBody::new(&RigidBodyDesc { shape, position, margin, friction: 0.5, mass: 0.0 }).unwrap()
    }

    #[test]
    fn ground_pushes_up_to_inflated_top() {
        let ground = body(
            ColliderShape::Box { half_extents: Vec3::new(50.0, 0.5, 50.0) },
            Vec3::new(0.0, -0.5, 0.0),
            0.05,
        );
        let contact = ground.project_out(Vec3::new(3.0, -0.1, 2.0), 0.1).unwrap();
        assert_abs_diff_eq!(contact.position.y, 0.15, epsilon = 1e-5);
        assert_eq!(contact.normal, Vec3::UP);
        assert_eq!(contact.position.x, 3.0);
        assert_abs_diff_eq!(contact.depth, 0.25, epsilon = 1e-5);
        assert!(ground.project_out(Vec3::new(0.0, 0.5, 0.0), 0.1).is_none());
    }

    #[test]
    fn cylinder_top_cap_catches_node_near_axis() {
        let cyl = body(
            ColliderShape::Cylinder { radius: 2.0, half_height: 2.0 },
            Vec3::new(0.0, 2.0, 0.0),
            0.1,
        );
        let contact = cyl.project_out(Vec3::new(0.5, 4.05, 0.0), 0.1).unwrap();
        assert_abs_diff_eq!(contact.position.y, 4.2, epsilon = 1e-5);
        assert_eq!(contact.normal, Vec3::UP);
    }

    #[test]
    fn cylinder_side_pushes_radially() {
        let cyl = body(
            ColliderShape::Cylinder { radius: 2.0, half_height: 2.0 },
            Vec3::new(0.0, 2.0, 0.0),
            0.0,
        );
        let contact = cyl.project_out(Vec3::new(0.0, 2.0, 1.9), 0.0).unwrap();
        assert_abs_diff_eq!(contact.position.z, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(contact.normal.z, 1.0, epsilon = 1e-6);
        assert!(cyl.project_out(Vec3::new(0.0, 2.0, 2.5), 0.0).is_none());
    }

    #[test]
    fn sphere_projects_to_surface() {
        let sphere = body(ColliderShape::Sphere { radius: 1.0 }, Vec3::zero(), 0.0);
        let contact = sphere.project_out(Vec3::new(0.0, 0.0, 0.5), 0.0).unwrap();
        assert_abs_diff_eq!(contact.position.z, 1.0, epsilon = 1e-6);
        assert!(sphere.project_out(Vec3::new(0.8, 0.8, 0.0), 0.0).is_none());
    }
}
