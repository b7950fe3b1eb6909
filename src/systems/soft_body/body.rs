use crate::core::Vec3;
use crate::systems::dynamics::{ClusterRequest, EngineError, SoftBodyInfo, SoftCoefficients, SoftPatchDesc};

use super::clusters::{self, Cluster};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    /// Grid neighbours along x or z
    Structural,
    /// Quad diagonal
    Shear,
    /// Skips `distance - 1` nodes, resists folding
    Bending,
}

/// Distance constraint between two nodes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Link {
    pub a: u32,
    pub b: u32,
    pub rest: f32,
    pub kind: LinkKind,
}

/// Cloth patch: node state, link graph and clusters
pub struct SoftBody {
    // === Node State ===
    pub positions: Vec<Vec3>,
    pub velocities: Vec<Vec3>,
    /// Zero pins the node in place
    pub inverse_mass: Vec<f32>,
    /// Scratch buffer for the solver
    pub(super) predicted: Vec<Vec3>,

    // === Topology ===
    pub res_x: usize,
    pub res_y: usize,
    pub links: Vec<Link>,
    pub bending_links: usize,
    pub clusters: Vec<Cluster>,

    // === Material ===
    pub coefficients: SoftCoefficients,
    /// Fixed when the patch is built
    pub bending_stiffness: f32,
    /// Collision thickness of each node
    pub margin: f32,
    pub self_collision: bool,
}

impl SoftBody {
    /// Build a rectangular patch.
    ///
    /// Node `iy * res_x + ix` sits at the bilinear blend of the four corners.
    /// Structural links join grid neighbours, shear links alternate between
    /// the two quad diagonals, bending links span `distance` nodes.
    pub fn from_patch(desc: &SoftPatchDesc) -> Result<Self, EngineError> {
        validate_patch(desc)?;

        let (rx, ry) = (desc.res_x, desc.res_y);
        let n = rx * ry;
        let [c00, c10, c01, c11] = desc.corners;

        let mut positions = Vec::with_capacity(n);
        for iy in 0..ry {
            let ty = iy as f32 / (ry - 1) as f32;
            let row0 = lerp(c00, c01, ty);
            let row1 = lerp(c10, c11, ty);
            for ix in 0..rx {
                let tx = ix as f32 / (rx - 1) as f32;
                positions.push(lerp(row0, row1, tx));
            }
        }

        let idx = |ix: usize, iy: usize| (iy * rx + ix) as u32;
        let mut links = Vec::new();
        let push = |links: &mut Vec<Link>, a: u32, b: u32, kind: LinkKind| {
            let rest = (positions[b as usize] - positions[a as usize]).length();
            links.push(Link { a, b, rest, kind });
        };

        for iy in 0..ry {
            for ix in 0..rx {
                if ix + 1 < rx {
                    push(&mut links, idx(ix, iy), idx(ix + 1, iy), LinkKind::Structural);
                }
                if iy + 1 < ry {
                    push(&mut links, idx(ix, iy), idx(ix, iy + 1), LinkKind::Structural);
                }
                if desc.diagonal_links && ix + 1 < rx && iy + 1 < ry {
                    if (ix + iy) & 1 == 1 {
                        push(&mut links, idx(ix, iy), idx(ix + 1, iy + 1), LinkKind::Shear);
                    } else {
                        push(&mut links, idx(ix + 1, iy), idx(ix, iy + 1), LinkKind::Shear);
                    }
                }
            }
        }

        let mut bending_links = 0;
        let mut bending_stiffness = 0.0;
        if let Some(bending) = desc.bending.filter(|b| b.stiffness > 0.0) {
            let d = bending.distance as usize;
            bending_stiffness = bending.stiffness;
            let before = links.len();
            for iy in 0..ry {
                for ix in 0..rx {
                    if ix + d < rx {
                        push(&mut links, idx(ix, iy), idx(ix + d, iy), LinkKind::Bending);
                    }
                    if iy + d < ry {
                        push(&mut links, idx(ix, iy), idx(ix, iy + d), LinkKind::Bending);
                    }
                }
            }
            bending_links = links.len() - before;
        }

        let clusters = clusters::generate(&positions, desc.clusters);
        let node_inv_mass = n as f32 / desc.coefficients.total_mass;

        Ok(Self {
            predicted: positions.clone(),
            velocities: vec![Vec3::zero(); n],
            inverse_mass: vec![node_inv_mass; n],
            positions,
            res_x: rx,
            res_y: ry,
            links,
            bending_links,
            clusters,
            coefficients: desc.coefficients,
            bending_stiffness,
            margin: desc.margin,
            self_collision: desc.self_collision,
        })
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.positions.len()
    }

    /// Grid coordinates of a node
    #[inline]
    pub fn grid_coords(&self, node: usize) -> (usize, usize) {
        (node % self.res_x, node / self.res_x)
    }

    pub fn info(&self) -> SoftBodyInfo {
        SoftBodyInfo {
            node_count: self.node_count(),
            link_count: self.links.len(),
            bending_link_count: self.bending_links,
            cluster_count: self.clusters.len(),
        }
    }

    pub fn check_node(&self, node: usize) -> Result<(), EngineError> {
        if node < self.node_count() {
            Ok(())
        } else {
            Err(EngineError::NodeOutOfRange { index: node, node_count: self.node_count() })
        }
    }

    /// Replace live coefficients. A new total mass is spread over the nodes
    /// again; pinned nodes stay pinned.
    pub fn set_coefficients(&mut self, coefficients: &SoftCoefficients) -> Result<(), EngineError> {
        validate_coefficients(coefficients)?;
        if coefficients.total_mass != self.coefficients.total_mass {
            let node_inv_mass = self.node_count() as f32 / coefficients.total_mass;
            for w in self.inverse_mass.iter_mut().filter(|w| **w != 0.0) {
                *w = node_inv_mass;
            }
        }
        self.coefficients = *coefficients;
        Ok(())
    }
}

#[inline]
fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
    a + (b - a) * t
}

fn validate_patch(desc: &SoftPatchDesc) -> Result<(), EngineError> {
    if desc.res_x < 2 || desc.res_y < 2 {
        return Err(EngineError::InvalidDescriptor(format!(
            "patch needs at least 2x2 nodes, got {}x{}",
            desc.res_x, desc.res_y
        )));
    }
    if desc.res_x.checked_mul(desc.res_y).map_or(true, |n| n > u32::MAX as usize) {
        return Err(EngineError::InvalidDescriptor("patch has too many nodes".to_string()));
    }
    if !desc.corners.iter().all(Vec3::is_finite) {
        return Err(EngineError::InvalidDescriptor("patch corners must be finite".to_string()));
    }
    if !(desc.margin.is_finite() && desc.margin >= 0.0) {
        return Err(EngineError::InvalidDescriptor(format!("margin must be >= 0, got {}", desc.margin)));
    }
    if let Some(bending) = desc.bending {
        if bending.distance < 2 || !(0.0..=1.0).contains(&bending.stiffness) {
            return Err(EngineError::InvalidDescriptor(format!("invalid bending request {:?}", bending)));
        }
    }
    if desc.clusters == ClusterRequest::Fixed(0) {
        return Err(EngineError::InvalidDescriptor("fixed cluster count must be >= 1".to_string()));
    }
    validate_coefficients(&desc.coefficients)
}

fn validate_coefficients(c: &SoftCoefficients) -> Result<(), EngineError> {
    for (name, value) in [
        ("linear stiffness", c.linear_stiffness),
        ("area stiffness", c.area_stiffness),
        ("dynamic friction", c.dynamic_friction),
        ("damping", c.damping),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(EngineError::InvalidDescriptor(format!("{} must be within [0, 1], got {}", name, value)));
        }
    }
    if !(c.total_mass.is_finite() && c.total_mass > 0.0) {
        return Err(EngineError::InvalidDescriptor(format!("total mass must be > 0, got {}", c.total_mass)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::dynamics::BendingRequest;
    use approx::assert_abs_diff_eq;

    fn patch(res: usize, bending: Option<BendingRequest>) -> SoftPatchDesc {
        SoftPatchDesc {
            corners: [
                Vec3::new(-1.0, 5.0, -1.0),
                Vec3::new(1.0, 5.0, -1.0),
                Vec3::new(-1.0, 5.0, 1.0),
                Vec3::new(1.0, 5.0, 1.0),
            ],
            res_x: res,
            res_y: res,
            diagonal_links: true,
            bending,
            clusters: ClusterRequest::Automatic,
            coefficients: SoftCoefficients {
                linear_stiffness: 0.9,
                area_stiffness: 0.9,
                dynamic_friction: 0.2,
                damping: 0.0,
                total_mass: 0.5,
            },
            margin: 0.1,
            self_collision: false,
        }
    }

    #[test]
    fn grid_layout_is_row_major_along_z() {
        let body = SoftBody::from_patch(&patch(3, None)).unwrap();
        assert_eq!(body.node_count(), 9);
        assert_eq!(body.positions[0], Vec3::new(-1.0, 5.0, -1.0));
        assert_eq!(body.positions[2], Vec3::new(1.0, 5.0, -1.0));
        assert_eq!(body.positions[6], Vec3::new(-1.0, 5.0, 1.0));
        assert_abs_diff_eq!(body.positions[4].x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(body.positions[4].z, 0.0, epsilon = 1e-6);
        assert_eq!(body.grid_coords(5), (2, 1));
    }

    #[test]
    fn link_counts_for_small_grid() {
        // 3x3 nodes: 12 structural, 4 shear
        let body = SoftBody::from_patch(&patch(3, None)).unwrap();
        assert_eq!(body.links.len(), 16);
        assert_eq!(body.bending_links, 0);

        let bent = SoftBody::from_patch(&patch(3, Some(BendingRequest { distance: 2, stiffness: 0.5 }))).unwrap();
        assert_eq!(bent.bending_links, 6);
        assert_eq!(bent.info().link_count, 22);
    }

    #[test]
    fn zero_bending_stiffness_builds_no_bending_links() {
        let body = SoftBody::from_patch(&patch(4, Some(BendingRequest { distance: 2, stiffness: 0.0 }))).unwrap();
        assert_eq!(body.bending_links, 0);
    }

    #[test]
    fn mass_is_spread_evenly_and_pins_survive_mass_change() {
        let mut body = SoftBody::from_patch(&patch(2, None)).unwrap();
        assert_abs_diff_eq!(body.inverse_mass[0], 8.0, epsilon = 1e-5);

        body.inverse_mass[1] = 0.0;
        let mut c = body.coefficients;
        c.total_mass = 2.0;
        body.set_coefficients(&c).unwrap();
        assert_abs_diff_eq!(body.inverse_mass[0], 2.0, epsilon = 1e-5);
        assert_eq!(body.inverse_mass[1], 0.0);
    }

    #[test]
    fn single_row_patch_is_rejected() {
        let mut desc = patch(3, None);
        desc.res_y = 1;
        assert!(matches!(SoftBody::from_patch(&desc), Err(EngineError::InvalidDescriptor(_))));
    }
}
