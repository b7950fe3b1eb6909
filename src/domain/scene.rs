//! Scene descriptors: what the caller asks the session to build.

use serde::{Deserialize, Serialize};

use crate::core::Vec3;

use super::error::PreconditionViolation;
use super::material::ClothMaterial;

/// Obstacle choices offered to the caller. `None` builds nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObstacleKind {
    Cylinder,
    Sphere,
    Box,
    None,
}

impl ObstacleKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cylinder" => Some(ObstacleKind::Cylinder),
            "sphere" => Some(ObstacleKind::Sphere),
            "box" => Some(ObstacleKind::Box),
            "none" | "" => Some(ObstacleKind::None),
            _ => None,
        }
    }
}

/// Kind of a built rigid body, as recorded in the scene registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Ground,
    Cylinder,
    Sphere,
    Box,
}

/// Shape of a built rigid body. Dimensions are full sizes as the caller gave
/// them (radius, height), not engine half extents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    pub dimensions: Vec3,
    pub position: Vec3,
}

/// Rectangular patch layout. Nodes are laid out row by row along +z, with x
/// varying fastest: node `iy * (segments_w + 1) + ix`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothTopology {
    pub width: f32,
    pub height: f32,
    pub segments_w: u32,
    pub segments_h: u32,
    pub origin: Vec3,
}

impl ClothTopology {
    /// Node indices are stored as `u32` by the engine.
    pub const MAX_NODES: u32 = u32::MAX;

    pub fn nodes_w(&self) -> usize {
        self.segments_w as usize + 1
    }

    pub fn nodes_h(&self) -> usize {
        self.segments_h as usize + 1
    }

    pub fn node_count(&self) -> usize {
        self.nodes_w() * self.nodes_h()
    }

    /// Corners in patch order: (-x,-z), (+x,-z), (-x,+z), (+x,+z).
    pub fn corners(&self) -> [Vec3; 4] {
        let hw = self.width / 2.0;
        let hh = self.height / 2.0;
        let o = self.origin;
        [
            Vec3::new(o.x - hw, o.y, o.z - hh),
            Vec3::new(o.x + hw, o.y, o.z - hh),
            Vec3::new(o.x - hw, o.y, o.z + hh),
            Vec3::new(o.x + hw, o.y, o.z + hh),
        ]
    }

    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        if !(self.width.is_finite() && self.width > 0.0 && self.height.is_finite() && self.height > 0.0) {
            return Err(PreconditionViolation::InvalidTopology(format!(
                "cloth size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.segments_w == 0 || self.segments_h == 0 {
            return Err(PreconditionViolation::InvalidTopology(format!(
                "cloth needs at least one segment per side, got {}x{}",
                self.segments_w, self.segments_h
            )));
        }
        let nodes = (u64::from(self.segments_w) + 1).checked_mul(u64::from(self.segments_h) + 1);
        if nodes.map_or(true, |n| n > u64::from(Self::MAX_NODES)) {
            return Err(PreconditionViolation::InvalidTopology(format!(
                "{}x{} segments exceed the {} node limit",
                self.segments_w,
                self.segments_h,
                Self::MAX_NODES
            )));
        }
        if !self.origin.is_finite() {
            return Err(PreconditionViolation::InvalidTopology("cloth origin must be finite".to_string()));
        }
        Ok(())
    }
}

/// Everything `create_cloth` needs.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothSpec {
    #[serde(flatten)]
    pub topology: ClothTopology,
    #[serde(default)]
    pub material: ClothMaterial,
}

impl ClothSpec {
    pub fn new(width: f32, height: f32, segments_w: u32, segments_h: u32, origin: Vec3, material: ClothMaterial) -> Self {
        Self {
            topology: ClothTopology { width, height, segments_w, segments_h, origin },
            material,
        }
    }

    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        self.topology.validate()?;
        self.material.validate()
    }
}

/// Metadata returned by `create_cloth`, used downstream to size buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClothInfo {
    pub node_count: usize,
    pub nodes_w: usize,
    pub nodes_h: usize,
}

/// Obstacle part of a scene recipe.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObstacleSpec {
    pub kind: ObstacleKind,
    pub radius: f32,
    pub height: f32,
    pub position: Vec3,
}

/// A complete scene, built as reset → ground → obstacle → cloth.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecipe {
    pub obstacle: ObstacleSpec,
    pub cloth: ClothSpec,
}

impl SceneRecipe {
    pub const SAMPLE_CLOTH_SIZE: f32 = 6.0;

    /// The drape demo: a cylinder standing on the ground with a square cloth
    /// two units above its top.
    pub fn sample(radius: f32, height: f32, segments: u32) -> Self {
        Self {
            obstacle: ObstacleSpec {
                kind: ObstacleKind::Cylinder,
                radius,
                height,
                position: Vec3::new(0.0, height / 2.0, 0.0),
            },
            cloth: ClothSpec::new(
                Self::SAMPLE_CLOTH_SIZE,
                Self::SAMPLE_CLOTH_SIZE,
                segments,
                segments,
                Vec3::new(0.0, height + 2.0, 0.0),
                ClothMaterial::default(),
            ),
        }
    }

    pub fn with_material(mut self, material: ClothMaterial) -> Self {
        self.cloth.material = material;
        self
    }
}
