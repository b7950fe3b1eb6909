//! Cloth material
//!
//! Material parameters come in two kinds that must never be confused:
//!
//! - **Live** (`LiveMaterial`): stiffness, friction, damping, mass. These map
//!   onto coefficients of an existing soft body and can change at any time
//!   through a `MaterialUpdate`.
//! - **Structural** (`StructuralMaterial`): bending factor. Bending is built
//!   into the link graph when the patch is created, so changing it needs a
//!   full rebuild. `MaterialUpdate` has no bending field on purpose.

use serde::{Deserialize, Serialize};

use super::error::PreconditionViolation;

/// Named starting points for the control panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MaterialPreset {
    Cotton,
    Silk,
    Denim,
    Leather,
    Rubber,
}

impl MaterialPreset {
    pub const ALL: [MaterialPreset; 5] = [
        MaterialPreset::Cotton,
        MaterialPreset::Silk,
        MaterialPreset::Denim,
        MaterialPreset::Leather,
        MaterialPreset::Rubber,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "cotton" => Some(MaterialPreset::Cotton),
            "silk" => Some(MaterialPreset::Silk),
            "denim" => Some(MaterialPreset::Denim),
            "leather" => Some(MaterialPreset::Leather),
            "rubber" => Some(MaterialPreset::Rubber),
            _ => None,
        }
    }
}

/// Coefficients that can be applied to a live soft body.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMaterial {
    /// Link stiffness in [0, 1].
    pub stiffness: f32,
    /// Dynamic friction against rigid bodies in [0, 1].
    pub friction: f32,
    /// Velocity damping per internal step in [0, 1].
    pub damping: f32,
    /// Total cloth mass, spread evenly over the nodes.
    pub mass: f32,
}

/// Parameters baked into the constraint graph at build time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralMaterial {
    /// Bending link stiffness in [0, 1]. Zero builds no bending links.
    pub bending_factor: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClothMaterial {
    #[serde(flatten)]
    pub live: LiveMaterial,
    #[serde(flatten)]
    pub structural: StructuralMaterial,
}

impl Default for ClothMaterial {
    /// The values the drape scene has always used: fairly stiff links, no
    /// bending links, half a kilogram of cloth.
    fn default() -> Self {
        Self {
            live: LiveMaterial {
                stiffness: 0.9,
                friction: 0.2,
                damping: 0.0,
                mass: 0.5,
            },
            structural: StructuralMaterial { bending_factor: 0.0 },
        }
    }
}

impl ClothMaterial {
    pub const fn new(stiffness: f32, bending_factor: f32, friction: f32, damping: f32, mass: f32) -> Self {
        Self {
            live: LiveMaterial { stiffness, friction, damping, mass },
            structural: StructuralMaterial { bending_factor },
        }
    }

    pub const fn preset(preset: MaterialPreset) -> Self {
        match preset {
            MaterialPreset::Cotton => Self::new(0.9, 0.3, 0.4, 0.02, 0.5),
            MaterialPreset::Silk => Self::new(0.7, 0.05, 0.15, 0.01, 0.2),
            MaterialPreset::Denim => Self::new(1.0, 0.6, 0.6, 0.03, 1.2),
            MaterialPreset::Leather => Self::new(1.0, 0.9, 0.7, 0.05, 2.0),
            MaterialPreset::Rubber => Self::new(0.5, 0.4, 0.9, 0.1, 1.5),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, PreconditionViolation> {
        let material: ClothMaterial = serde_json::from_str(json)
            .map_err(|e| PreconditionViolation::InvalidMaterial(e.to_string()))?;
        material.validate()?;
        Ok(material)
    }

    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        self.live.validate()?;
        check_unit("bendingFactor", self.structural.bending_factor)
    }

    pub fn stiffness(&self) -> f32 {
        self.live.stiffness
    }

    pub fn bending_factor(&self) -> f32 {
        self.structural.bending_factor
    }
}

impl LiveMaterial {
    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        check_unit("stiffness", self.stiffness)?;
        check_unit("friction", self.friction)?;
        check_unit("damping", self.damping)?;
        check_mass(self.mass)
    }

    /// Merge a partial update; fields left `None` keep their value.
    pub fn merged(&self, update: &MaterialUpdate) -> LiveMaterial {
        LiveMaterial {
            stiffness: update.stiffness.unwrap_or(self.stiffness),
            friction: update.friction.unwrap_or(self.friction),
            damping: update.damping.unwrap_or(self.damping),
            mass: update.mass.unwrap_or(self.mass),
        }
    }
}

/// Partial live update. Bending is structural and intentionally absent; JSON
/// carrying `bendingFactor` is rejected as an unknown field.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct MaterialUpdate {
    pub stiffness: Option<f32>,
    pub friction: Option<f32>,
    pub damping: Option<f32>,
    pub mass: Option<f32>,
}

impl MaterialUpdate {
    pub fn stiffness(value: f32) -> Self {
        Self { stiffness: Some(value), ..Self::default() }
    }

    pub fn from_json(json: &str) -> Result<Self, PreconditionViolation> {
        let update: MaterialUpdate = serde_json::from_str(json)
            .map_err(|e| PreconditionViolation::InvalidMaterial(e.to_string()))?;
        update.validate()?;
        Ok(update)
    }

    pub fn is_empty(&self) -> bool {
        self.stiffness.is_none() && self.friction.is_none() && self.damping.is_none() && self.mass.is_none()
    }

    pub fn validate(&self) -> Result<(), PreconditionViolation> {
        if let Some(v) = self.stiffness {
            check_unit("stiffness", v)?;
        }
        if let Some(v) = self.friction {
            check_unit("friction", v)?;
        }
        if let Some(v) = self.damping {
            check_unit("damping", v)?;
        }
        if let Some(v) = self.mass {
            check_mass(v)?;
        }
        Ok(())
    }
}

fn check_unit(name: &str, value: f32) -> Result<(), PreconditionViolation> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(PreconditionViolation::InvalidMaterial(format!(
            "{} must be within [0, 1], got {}",
            name, value
        )))
    }
}

fn check_mass(value: f32) -> Result<(), PreconditionViolation> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PreconditionViolation::InvalidMaterial(format!("mass must be > 0, got {}", value)))
    }
}
