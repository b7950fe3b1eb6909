//! Engine configuration
//!
//! Loaded once when the worker is created (optionally from JSON) and handed
//! to the session. Everything here is world-level; per-cloth material lives in
//! `domain::material`.

use serde::{Deserialize, Serialize};

use crate::core::Vec3;

/// Static ground slab. Its top surface sits at `center.y + half_extents.y`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GroundConfig {
    pub half_extents: Vec3,
    pub center: Vec3,
    pub margin: f32,
    pub friction: f32,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            half_extents: Vec3::new(50.0, 0.5, 50.0),
            center: Vec3::new(0.0, -0.5, 0.0),
            margin: 0.05,
            friction: 0.5,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    pub gravity: Vec3,
    /// Internal integrator step in seconds. Frame `dt` is consumed in
    /// multiples of this.
    pub fixed_time_step: f32,
    /// Constraint projection passes per internal step.
    pub solver_iterations: u32,
    pub ground: GroundConfig,
    pub obstacle_margin: f32,
    pub obstacle_friction: f32,
    /// Collision thickness of cloth nodes.
    pub cloth_margin: f32,
    /// Cluster-vs-cluster self collision for the cloth.
    pub self_collision: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gravity: Vec3::new(0.0, -9.8, 0.0),
            fixed_time_step: 1.0 / 60.0,
            solver_iterations: 10,
            ground: GroundConfig::default(),
            obstacle_margin: 0.1,
            obstacle_friction: 0.5,
            cloth_margin: 0.1,
            self_collision: true,
        }
    }
}

impl EngineConfig {
    /// Parse a (possibly partial) JSON config; missing fields keep defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: EngineConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if !self.gravity.is_finite() {
            return Err("gravity must be finite".to_string());
        }
        if !(self.fixed_time_step.is_finite() && self.fixed_time_step > 0.0) {
            return Err(format!("fixedTimeStep must be > 0, got {}", self.fixed_time_step));
        }
        if self.solver_iterations == 0 {
            return Err("solverIterations must be at least 1".to_string());
        }
        let ground = &self.ground;
        if !(ground.half_extents.is_finite()
            && ground.half_extents.x > 0.0
            && ground.half_extents.y > 0.0
            && ground.half_extents.z > 0.0)
        {
            return Err("ground halfExtents must be positive".to_string());
        }
        for (name, value) in [
            ("ground.margin", ground.margin),
            ("obstacleMargin", self.obstacle_margin),
            ("clothMargin", self.cloth_margin),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(format!("{} must be >= 0, got {}", name, value));
            }
        }
        for (name, value) in [
            ("ground.friction", ground.friction),
            ("obstacleFriction", self.obstacle_friction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{} must be within [0, 1], got {}", name, value));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "solverIterations": 4 }"#).unwrap();
        assert_eq!(config.solver_iterations, 4);
        assert_eq!(config.gravity, Vec3::new(0.0, -9.8, 0.0));
        assert_eq!(config.ground, GroundConfig::default());
    }

    #[test]
    fn rejects_zero_time_step() {
        let err = EngineConfig::from_json(r#"{ "fixedTimeStep": 0.0 }"#).unwrap_err();
        assert!(err.contains("fixedTimeStep"));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(EngineConfig::from_json("{ gravity: ").is_err());
    }
}
