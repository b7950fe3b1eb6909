//! Simulation Session - owns the physics scene and drives it
//!
//! The session only orchestrates. Each concern lives in its own file and
//! receives the session by `&mut`:
//! - init/      - bring the backend up, reset
//! - build/     - ground, obstacle, cloth
//! - commands/  - pick, drag, release, pin
//! - settings/  - live material updates
//! - step/      - overrides, integrate, harvest
//!
//! Translation to backend terms is in adapter/, handle ownership in
//! registry/.

use crate::core::Vec3;
use crate::domain::{
    ClothInfo, ClothMaterial, ClothSpec, EngineConfig, MaterialUpdate, ObstacleKind, SceneRecipe, SessionResult,
    StepResult,
};
use crate::systems::dynamics::{DynamicsBackend, PbdWorld};

#[path = "adapter/adapter.rs"]
pub mod adapter;
#[path = "registry/registry.rs"]
mod registry;
#[path = "overrides/overrides.rs"]
mod overrides;
#[path = "perf/perf_timer.rs"]
mod perf_timer;
#[path = "perf/perf_stats.rs"]
mod perf_stats;
#[path = "init/init.rs"]
mod init;
#[path = "build/build.rs"]
mod build;
#[path = "commands/commands.rs"]
mod commands;
#[path = "settings/settings.rs"]
mod settings;
#[path = "step/step.rs"]
mod step;

pub use overrides::NodeOverride;
pub use perf_stats::StepStats;
pub use registry::{ClothEntry, RigidEntry};

use overrides::NodeOverrides;
use perf_timer::PerfTimer;
use registry::SceneRegistry;

/// The simulation session
pub struct SimulationSession<B: DynamicsBackend = PbdWorld> {
    config: EngineConfig,
    backend: Option<B>,
    registry: SceneRegistry,
    overrides: NodeOverrides,

    // Perf metrics
    step_stats: StepStats,
    frame: u32,
}

impl<B: DynamicsBackend> SimulationSession<B> {
    /// Create an uninitialized session. Call `init` before anything else.
    pub fn new(config: EngineConfig) -> Self {
        init::create_session(config)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.backend.is_some()
    }

    // === LIFECYCLE ===

    /// Create the dynamics world. Re-initializing releases every existing
    /// body first.
    pub fn init(&mut self) -> SessionResult<()> {
        init::init(self)
    }

    /// Destroy every body and clear all node overrides. No-op before init.
    pub fn reset(&mut self) {
        init::reset(self)
    }

    // === BUILD ===

    pub fn create_ground(&mut self) -> SessionResult<()> {
        build::create_ground(self)
    }

    pub fn create_obstacle(&mut self, kind: ObstacleKind, radius: f32, height: f32, position: Vec3) -> SessionResult<()> {
        build::create_obstacle(self, kind, radius, height, position)
    }

    /// Build the cloth, replacing any previous one.
    pub fn create_cloth(&mut self, spec: &ClothSpec) -> SessionResult<ClothInfo> {
        build::create_cloth(self, spec)
    }

    /// Reset, then ground, obstacle and cloth in that order.
    pub fn build_scene(&mut self, recipe: &SceneRecipe) -> SessionResult<ClothInfo> {
        build::build_scene(self, recipe)
    }

    // === LIVE PARAMETERS ===

    pub fn update_material(&mut self, update: &MaterialUpdate) -> SessionResult<()> {
        settings::update_material(self, update)
    }

    // === INTERACTION ===

    /// Start dragging `node` toward `target`. Returns false when there is no
    /// cloth.
    pub fn pick_node(&mut self, node: usize, target: Vec3) -> SessionResult<bool> {
        commands::pick_node(self, node, target)
    }

    /// Move the drag target. Returns false when no drag is active.
    pub fn drag_node(&mut self, target: Vec3) -> SessionResult<bool> {
        commands::drag_node(self, target)
    }

    /// End the drag. Returns false when no drag was active.
    pub fn release_node(&mut self) -> SessionResult<bool> {
        commands::release_node(self)
    }

    /// Pin `node` in place. Returns false when there is no cloth or the node
    /// was already pinned.
    pub fn pin_node(&mut self, node: usize) -> SessionResult<bool> {
        commands::pin_node(self, node)
    }

    pub fn node_override(&self, node: usize) -> NodeOverride {
        self.overrides.get(node)
    }

    pub fn pinned_count(&self) -> usize {
        self.overrides.pinned_count()
    }

    // === STEPPING ===

    /// Advance by `dt` seconds and return the cloth's node positions.
    pub fn step(&mut self, dt: f32) -> SessionResult<StepResult> {
        step::step(self, dt)
    }

    pub fn last_step_stats(&self) -> StepStats {
        self.step_stats
    }

    // === INSPECTION ===

    pub fn cloth(&self) -> Option<&ClothEntry> {
        self.registry.cloth()
    }

    pub fn cloth_info(&self) -> Option<ClothInfo> {
        self.registry.cloth().map(|c| c.info)
    }

    pub fn cloth_material(&self) -> Option<ClothMaterial> {
        self.registry.cloth().map(|c| c.material)
    }

    pub fn rigid_bodies(&self) -> &[RigidEntry] {
        self.registry.rigid_bodies()
    }

    /// Bodies held by the registry (rigid plus cloth).
    pub fn body_count(&self) -> usize {
        self.registry.len()
    }

    /// Read-only view of the backend, for inspection and tests.
    pub fn backend(&self) -> Option<&B> {
        self.backend.as_ref()
    }
}

impl SimulationSession<PbdWorld> {
    /// Session over the in-crate integrator with default settings.
    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Default for SimulationSession<PbdWorld> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
