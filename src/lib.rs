//! Drape Engine - cloth drape simulation in WASM
//!
//! A cloth patch falls onto static obstacles; the caller can drag and pin
//! nodes, tweak the material live and step the scene from a worker.
//!
//! Architecture:
//! - core/          - Macros and math
//! - domain/        - Plain data: config, materials, scene, errors
//! - systems/       - Dynamics backend (PBD integrator, static bodies)
//! - simulation/    - Session orchestration
//! - interaction/   - Tool modes in front of the session
//! - bridge/        - Request/response access to a session
//! - api/           - Worker facade

// Logging and safety macros (must be first for macro export!)
#[macro_use]
pub mod core;
pub mod domain;
pub mod systems;
pub mod simulation;
pub mod interaction;
pub mod bridge;
pub mod api;

use wasm_bindgen::prelude::*;

// Re-export wasm-bindgen-rayon for thread pool initialization
#[cfg(all(feature = "parallel", target_arch = "wasm32"))]
pub use wasm_bindgen_rayon::init_thread_pool;

// Better error messages in debug mode
#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    console_error_panic_hook::set_once();
}

/// Initialize the engine
#[wasm_bindgen]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    set_panic_hook();

    engine_info!("🦀 Drape WASM Engine initialized!");
}

/// Get engine version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Re-export main types
pub use api::wasm::{ClothWorker, StepFrame};
pub use bridge::{SessionActor, Request, Response};
#[cfg(not(target_arch = "wasm32"))]
pub use bridge::SessionClient;
pub use core::Vec3;
pub use domain::{
    ClothInfo, ClothMaterial, ClothSpec, EngineConfig, MaterialPreset, MaterialUpdate, ObstacleKind, PositionBuffer,
    PreconditionViolation, SceneRecipe, SessionError, SessionResult, StepResult,
};
pub use interaction::{InteractionController, InteractionOutcome, ToolMode};
pub use simulation::{NodeOverride, SimulationSession, StepStats};
pub use systems::dynamics::{DynamicsBackend, PbdWorld};
