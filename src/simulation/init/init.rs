use crate::domain::{EngineConfig, SessionError, SessionResult};
use crate::systems::dynamics::DynamicsBackend;

use super::adapter;
use super::overrides::NodeOverrides;
use super::perf_stats::StepStats;
use super::registry::SceneRegistry;
use super::SimulationSession;

pub(super) fn create_session<B: DynamicsBackend>(config: EngineConfig) -> SimulationSession<B> {
    SimulationSession {
        config,
        backend: None,
        registry: SceneRegistry::default(),
        overrides: NodeOverrides::default(),
        step_stats: StepStats::default(),
        frame: 0,
    }
}

pub(super) fn init<B: DynamicsBackend>(session: &mut SimulationSession<B>) -> SessionResult<()> {
    if session.backend.is_some() {
        engine_info!("re-initializing physics, releasing the current scene");
        reset(session);
        session.backend = None;
    }

    session.config.validate().map_err(|e| {
        engine_error!("physics init rejected config: {}", e);
        SessionError::Initialization(e)
    })?;

    let world = adapter::world_config(&session.config);
    let backend = B::load(&world).map_err(|e| {
        engine_error!("physics init failed: {}", e);
        SessionError::Initialization(e.to_string())
    })?;

    session.backend = Some(backend);
    session.step_stats = StepStats::default();
    session.frame = 0;
    engine_info!(
        "physics initialized (gravity {:?}, {} solver iterations, step {:.4}s)",
        world.gravity,
        world.solver_iterations,
        world.fixed_time_step
    );
    Ok(())
}

pub(super) fn reset<B: DynamicsBackend>(session: &mut SimulationSession<B>) {
    session.overrides.clear();
    let Some(backend) = session.backend.as_mut() else {
        return;
    };
    if session.registry.is_empty() {
        return;
    }

    let report = session.registry.release_all(backend);
    let live = backend.live_bodies();
    engine_info!(
        "reset: released {} bodies, {} failed, {} still live in the world",
        report.released,
        report.failures.len(),
        live.total()
    );
}
