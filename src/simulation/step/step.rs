use crate::core::Vec3;
use crate::domain::{PositionBuffer, PreconditionViolation, SessionResult, StepResult};
use crate::systems::dynamics::DynamicsBackend;

use super::adapter::MAX_SUB_STEPS;
use super::perf_stats::StepStats;
use super::{PerfTimer, SimulationSession};

/// One frame:
/// 1. Clamp the dragged node to its target with zero velocity (skipped if
///    the node is pinned).
/// 2. Integrate `dt`, at most `MAX_SUB_STEPS` internal steps.
/// 3. Copy every node position into a fresh buffer.
pub(super) fn step<B: DynamicsBackend>(session: &mut SimulationSession<B>, dt: f32) -> SessionResult<StepResult> {
    if !(dt.is_finite() && dt >= 0.0) {
        return Err(PreconditionViolation::InvalidTimeStep(dt).into());
    }
    let backend = session.backend.as_mut().ok_or(PreconditionViolation::NotInitialized)?;

    let total = PerfTimer::start();
    let mut phase = PerfTimer::start();
    let cloth = session.registry.cloth().map(|c| (c.handle, c.info.node_count));

    if let (Some((handle, _)), Some((node, target))) = (cloth, session.overrides.drag_clamp()) {
        backend.set_node_state(handle, node, target, Vec3::zero())?;
    }
    let override_ms = phase.lap_ms();

    let sub_steps = backend.step_simulation(dt, MAX_SUB_STEPS);
    let integrate_ms = phase.lap_ms();

    let positions = match cloth {
        Some((handle, node_count)) => {
            let mut buffer = PositionBuffer::zeroed(node_count);
            backend.read_node_positions(handle, buffer.as_mut_slice())?;
            buffer
        }
        None => PositionBuffer::empty(),
    };
    let harvest_ms = phase.lap_ms();

    let step_ms = total.elapsed_ms();
    session.frame = session.frame.wrapping_add(1);
    session.step_stats = StepStats {
        step_ms,
        override_ms,
        integrate_ms,
        harvest_ms,
        sub_steps,
        node_count: positions.node_count() as u32,
        frame: session.frame,
    };

    Ok(StepResult {
        positions,
        step_latency_ms: step_ms,
        sub_steps,
    })
}
