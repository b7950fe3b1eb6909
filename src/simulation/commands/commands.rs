use crate::core::Vec3;
use crate::domain::{PreconditionViolation, SessionResult};
use crate::systems::dynamics::{DynamicsBackend, SoftHandle};

use super::SimulationSession;

/// Cloth handle and node count, after checking the session is up.
fn cloth_target<B: DynamicsBackend>(
    session: &SimulationSession<B>,
) -> Result<Option<(SoftHandle, usize)>, PreconditionViolation> {
    if session.backend.is_none() {
        return Err(PreconditionViolation::NotInitialized);
    }
    Ok(session.registry.cloth().map(|c| (c.handle, c.info.node_count)))
}

fn check_node(node: usize, node_count: usize) -> Result<(), PreconditionViolation> {
    if node < node_count {
        Ok(())
    } else {
        Err(PreconditionViolation::NodeOutOfRange { index: node, node_count })
    }
}

fn check_target(target: Vec3, op: &'static str) -> Result<(), PreconditionViolation> {
    if target.is_finite() {
        Ok(())
    } else {
        Err(PreconditionViolation::NonFinitePosition(op))
    }
}

pub(super) fn pick_node<B: DynamicsBackend>(
    session: &mut SimulationSession<B>,
    node: usize,
    target: Vec3,
) -> SessionResult<bool> {
    let Some((_, node_count)) = cloth_target(session)? else {
        engine_debug!("pick_node({}): no cloth", node);
        return Ok(false);
    };
    check_node(node, node_count)?;
    check_target(target, "pick_node")?;

    session.overrides.start_drag(node, target);
    if session.overrides.is_pinned(node) {
        engine_debug!("pick_node({}): node is pinned, drag has no effect", node);
    }
    Ok(true)
}

pub(super) fn drag_node<B: DynamicsBackend>(session: &mut SimulationSession<B>, target: Vec3) -> SessionResult<bool> {
    if cloth_target(session)?.is_none() {
        return Ok(false);
    }
    check_target(target, "drag_node")?;
    Ok(session.overrides.move_drag(target))
}

pub(super) fn release_node<B: DynamicsBackend>(session: &mut SimulationSession<B>) -> SessionResult<bool> {
    cloth_target(session)?;
    Ok(session.overrides.end_drag())
}

/// Zero inverse mass and velocity. The node stays where it is now.
pub(super) fn pin_node<B: DynamicsBackend>(session: &mut SimulationSession<B>, node: usize) -> SessionResult<bool> {
    let Some((handle, node_count)) = cloth_target(session)? else {
        engine_debug!("pin_node({}): no cloth", node);
        return Ok(false);
    };
    check_node(node, node_count)?;
    if session.overrides.is_pinned(node) {
        return Ok(false);
    }

    let backend = session.backend.as_mut().ok_or(PreconditionViolation::NotInitialized)?;
    let position = backend.node_position(handle, node)?;
    backend.set_node_inverse_mass(handle, node, 0.0)?;
    backend.set_node_state(handle, node, position, Vec3::zero())?;
    session.overrides.pin(node);
    engine_debug!("pinned node {} at {:?}", node, position);
    Ok(true)
}
