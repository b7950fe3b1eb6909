use crate::domain::{MaterialUpdate, PreconditionViolation, SessionResult};
use crate::systems::dynamics::DynamicsBackend;

use super::adapter;
use super::SimulationSession;

/// Live coefficients only. Bending is structural and has no path here.
pub(super) fn update_material<B: DynamicsBackend>(
    session: &mut SimulationSession<B>,
    update: &MaterialUpdate,
) -> SessionResult<()> {
    let backend = session.backend.as_mut().ok_or(PreconditionViolation::NotInitialized)?;
    update.validate()?;

    let Some(cloth) = session.registry.cloth_mut() else {
        engine_debug!("update_material: no cloth, nothing to update");
        return Ok(());
    };
    if update.is_empty() {
        return Ok(());
    }

    let current = backend.soft_coefficients(cloth.handle)?;
    let next = adapter::apply_update(&current, update);
    backend.set_soft_coefficients(cloth.handle, &next)?;
    cloth.material.live = cloth.material.live.merged(update);

    engine_debug!("material updated: {:?}", cloth.material.live);
    Ok(())
}
