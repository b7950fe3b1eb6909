use crate::core::Vec3;
use crate::domain::{
    ClothInfo, ClothSpec, ObstacleKind, PreconditionViolation, SceneRecipe, SessionResult, ShapeDescriptor,
};
use crate::systems::dynamics::{DynamicsBackend, EngineError, RigidBodyDesc, SoftHandle};

use super::adapter;
use super::registry::{ClothEntry, RigidEntry};
use super::SimulationSession;

pub(super) fn create_ground<B: DynamicsBackend>(session: &mut SimulationSession<B>) -> SessionResult<()> {
    let (desc, shape) = adapter::ground_desc(&session.config.ground);
    add_rigid(session, &desc, shape)
}

pub(super) fn create_obstacle<B: DynamicsBackend>(
    session: &mut SimulationSession<B>,
    kind: ObstacleKind,
    radius: f32,
    height: f32,
    position: Vec3,
) -> SessionResult<()> {
    if session.backend.is_none() {
        return Err(PreconditionViolation::NotInitialized.into());
    }
    match adapter::obstacle_desc(kind, radius, height, position, &session.config)? {
        Some((desc, shape)) => add_rigid(session, &desc, shape),
        None => {
            engine_debug!("create_obstacle: no obstacle requested");
            Ok(())
        }
    }
}

fn add_rigid<B: DynamicsBackend>(
    session: &mut SimulationSession<B>,
    desc: &RigidBodyDesc,
    shape: ShapeDescriptor,
) -> SessionResult<()> {
    let backend = session.backend.as_mut().ok_or(PreconditionViolation::NotInitialized)?;
    let handle = backend.add_rigid_body(desc)?;
    session.registry.push_rigid(RigidEntry { handle, shape });
    engine_info!(
        "built {:?} at {:?} (dimensions {:?})",
        shape.kind,
        shape.position,
        shape.dimensions
    );
    Ok(())
}

pub(super) fn create_cloth<B: DynamicsBackend>(
    session: &mut SimulationSession<B>,
    spec: &ClothSpec,
) -> SessionResult<ClothInfo> {
    let backend = session.backend.as_mut().ok_or(PreconditionViolation::NotInitialized)?;
    spec.validate()?;

    // The current cloth stays untouched until the new patch is accepted.
    let desc = adapter::patch_desc(spec, &session.config);
    let handle = backend.add_soft_patch(&desc)?;
    let topology = spec.topology;
    let built = match backend.soft_body_info(handle) {
        Ok(built) if built.node_count == topology.node_count() => built,
        Ok(built) => {
            discard_patch(backend, handle);
            return Err(EngineError::InvalidDescriptor(format!(
                "backend built {} nodes, topology has {}",
                built.node_count,
                topology.node_count()
            ))
            .into());
        }
        Err(e) => {
            discard_patch(backend, handle);
            return Err(e.into());
        }
    };

    // Node indices mean nothing across topologies.
    if let Some(previous) = session.registry.take_cloth() {
        session.overrides.clear();
        if let Err(e) = backend.remove_soft_body(previous.handle) {
            engine_warn!("create_cloth: failed to release previous cloth {}: {}", previous.handle, e);
        }
    }

    let info = ClothInfo {
        node_count: built.node_count,
        nodes_w: topology.nodes_w(),
        nodes_h: topology.nodes_h(),
    };
    session.registry.set_cloth(ClothEntry { handle, topology, material: spec.material, info });
    engine_info!(
        "built cloth {}x{} nodes ({} links, {} bending, {} clusters)",
        info.nodes_w,
        info.nodes_h,
        built.link_count,
        built.bending_link_count,
        built.cluster_count
    );
    Ok(info)
}

fn discard_patch<B: DynamicsBackend>(backend: &mut B, handle: SoftHandle) {
    if let Err(e) = backend.remove_soft_body(handle) {
        engine_warn!("create_cloth: failed to discard rejected patch {}: {}", handle, e);
    }
}

pub(super) fn build_scene<B: DynamicsBackend>(
    session: &mut SimulationSession<B>,
    recipe: &SceneRecipe,
) -> SessionResult<ClothInfo> {
    if session.backend.is_none() {
        return Err(PreconditionViolation::NotInitialized.into());
    }
    // Validate up front so a bad recipe leaves the current scene alone.
    recipe.cloth.validate()?;

    super::init::reset(session);
    create_ground(session)?;
    let o = &recipe.obstacle;
    create_obstacle(session, o.kind, o.radius, o.height, o.position)?;
    create_cloth(session, &recipe.cloth)
}
