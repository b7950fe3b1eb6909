use approx::assert_relative_eq;

use super::*;
use crate::domain::{PositionBuffer, PreconditionViolation, SessionError, ShapeKind};
use crate::systems::dynamics::{
    EngineError, LiveBodies, RigidBodyDesc, RigidHandle, SoftBodyInfo, SoftCoefficients, SoftHandle, SoftPatchDesc,
    WorldConfig,
};

const DT: f32 = 1.0 / 60.0;

fn ready_session() -> SimulationSession {
    let mut session = SimulationSession::with_defaults();
    session.init().unwrap();
    session
}

fn small_cloth(y: f32) -> ClothSpec {
    ClothSpec::new(2.0, 2.0, 8, 8, Vec3::new(0.0, y, 0.0), ClothMaterial::default())
}

fn drape_scene(session: &mut SimulationSession) -> ClothInfo {
    session.build_scene(&SceneRecipe::sample(2.0, 4.0, 40)).unwrap()
}

fn live(session: &SimulationSession<impl DynamicsBackend>) -> LiveBodies {
    session.backend().map(|b| b.live_bodies()).unwrap_or_default()
}

// === LIFECYCLE ===

#[test]
fn operations_before_init_are_rejected() {
    let mut session = SimulationSession::with_defaults();
    assert_eq!(session.step(DT), Err(SessionError::Precondition(PreconditionViolation::NotInitialized)));
    assert_eq!(session.create_ground(), Err(PreconditionViolation::NotInitialized.into()));
    assert_eq!(session.pick_node(0, Vec3::zero()), Err(PreconditionViolation::NotInitialized.into()));
    assert_eq!(session.pin_node(0), Err(PreconditionViolation::NotInitialized.into()));
    // Reset on an empty world is a no-op.
    session.reset();
    assert!(!session.is_initialized());
}

#[test]
fn invalid_config_fails_initialization() {
    let config = EngineConfig { solver_iterations: 0, ..EngineConfig::default() };
    let mut session: SimulationSession = SimulationSession::new(config);
    assert!(matches!(session.init(), Err(SessionError::Initialization(_))));
    assert!(!session.is_initialized());
}

struct MissingRuntime;

impl DynamicsBackend for MissingRuntime {
    fn load(_config: &WorldConfig) -> Result<Self, EngineError> {
        Err(EngineError::LoadFailed("runtime module not found".to_string()))
    }
    fn add_rigid_body(&mut self, _: &RigidBodyDesc) -> Result<RigidHandle, EngineError> {
        unreachable!()
    }
    fn remove_rigid_body(&mut self, _: RigidHandle) -> Result<(), EngineError> {
        unreachable!()
    }
    fn add_soft_patch(&mut self, _: &SoftPatchDesc) -> Result<SoftHandle, EngineError> {
        unreachable!()
    }
    fn remove_soft_body(&mut self, _: SoftHandle) -> Result<(), EngineError> {
        unreachable!()
    }
    fn soft_body_info(&self, _: SoftHandle) -> Result<SoftBodyInfo, EngineError> {
        unreachable!()
    }
    fn soft_coefficients(&self, _: SoftHandle) -> Result<SoftCoefficients, EngineError> {
        unreachable!()
    }
    fn set_soft_coefficients(&mut self, _: SoftHandle, _: &SoftCoefficients) -> Result<(), EngineError> {
        unreachable!()
    }
    fn node_position(&self, _: SoftHandle, _: usize) -> Result<Vec3, EngineError> {
        unreachable!()
    }
    fn node_velocity(&self, _: SoftHandle, _: usize) -> Result<Vec3, EngineError> {
        unreachable!()
    }
    fn set_node_state(&mut self, _: SoftHandle, _: usize, _: Vec3, _: Vec3) -> Result<(), EngineError> {
        unreachable!()
    }
    fn node_inverse_mass(&self, _: SoftHandle, _: usize) -> Result<f32, EngineError> {
        unreachable!()
    }
    fn set_node_inverse_mass(&mut self, _: SoftHandle, _: usize, _: f32) -> Result<(), EngineError> {
        unreachable!()
    }
    fn read_node_positions(&self, _: SoftHandle, _: &mut [f32]) -> Result<(), EngineError> {
        unreachable!()
    }
    fn step_simulation(&mut self, _: f32, _: u32) -> u32 {
        unreachable!()
    }
    fn live_bodies(&self) -> LiveBodies {
        unreachable!()
    }
}

#[test]
fn runtime_load_failure_is_an_initialization_error() {
    let mut session: SimulationSession<MissingRuntime> = SimulationSession::new(EngineConfig::default());
    let err = session.init().unwrap_err();
    assert!(matches!(err, SessionError::Initialization(msg) if msg.contains("runtime module not found")));
    assert!(!session.is_initialized());
}

/// Real world whose first rigid-body destroy fails (and leaks). Patches above
/// `PATCH_NODE_LIMIT` nodes are refused, and those above `MISCOUNT_ABOVE` are
/// built but report one node short.
struct FlakyDestroyWorld {
    inner: PbdWorld,
    failed_once: bool,
}

impl FlakyDestroyWorld {
    const PATCH_NODE_LIMIT: usize = 1000;
    const MISCOUNT_ABOVE: usize = 400;
}

impl DynamicsBackend for FlakyDestroyWorld {
    fn load(config: &WorldConfig) -> Result<Self, EngineError> {
        Ok(Self { inner: PbdWorld::load(config)?, failed_once: false })
    }
    fn add_rigid_body(&mut self, desc: &RigidBodyDesc) -> Result<RigidHandle, EngineError> {
        self.inner.add_rigid_body(desc)
    }
    fn remove_rigid_body(&mut self, handle: RigidHandle) -> Result<(), EngineError> {
        if !self.failed_once {
            self.failed_once = true;
            return Err(EngineError::DestroyFailed("collision object still referenced".to_string()));
        }
        self.inner.remove_rigid_body(handle)
    }
    fn add_soft_patch(&mut self, desc: &SoftPatchDesc) -> Result<SoftHandle, EngineError> {
        if desc.res_x * desc.res_y > Self::PATCH_NODE_LIMIT {
            return Err(EngineError::InvalidDescriptor("out of soft body memory".to_string()));
        }
        self.inner.add_soft_patch(desc)
    }
    fn remove_soft_body(&mut self, handle: SoftHandle) -> Result<(), EngineError> {
        self.inner.remove_soft_body(handle)
    }
    fn soft_body_info(&self, handle: SoftHandle) -> Result<SoftBodyInfo, EngineError> {
        let mut info = self.inner.soft_body_info(handle)?;
        if info.node_count > Self::MISCOUNT_ABOVE {
            info.node_count -= 1;
        }
        Ok(info)
    }
    fn soft_coefficients(&self, handle: SoftHandle) -> Result<SoftCoefficients, EngineError> {
        self.inner.soft_coefficients(handle)
    }
    fn set_soft_coefficients(&mut self, handle: SoftHandle, c: &SoftCoefficients) -> Result<(), EngineError> {
        self.inner.set_soft_coefficients(handle, c)
    }
    fn node_position(&self, handle: SoftHandle, node: usize) -> Result<Vec3, EngineError> {
        self.inner.node_position(handle, node)
    }
    fn node_velocity(&self, handle: SoftHandle, node: usize) -> Result<Vec3, EngineError> {
        self.inner.node_velocity(handle, node)
    }
    fn set_node_state(&mut self, handle: SoftHandle, node: usize, p: Vec3, v: Vec3) -> Result<(), EngineError> {
        self.inner.set_node_state(handle, node, p, v)
    }
    fn node_inverse_mass(&self, handle: SoftHandle, node: usize) -> Result<f32, EngineError> {
        self.inner.node_inverse_mass(handle, node)
    }
    fn set_node_inverse_mass(&mut self, handle: SoftHandle, node: usize, w: f32) -> Result<(), EngineError> {
        self.inner.set_node_inverse_mass(handle, node, w)
    }
    fn read_node_positions(&self, handle: SoftHandle, out: &mut [f32]) -> Result<(), EngineError> {
        self.inner.read_node_positions(handle, out)
    }
    fn step_simulation(&mut self, dt: f32, max_sub_steps: u32) -> u32 {
        self.inner.step_simulation(dt, max_sub_steps)
    }
    fn live_bodies(&self) -> LiveBodies {
        self.inner.live_bodies()
    }
}

#[test]
fn failed_destroy_does_not_block_the_rest_of_reset() {
    let mut session: SimulationSession<FlakyDestroyWorld> = SimulationSession::new(EngineConfig::default());
    session.init().unwrap();
    session.create_ground().unwrap();
    session.create_obstacle(ObstacleKind::Sphere, 1.0, 0.0, Vec3::new(0.0, 1.0, 0.0)).unwrap();
    session.create_cloth(&small_cloth(4.0)).unwrap();
    assert_eq!(live(&session).total(), 3);

    session.reset();

    assert_eq!(session.body_count(), 0);
    assert!(session.cloth().is_none());
    // Only the body whose destroy failed is left behind.
    assert_eq!(live(&session), LiveBodies { rigid: 1, soft: 0 });

    // The session stays usable.
    session.create_ground().unwrap();
    assert_eq!(session.body_count(), 1);
}

#[test]
fn rejected_cloth_keeps_the_current_one() {
    let mut session: SimulationSession<FlakyDestroyWorld> = SimulationSession::new(EngineConfig::default());
    session.init().unwrap();
    let info = session.create_cloth(&small_cloth(3.0)).unwrap();
    session.pin_node(4).unwrap();
    session.pick_node(10, Vec3::new(0.0, 4.0, 0.0)).unwrap();

    let too_big = ClothSpec::new(2.0, 2.0, 40, 40, Vec3::zero(), ClothMaterial::default());
    assert!(matches!(session.create_cloth(&too_big), Err(SessionError::Engine(EngineError::InvalidDescriptor(_)))));

    assert_eq!(session.cloth_info(), Some(info));
    assert_eq!(session.pinned_count(), 1);
    assert_eq!(session.node_override(4), NodeOverride::Pinned);
    assert_eq!(session.node_override(10), NodeOverride::DraggedTo(Vec3::new(0.0, 4.0, 0.0)));
    assert_eq!(live(&session).soft, 1);
    let frame = session.step(0.0).unwrap();
    assert_eq!(frame.positions.node_count(), info.node_count);
}

#[test]
fn miscounted_patch_is_discarded() {
    let mut session: SimulationSession<FlakyDestroyWorld> = SimulationSession::new(EngineConfig::default());
    session.init().unwrap();
    let info = session.create_cloth(&small_cloth(3.0)).unwrap();
    session.pin_node(0).unwrap();

    // 25x25 nodes: accepted by the backend, but the count comes back wrong.
    let miscounted = ClothSpec::new(2.0, 2.0, 24, 24, Vec3::zero(), ClothMaterial::default());
    assert!(matches!(
        session.create_cloth(&miscounted),
        Err(SessionError::Engine(EngineError::InvalidDescriptor(_)))
    ));

    assert_eq!(session.cloth_info(), Some(info));
    assert_eq!(session.node_override(0), NodeOverride::Pinned);
    // The rejected patch did not leak.
    assert_eq!(live(&session).soft, 1);
}

#[test]
fn repeated_cycles_leave_no_live_bodies() {
    let mut session = SimulationSession::with_defaults();
    for _ in 0..5 {
        session.init().unwrap();
        session.build_scene(&SceneRecipe::sample(1.0, 2.0, 6)).unwrap();
        session.step(DT).unwrap();
        session.reset();
        assert_eq!(live(&session).total(), 0);
        assert_eq!(session.body_count(), 0);
    }
}

#[test]
fn reinit_releases_previous_scene() {
    let mut session = ready_session();
    session.create_ground().unwrap();
    session.create_cloth(&small_cloth(2.0)).unwrap();
    session.pin_node(0).unwrap();

    session.init().unwrap();
    assert_eq!(session.body_count(), 0);
    assert_eq!(session.pinned_count(), 0);
    assert_eq!(live(&session).total(), 0);
}

// === BUILD ===

#[test]
fn node_count_matches_segments() {
    let mut session = ready_session();
    for (sw, sh) in [(1, 1), (8, 8), (40, 40), (10, 3)] {
        let spec = ClothSpec::new(6.0, 6.0, sw, sh, Vec3::new(0.0, 6.0, 0.0), ClothMaterial::default());
        let info = session.create_cloth(&spec).unwrap();
        assert_eq!(info.node_count, (sw as usize + 1) * (sh as usize + 1));
        assert_eq!(info.nodes_w, sw as usize + 1);
        assert_eq!(info.nodes_h, sh as usize + 1);
        let result = session.step(0.0).unwrap();
        assert_eq!(result.positions.len(), info.node_count * 3);
    }
}

#[test]
fn reset_then_build_yields_exactly_the_new_bodies() {
    let mut session = ready_session();
    drape_scene(&mut session);
    session.reset();

    session.create_ground().unwrap();
    session.create_obstacle(ObstacleKind::Box, 1.0, 2.0, Vec3::new(0.0, 1.0, 0.0)).unwrap();
    assert_eq!(session.body_count(), 2);
    assert_eq!(live(&session), LiveBodies { rigid: 2, soft: 0 });
    let kinds: Vec<ShapeKind> = session.rigid_bodies().iter().map(|r| r.shape.kind).collect();
    assert_eq!(kinds, vec![ShapeKind::Ground, ShapeKind::Box]);

    session.create_cloth(&small_cloth(4.0)).unwrap();
    assert_eq!(live(&session), LiveBodies { rigid: 2, soft: 1 });
}

#[test]
fn second_cloth_replaces_the_first() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    session.pin_node(4).unwrap();
    let info = session
        .create_cloth(&ClothSpec::new(2.0, 2.0, 4, 4, Vec3::zero(), ClothMaterial::default()))
        .unwrap();
    assert_eq!(info.node_count, 25);
    assert_eq!(live(&session).soft, 1);
    assert_eq!(session.node_override(4), NodeOverride::None);
}

#[test]
fn oversized_topology_is_rejected_before_the_backend() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    let huge = ClothSpec::new(2.0, 2.0, u32::MAX, u32::MAX, Vec3::zero(), ClothMaterial::default());
    assert!(matches!(
        session.create_cloth(&huge),
        Err(SessionError::Precondition(PreconditionViolation::InvalidTopology(_)))
    ));
    assert_eq!(session.cloth_info().map(|i| i.node_count), Some(81));
    assert_eq!(live(&session).soft, 1);
}

#[test]
fn no_obstacle_builds_nothing() {
    let mut session = ready_session();
    session.create_obstacle(ObstacleKind::None, 0.0, 0.0, Vec3::zero()).unwrap();
    assert_eq!(session.body_count(), 0);
}

#[test]
fn invalid_recipe_leaves_scene_untouched() {
    let mut session = ready_session();
    drape_scene(&mut session);
    let bad = SceneRecipe::sample(2.0, 4.0, 0);
    assert!(matches!(
        session.build_scene(&bad),
        Err(SessionError::Precondition(PreconditionViolation::InvalidTopology(_)))
    ));
    assert_eq!(session.body_count(), 3);
}

#[test]
fn patch_layout_matches_corners() {
    let mut session = ready_session();
    session.create_cloth(&ClothSpec::new(6.0, 6.0, 2, 2, Vec3::new(0.0, 6.0, 0.0), ClothMaterial::default())).unwrap();
    let result = session.step(0.0).unwrap();
    assert_eq!(result.positions.node(0), Some(Vec3::new(-3.0, 6.0, -3.0)));
    assert_eq!(result.positions.node(2), Some(Vec3::new(3.0, 6.0, -3.0)));
    assert_eq!(result.positions.node(8), Some(Vec3::new(3.0, 6.0, 3.0)));
}

#[test]
fn cluster_policy_boundary() {
    let mut session = ready_session();
    let material = ClothMaterial::default();

    let at_limit = ClothSpec::new(6.0, 6.0, 49, 49, Vec3::zero(), material);
    assert_eq!(session.create_cloth(&at_limit).unwrap().node_count, 2500);
    let handle = session.cloth().unwrap().handle;
    let info = session.backend().unwrap().soft_body_info(handle).unwrap();
    assert_eq!(info.cluster_count, 2500usize.div_ceil(crate::systems::soft_body::clusters::AUTO_CLUSTER_SIZE));

    let over_limit = ClothSpec::new(6.0, 6.0, 40, 60, Vec3::zero(), material);
    assert_eq!(session.create_cloth(&over_limit).unwrap().node_count, 2501);
    let handle = session.cloth().unwrap().handle;
    let info = session.backend().unwrap().soft_body_info(handle).unwrap();
    assert_eq!(info.cluster_count, adapter::FALLBACK_CLUSTER_COUNT);
}

// === STEPPING ===

#[test]
fn step_without_cloth_is_empty_not_an_error() {
    let mut session = ready_session();
    session.create_ground().unwrap();
    let result = session.step(DT).unwrap();
    assert!(result.is_empty());
    assert_eq!(result.sub_steps, 1);
}

#[test]
fn invalid_time_steps_are_rejected() {
    let mut session = ready_session();
    for dt in [-DT, f32::NAN, f32::INFINITY] {
        assert!(matches!(
            session.step(dt),
            Err(SessionError::Precondition(PreconditionViolation::InvalidTimeStep(_)))
        ));
    }
}

#[test]
fn zero_dt_without_drag_never_moves_nodes() {
    let mut session = ready_session();
    drape_scene(&mut session);
    for _ in 0..5 {
        session.step(DT).unwrap();
    }
    let settled = session.step(0.0).unwrap().positions;
    for _ in 0..10 {
        let again = session.step(0.0).unwrap();
        assert_eq!(again.sub_steps, 0);
        assert_eq!(again.positions, settled);
    }
}

#[test]
fn step_stats_track_frames() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    session.step(DT).unwrap();
    session.step(DT).unwrap();
    let stats = session.last_step_stats();
    assert_eq!(stats.frame(), 2);
    assert_eq!(stats.node_count(), 81);
    assert_eq!(stats.sub_steps(), 1);
    assert!(stats.step_ms() >= 0.0);
}

#[test]
fn cloth_drapes_over_cylinder() {
    let mut session = ready_session();
    let info = drape_scene(&mut session);
    assert_eq!(info.node_count, 41 * 41);

    let centroid_y = |positions: &PositionBuffer| positions.nodes().map(|p| p.y).sum::<f32>() / positions.node_count() as f32;
    let initial = session.step(0.0).unwrap().positions;
    let initial_centroid = centroid_y(&initial);
    assert_relative_eq!(initial_centroid, 6.0, epsilon = 1e-4);

    let mut last = initial;
    for _ in 0..60 {
        last = session.step(DT).unwrap().positions;
    }

    assert!(last.as_slice().iter().all(|v| v.is_finite()));
    let centroid = centroid_y(&last);
    assert!(centroid < initial_centroid, "centroid did not fall: {}", centroid);
    assert!(centroid > 0.0, "cloth went through the ground: {}", centroid);

    // Cylinder: radius 2, top at y = 4.
    for p in last.nodes() {
        if p.x * p.x + p.z * p.z < 2.0 * 2.0 {
            assert!(p.y > 4.0 - 0.25, "node inside footprint sank to {:?}", p);
        }
    }
}

// === INTERACTION ===

#[test]
fn drag_clamps_node_with_zero_velocity() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    let target = Vec3::new(0.5, 4.0, 0.5);

    assert_eq!(session.pick_node(40, Vec3::new(0.0, 3.0, 0.0)), Ok(true));
    assert_eq!(session.drag_node(target), Ok(true));
    // Paused: dt = 0 still applies the clamp.
    let result = session.step(0.0).unwrap();
    assert_eq!(result.positions.node(40), Some(target));

    let handle = session.cloth().unwrap().handle;
    assert_eq!(session.backend().unwrap().node_velocity(handle, 40), Ok(Vec3::zero()));
    assert_eq!(session.node_override(40), NodeOverride::DraggedTo(target));
}

#[test]
fn released_node_resumes_integration() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    let target = Vec3::new(0.0, 5.0, 0.0);
    session.pick_node(40, target).unwrap();
    session.step(DT).unwrap();
    assert_eq!(session.release_node(), Ok(true));
    assert_eq!(session.node_override(40), NodeOverride::None);

    let before = session.step(0.0).unwrap().positions.node(40).unwrap();
    let after = session.step(DT).unwrap().positions.node(40).unwrap();
    assert_ne!(before, after);
}

#[test]
fn drag_without_pick_and_release_without_drag_are_noops() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    assert_eq!(session.drag_node(Vec3::zero()), Ok(false));
    assert_eq!(session.release_node(), Ok(false));
}

#[test]
fn interaction_without_cloth_is_a_noop() {
    let mut session = ready_session();
    session.create_ground().unwrap();
    assert_eq!(session.pick_node(3, Vec3::zero()), Ok(false));
    assert_eq!(session.pin_node(3), Ok(false));
    assert_eq!(session.drag_node(Vec3::zero()), Ok(false));
}

#[test]
fn out_of_range_node_is_a_precondition_violation() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    let expected: SessionResult<bool> =
        Err(PreconditionViolation::NodeOutOfRange { index: 81, node_count: 81 }.into());
    assert_eq!(session.pick_node(81, Vec3::zero()), expected);
    assert_eq!(session.pin_node(81), expected);
}

#[test]
fn non_finite_drag_target_is_rejected() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    assert!(matches!(
        session.pick_node(0, Vec3::new(f32::NAN, 0.0, 0.0)),
        Err(SessionError::Precondition(PreconditionViolation::NonFinitePosition(_)))
    ));
}

#[test]
fn pinning_twice_equals_pinning_once() {
    let mut once = ready_session();
    let mut twice = ready_session();
    for s in [&mut once, &mut twice] {
        s.create_ground().unwrap();
        s.create_cloth(&small_cloth(3.0)).unwrap();
    }

    assert_eq!(once.pin_node(0), Ok(true));
    assert_eq!(twice.pin_node(0), Ok(true));
    assert_eq!(twice.pin_node(0), Ok(false));

    for _ in 0..20 {
        let a = once.step(DT).unwrap();
        let b = twice.step(DT).unwrap();
        assert_eq!(a.positions, b.positions);
    }
    assert_eq!(once.pinned_count(), twice.pinned_count());
    assert_eq!(once.step(0.0).unwrap().positions.node(0), Some(Vec3::new(-1.0, 3.0, -1.0)));
}

#[test]
fn pinned_dragged_node_stays_pinned_after_release() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    let target = Vec3::new(0.0, 3.5, 0.0);
    session.pick_node(40, target).unwrap();
    session.step(0.0).unwrap();

    assert_eq!(session.pin_node(40), Ok(true));
    assert_eq!(session.node_override(40), NodeOverride::Pinned);
    // Pin wins: moving the drag target no longer moves the node.
    session.drag_node(Vec3::new(1.0, 1.0, 1.0)).unwrap();
    assert_eq!(session.step(0.0).unwrap().positions.node(40), Some(target));

    session.release_node().unwrap();
    assert_eq!(session.node_override(40), NodeOverride::Pinned);
    for _ in 0..10 {
        session.step(DT).unwrap();
    }
    assert_eq!(session.step(0.0).unwrap().positions.node(40), Some(target));
}

#[test]
fn reset_clears_pins_and_drag() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    session.pin_node(1).unwrap();
    session.pick_node(2, Vec3::zero()).unwrap();
    session.reset();
    assert_eq!(session.pinned_count(), 0);
    assert_eq!(session.node_override(2), NodeOverride::None);
}

// === LIVE PARAMETERS ===

#[test]
fn stiffness_update_touches_only_stiffness() {
    let mut session = ready_session();
    let spec = ClothSpec::new(2.0, 2.0, 8, 8, Vec3::zero(), ClothMaterial::preset(crate::domain::MaterialPreset::Denim));
    session.create_cloth(&spec).unwrap();
    let handle = session.cloth().unwrap().handle;
    let backend = session.backend().unwrap();
    let before = backend.soft_coefficients(handle).unwrap();
    let topology_before = backend.soft_body_info(handle).unwrap();

    session.update_material(&MaterialUpdate::stiffness(0.2)).unwrap();

    let backend = session.backend().unwrap();
    let after = backend.soft_coefficients(handle).unwrap();
    assert_eq!(after.linear_stiffness, 0.2);
    assert_eq!(after.area_stiffness, 0.2);
    assert_eq!(after.dynamic_friction, before.dynamic_friction);
    assert_eq!(after.damping, before.damping);
    assert_eq!(after.total_mass, before.total_mass);
    assert_eq!(backend.soft_body_info(handle).unwrap(), topology_before);

    let material = session.cloth_material().unwrap();
    assert_eq!(material.stiffness(), 0.2);
    assert_eq!(material.structural, spec.material.structural);
}

#[test]
fn mass_update_keeps_pins() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    session.pin_node(5).unwrap();
    session.update_material(&MaterialUpdate { mass: Some(2.0), ..Default::default() }).unwrap();

    let handle = session.cloth().unwrap().handle;
    let backend = session.backend().unwrap();
    assert_eq!(backend.node_inverse_mass(handle, 5), Ok(0.0));
    assert_relative_eq!(backend.node_inverse_mass(handle, 6).unwrap(), 81.0 / 2.0, epsilon = 1e-4);
}

#[test]
fn material_update_without_cloth_is_a_noop() {
    let mut session = ready_session();
    assert_eq!(session.update_material(&MaterialUpdate::stiffness(0.5)), Ok(()));
}

#[test]
fn out_of_range_material_update_is_rejected() {
    let mut session = ready_session();
    session.create_cloth(&small_cloth(3.0)).unwrap();
    let update = MaterialUpdate { friction: Some(2.0), ..Default::default() };
    assert!(matches!(
        session.update_material(&update),
        Err(SessionError::Precondition(PreconditionViolation::InvalidMaterial(_)))
    ));
}
