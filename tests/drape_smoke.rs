use approx::assert_relative_eq;
use drape_engine::{
    ClothMaterial, ClothSpec, MaterialPreset, MaterialUpdate, SceneRecipe, SessionError, SimulationSession, Vec3,
};

#[test]
fn drape_smoke_step() {
    let mut session = SimulationSession::with_defaults();
    session.init().unwrap();
    let info = session.build_scene(&SceneRecipe::sample(2.0, 4.0, 20)).unwrap();
    assert_eq!(info.node_count, 21 * 21);

    for _ in 0..30 {
        let frame = session.step(1.0 / 60.0).unwrap();
        assert_eq!(frame.positions.len(), info.node_count * 3);
        assert!(frame.step_latency_ms >= 0.0);
    }
    let stats = session.last_step_stats();
    assert_eq!(stats.frame(), 30);
    assert!(stats.step_ms() >= 0.0);
}

#[test]
fn presets_build_and_settle_on_ground() {
    let mut session = SimulationSession::with_defaults();
    session.init().unwrap();
    session.create_ground().unwrap();
    for preset in MaterialPreset::ALL {
        let spec = ClothSpec::new(1.0, 1.0, 6, 6, Vec3::new(0.0, 0.5, 0.0), ClothMaterial::preset(preset));
        session.create_cloth(&spec).unwrap();
        let mut last = None;
        for _ in 0..120 {
            last = Some(session.step(1.0 / 60.0).unwrap().positions);
        }
        let positions = last.unwrap();
        for p in positions.nodes() {
            assert!(p.is_finite());
            assert!(p.y > -0.01, "{:?} fell through the ground: {:?}", preset, p);
        }
    }
}

#[test]
fn long_stall_is_capped() {
    let mut session = SimulationSession::with_defaults();
    session.init().unwrap();
    session.create_cloth(&ClothSpec::new(1.0, 1.0, 4, 4, Vec3::zero(), ClothMaterial::default())).unwrap();
    let frame = session.step(2.0).unwrap();
    assert_eq!(frame.sub_steps, 10);
    // The dropped time does not carry over.
    assert_eq!(session.step(0.0).unwrap().sub_steps, 0);
}

#[test]
fn material_update_json_round_trip() {
    let mut session = SimulationSession::with_defaults();
    session.init().unwrap();
    session.create_cloth(&ClothSpec::new(1.0, 1.0, 4, 4, Vec3::zero(), ClothMaterial::default())).unwrap();

    let update = MaterialUpdate::from_json(r#"{ "stiffness": 0.4, "damping": 0.05 }"#).unwrap();
    session.update_material(&update).unwrap();
    let material = session.cloth_material().unwrap();
    assert_relative_eq!(material.stiffness(), 0.4);
    assert_relative_eq!(material.live.damping, 0.05);
    assert_eq!(material.live.mass, ClothMaterial::default().live.mass);

    assert!(MaterialUpdate::from_json(r#"{ "bendingFactor": 0.3 }"#).is_err());
}

#[test]
fn step_requires_init() {
    let mut session = SimulationSession::with_defaults();
    assert!(matches!(session.step(0.0), Err(SessionError::Precondition(_))));
}
