use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use crate::bridge::{PositionBuffer, Request, SessionActor};
use crate::core::Vec3;
use crate::domain::{
    ClothMaterial, ClothSpec, EngineConfig, MaterialPreset, MaterialUpdate, ObstacleKind, PreconditionViolation,
    SceneRecipe, SessionError,
};
use crate::interaction::{InteractionOutcome, ToolMode};
use crate::simulation::StepStats;

fn to_js(err: SessionError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn invalid(err: PreconditionViolation) -> JsValue {
    to_js(err.into())
}

fn material_or_default(json: Option<String>) -> Result<ClothMaterial, JsValue> {
    match json {
        Some(json) => ClothMaterial::from_json(&json).map_err(invalid),
        None => Ok(ClothMaterial::default()),
    }
}

fn applied(outcome: InteractionOutcome) -> bool {
    outcome.is_applied()
}

/// One step's output. Positions are moved out once with `takePositions`.
#[wasm_bindgen]
pub struct StepFrame {
    positions: Option<PositionBuffer>,
    node_count: u32,
    step_latency_ms: f64,
    sub_steps: u32,
}

#[wasm_bindgen]
impl StepFrame {
    #[wasm_bindgen(getter, js_name = nodeCount)]
    pub fn node_count(&self) -> u32 { self.node_count }
    #[wasm_bindgen(getter, js_name = stepLatencyMs)]
    pub fn step_latency_ms(&self) -> f64 { self.step_latency_ms }
    #[wasm_bindgen(getter, js_name = subSteps)]
    pub fn sub_steps(&self) -> u32 { self.sub_steps }

    /// True when the step had no cloth to report.
    #[wasm_bindgen(js_name = isEmpty)]
    pub fn is_empty(&self) -> bool {
        self.node_count == 0
    }

    /// Packed xyz positions as a fresh array the worker can transfer.
    /// Returns `undefined` when empty or already taken.
    #[wasm_bindgen(js_name = takePositions)]
    pub fn take_positions(&mut self) -> Option<Float32Array> {
        let positions = self.positions.take().filter(|p| !p.is_empty())?;
        Some(Float32Array::from(positions.as_slice()))
    }
}

/// Cloth simulation owned by a web worker.
#[wasm_bindgen]
pub struct ClothWorker {
    actor: SessionActor,
}

#[wasm_bindgen]
impl ClothWorker {
    /// Create a worker; `config_json` is an optional partial `EngineConfig`.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: Option<String>) -> Result<ClothWorker, JsValue> {
        let config = match config_json {
            Some(json) => EngineConfig::from_json(&json).map_err(|e| to_js(SessionError::Initialization(e)))?,
            None => EngineConfig::default(),
        };
        Ok(Self { actor: SessionActor::new(config) })
    }

    #[wasm_bindgen(getter, js_name = isInitialized)]
    pub fn is_initialized(&self) -> bool {
        self.actor.session().is_initialized()
    }

    #[wasm_bindgen(js_name = initPhysics)]
    pub fn init_physics(&mut self) -> Result<(), JsValue> {
        self.actor.handle(Request::InitPhysics).into_done().map_err(to_js)
    }

    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.actor.handle(Request::Reset).into_done().map_err(to_js)
    }

    #[wasm_bindgen(js_name = createGround)]
    pub fn create_ground(&mut self) -> Result<(), JsValue> {
        self.actor.handle(Request::CreateGround).into_done().map_err(to_js)
    }

    /// `kind` is one of "cylinder", "sphere", "box", "none".
    #[wasm_bindgen(js_name = createObstacle)]
    pub fn create_obstacle(&mut self, kind: &str, radius: f32, height: f32, x: f32, y: f32, z: f32) -> Result<(), JsValue> {
        let kind = ObstacleKind::from_name(kind)
            .ok_or_else(|| invalid(PreconditionViolation::InvalidObstacle(format!("unknown obstacle kind '{}'", kind))))?;
        self.actor
            .handle(Request::CreateObstacle { kind, radius, height, position: Vec3::new(x, y, z) })
            .into_done()
            .map_err(to_js)
    }

    /// Build the cloth and return its `ClothInfo` as JSON.
    #[wasm_bindgen(js_name = createCloth)]
    #[allow(clippy::too_many_arguments)]
    pub fn create_cloth(
        &mut self,
        width: f32,
        height: f32,
        segments_w: u32,
        segments_h: u32,
        x: f32,
        y: f32,
        z: f32,
        material_json: Option<String>,
    ) -> Result<String, JsValue> {
        let material = material_or_default(material_json)?;
        let spec = ClothSpec::new(width, height, segments_w, segments_h, Vec3::new(x, y, z), material);
        let info = self.actor.handle(Request::CreateCloth(spec)).into_cloth().map_err(to_js)?;
        serde_json::to_string(&info).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Reset, ground, cylinder and a 6x6 cloth above it.
    #[wasm_bindgen(js_name = buildSampleScene)]
    pub fn build_sample_scene(
        &mut self,
        radius: f32,
        height: f32,
        segments: u32,
        material_json: Option<String>,
    ) -> Result<String, JsValue> {
        let material = material_or_default(material_json)?;
        let recipe = SceneRecipe::sample(radius, height, segments).with_material(material);
        let info = self.actor.handle(Request::BuildScene(recipe)).into_cloth().map_err(to_js)?;
        serde_json::to_string(&info).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Partial live update, e.g. `{"stiffness": 0.4}`. `bendingFactor` is
    /// rejected: bending needs a rebuild.
    #[wasm_bindgen(js_name = updateMaterial)]
    pub fn update_material(&mut self, update_json: &str) -> Result<(), JsValue> {
        let update = MaterialUpdate::from_json(update_json).map_err(invalid)?;
        self.actor.handle(Request::UpdateMaterial(update)).into_done().map_err(to_js)
    }

    /// Returns false when refused (drag in flight) or unchanged.
    #[wasm_bindgen(js_name = setTool)]
    pub fn set_tool(&mut self, mode: &str) -> Result<bool, JsValue> {
        let mode = ToolMode::from_name(mode)
            .ok_or_else(|| JsValue::from_str(&format!("unknown tool '{}'", mode)))?;
        self.actor.handle(Request::SetTool(mode)).into_outcome().map(applied).map_err(to_js)
    }

    #[wasm_bindgen(js_name = pickNode)]
    pub fn pick_node(&mut self, index: u32, x: f32, y: f32, z: f32) -> Result<bool, JsValue> {
        self.actor
            .handle(Request::PickNode { node: index as usize, target: Vec3::new(x, y, z) })
            .into_outcome()
            .map(applied)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = dragNode)]
    pub fn drag_node(&mut self, x: f32, y: f32, z: f32) -> Result<bool, JsValue> {
        self.actor
            .handle(Request::DragNode { target: Vec3::new(x, y, z) })
            .into_outcome()
            .map(applied)
            .map_err(to_js)
    }

    #[wasm_bindgen(js_name = releaseNode)]
    pub fn release_node(&mut self) -> Result<bool, JsValue> {
        self.actor.handle(Request::ReleaseNode).into_outcome().map(applied).map_err(to_js)
    }

    #[wasm_bindgen(js_name = pinNode)]
    pub fn pin_node(&mut self, index: u32) -> Result<bool, JsValue> {
        self.actor
            .handle(Request::PinNode { node: index as usize })
            .into_outcome()
            .map(applied)
            .map_err(to_js)
    }

    pub fn step(&mut self, dt: f32) -> Result<StepFrame, JsValue> {
        let result = self.actor.handle(Request::Step { dt }).into_frame().map_err(to_js)?;
        Ok(StepFrame {
            node_count: result.positions.node_count() as u32,
            positions: Some(result.positions),
            step_latency_ms: result.step_latency_ms,
            sub_steps: result.sub_steps,
        })
    }

    /// Timings of the last step.
    #[wasm_bindgen(js_name = getStepStats)]
    pub fn get_step_stats(&self) -> StepStats {
        self.actor.session().last_step_stats()
    }
}

/// JSON for a named material preset, for the control panel.
#[wasm_bindgen(js_name = materialPreset)]
pub fn material_preset(name: &str) -> Result<String, JsValue> {
    let preset = MaterialPreset::from_name(name)
        .ok_or_else(|| JsValue::from_str(&format!("unknown material preset '{}'", name)))?;
    serde_json::to_string(&ClothMaterial::preset(preset)).map_err(|e| JsValue::from_str(&e.to_string()))
}
