use wasm_bindgen::prelude::*;

/// Timing snapshot of the last `step`. All zeros before the first step.
#[wasm_bindgen]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepStats {
    pub(super) step_ms: f64,
    pub(super) override_ms: f64,
    pub(super) integrate_ms: f64,
    pub(super) harvest_ms: f64,
    pub(super) sub_steps: u32,
    pub(super) node_count: u32,
    pub(super) frame: u32,
}

#[wasm_bindgen]
impl StepStats {
    #[wasm_bindgen(getter, js_name = stepMs)]
    pub fn step_ms(&self) -> f64 { self.step_ms }
    #[wasm_bindgen(getter, js_name = overrideMs)]
    pub fn override_ms(&self) -> f64 { self.override_ms }
    #[wasm_bindgen(getter, js_name = integrateMs)]
    pub fn integrate_ms(&self) -> f64 { self.integrate_ms }
    #[wasm_bindgen(getter, js_name = harvestMs)]
    pub fn harvest_ms(&self) -> f64 { self.harvest_ms }
    #[wasm_bindgen(getter, js_name = subSteps)]
    pub fn sub_steps(&self) -> u32 { self.sub_steps }
    #[wasm_bindgen(getter, js_name = nodeCount)]
    pub fn node_count(&self) -> u32 { self.node_count }
    #[wasm_bindgen(getter)]
    pub fn frame(&self) -> u32 { self.frame }
}
