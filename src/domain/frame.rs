//! Per-step output handed across the bridge.

use crate::core::Vec3;

/// Packed xyz node positions for one step.
///
/// Owned and move-only: the receiver takes the allocation, nothing on the
/// session side keeps a view of it.
#[derive(Debug, PartialEq)]
pub struct PositionBuffer(Box<[f32]>);

impl PositionBuffer {
    pub fn empty() -> Self {
        Self(Box::default())
    }

    pub fn zeroed(node_count: usize) -> Self {
        Self(vec![0.0; node_count * 3].into_boxed_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of floats (three per node).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn node_count(&self) -> usize {
        self.0.len() / 3
    }

    pub fn node(&self, index: usize) -> Option<Vec3> {
        let start = index.checked_mul(3)?;
        let xyz = self.0.get(start..start.checked_add(3)?)?;
        Some(Vec3::new(xyz[0], xyz[1], xyz[2]))
    }

    pub fn nodes(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.0.chunks_exact(3).map(|c| Vec3::new(c[0], c[1], c[2]))
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.0
    }
}

/// What one `step` returns. Empty positions mean there is no cloth to draw.
#[derive(Debug, PartialEq)]
pub struct StepResult {
    pub positions: PositionBuffer,
    /// Wall time spent inside the session for this step.
    pub step_latency_ms: f64,
    /// Internal integrator steps taken.
    pub sub_steps: u32,
}

impl StepResult {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
