use serde::{Deserialize, Serialize};

use crate::core::Vec3;
use crate::domain::SessionResult;
use crate::simulation::SimulationSession;
use crate::systems::dynamics::DynamicsBackend;

/// Active pointer tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ToolMode {
    #[default]
    View,
    Drag,
    Pin,
}

impl ToolMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "view" | "orbit" => Some(ToolMode::View),
            "drag" => Some(ToolMode::Drag),
            "pin" => Some(ToolMode::Pin),
            _ => None,
        }
    }
}

/// What happened to an interaction request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// Reached the session and changed state.
    Applied,
    /// Reached the session, nothing to do (no cloth, no drag, already pinned).
    NoEffect,
    /// Stopped by the controller; the session never saw it.
    Refused(&'static str),
}

impl InteractionOutcome {
    fn from_applied(applied: bool) -> Self {
        if applied {
            InteractionOutcome::Applied
        } else {
            InteractionOutcome::NoEffect
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, InteractionOutcome::Applied)
    }
}

/// Tool-mode gate in front of the session's interaction commands.
///
/// | mode | pick | drag | pin | release |
/// |------|------|------|-----|---------|
/// | View |  -   |  -   |  -  |   yes   |
/// | Drag | yes  | yes  |  -  |   yes   |
/// | Pin  |  -   |  -   | yes |   yes   |
#[derive(Clone, Copy, Debug, Default)]
pub struct InteractionController {
    mode: ToolMode,
    dragging: bool,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ToolMode {
        self.mode
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Switch tools. Refused while a drag is in flight.
    pub fn set_tool(&mut self, mode: ToolMode) -> InteractionOutcome {
        if self.dragging && mode != self.mode {
            engine_debug!("set_tool({:?}) refused: drag in flight", mode);
            return InteractionOutcome::Refused("release the drag before changing tools");
        }
        if mode == self.mode {
            return InteractionOutcome::NoEffect;
        }
        self.mode = mode;
        InteractionOutcome::Applied
    }

    pub fn pick<B: DynamicsBackend>(
        &mut self,
        session: &mut SimulationSession<B>,
        node: usize,
        target: Vec3,
    ) -> SessionResult<InteractionOutcome> {
        if self.mode != ToolMode::Drag {
            return Ok(self.refuse("pick", "pick needs the drag tool"));
        }
        let applied = session.pick_node(node, target)?;
        self.dragging = applied;
        Ok(InteractionOutcome::from_applied(applied))
    }

    pub fn drag<B: DynamicsBackend>(
        &mut self,
        session: &mut SimulationSession<B>,
        target: Vec3,
    ) -> SessionResult<InteractionOutcome> {
        if self.mode != ToolMode::Drag {
            return Ok(self.refuse("drag", "drag needs the drag tool"));
        }
        if !self.dragging {
            return Ok(InteractionOutcome::NoEffect);
        }
        session.drag_node(target).map(InteractionOutcome::from_applied)
    }

    /// Allowed in every mode so a drag can always be ended.
    pub fn release<B: DynamicsBackend>(
        &mut self,
        session: &mut SimulationSession<B>,
    ) -> SessionResult<InteractionOutcome> {
        let applied = session.release_node()?;
        self.dragging = false;
        Ok(InteractionOutcome::from_applied(applied))
    }

    pub fn pin<B: DynamicsBackend>(
        &mut self,
        session: &mut SimulationSession<B>,
        node: usize,
    ) -> SessionResult<InteractionOutcome> {
        if self.mode != ToolMode::Pin {
            return Ok(self.refuse("pin", "pin needs the pin tool"));
        }
        session.pin_node(node).map(InteractionOutcome::from_applied)
    }

    /// Forget any drag. Called when the session is reset under us.
    pub fn clear_drag(&mut self) {
        self.dragging = false;
    }

    fn refuse(&self, op: &str, reason: &'static str) -> InteractionOutcome {
        engine_debug!("{} refused in {:?} mode", op, self.mode);
        InteractionOutcome::Refused(reason)
    }
}
