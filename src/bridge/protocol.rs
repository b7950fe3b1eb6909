use crate::core::Vec3;
use crate::domain::{
    ClothInfo, ClothSpec, MaterialUpdate, ObstacleKind, SceneRecipe, SessionError, SessionResult,
};
use crate::interaction::{InteractionOutcome, ToolMode};
use crate::simulation::StepStats;

pub use crate::domain::{PositionBuffer, StepResult};

/// One operation against the session.
#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    InitPhysics,
    Reset,
    CreateGround,
    CreateObstacle {
        kind: ObstacleKind,
        radius: f32,
        height: f32,
        position: Vec3,
    },
    CreateCloth(ClothSpec),
    BuildScene(SceneRecipe),
    UpdateMaterial(MaterialUpdate),
    SetTool(ToolMode),
    PickNode { node: usize, target: Vec3 },
    DragNode { target: Vec3 },
    ReleaseNode,
    PinNode { node: usize },
    Step { dt: f32 },
    StepStats,
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::InitPhysics => "init_physics",
            Request::Reset => "reset",
            Request::CreateGround => "create_ground",
            Request::CreateObstacle { .. } => "create_obstacle",
            Request::CreateCloth(_) => "create_cloth",
            Request::BuildScene(_) => "build_scene",
            Request::UpdateMaterial(_) => "update_material",
            Request::SetTool(_) => "set_tool",
            Request::PickNode { .. } => "pick_node",
            Request::DragNode { .. } => "drag_node",
            Request::ReleaseNode => "release_node",
            Request::PinNode { .. } => "pin_node",
            Request::Step { .. } => "step",
            Request::StepStats => "step_stats",
        }
    }
}

/// The session's answer. `Frame` owns the step's position buffer, so replies
/// are moved, never copied.
#[derive(Debug, PartialEq)]
pub enum Response {
    Done,
    Cloth(ClothInfo),
    Interaction(InteractionOutcome),
    Frame(StepResult),
    Stats(StepStats),
    Failed(SessionError),
}

impl Response {
    pub(crate) fn from_result<T>(result: SessionResult<T>, wrap: impl FnOnce(T) -> Response) -> Response {
        match result {
            Ok(value) => wrap(value),
            Err(e) => Response::Failed(e),
        }
    }

    pub fn into_done(self) -> SessionResult<()> {
        match self {
            Response::Done => Ok(()),
            other => Err(other.mismatch("done")),
        }
    }

    pub fn into_cloth(self) -> SessionResult<ClothInfo> {
        match self {
            Response::Cloth(info) => Ok(info),
            other => Err(other.mismatch("cloth info")),
        }
    }

    pub fn into_outcome(self) -> SessionResult<InteractionOutcome> {
        match self {
            Response::Interaction(outcome) => Ok(outcome),
            other => Err(other.mismatch("interaction outcome")),
        }
    }

    pub fn into_frame(self) -> SessionResult<StepResult> {
        match self {
            Response::Frame(frame) => Ok(frame),
            other => Err(other.mismatch("step frame")),
        }
    }

    pub fn into_stats(self) -> SessionResult<StepStats> {
        match self {
            Response::Stats(stats) => Ok(stats),
            other => Err(other.mismatch("step stats")),
        }
    }

    /// A failure passes through; any other reply is a protocol bug.
    fn mismatch(self, expected: &'static str) -> SessionError {
        match self {
            Response::Failed(e) => e,
            _ => SessionError::UnexpectedReply(expected),
        }
    }
}
