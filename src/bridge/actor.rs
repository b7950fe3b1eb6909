use crate::domain::{EngineConfig, SessionResult};
use crate::interaction::{InteractionController, InteractionOutcome};
use crate::simulation::SimulationSession;
use crate::systems::dynamics::{DynamicsBackend, PbdWorld};

use super::protocol::{Request, Response};

/// Single owner of a session. Requests are handled to completion, one at a
/// time, in the order they arrive.
pub struct SessionActor<B: DynamicsBackend = PbdWorld> {
    session: SimulationSession<B>,
    controller: InteractionController,
}

impl<B: DynamicsBackend> SessionActor<B> {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            session: SimulationSession::new(config),
            controller: InteractionController::new(),
        }
    }

    pub fn session(&self) -> &SimulationSession<B> {
        &self.session
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn handle(&mut self, request: Request) -> Response {
        let name = request.name();
        let response = self.dispatch(request);
        if let Response::Failed(e) = &response {
            engine_debug!("{} failed: {}", name, e);
        }
        response
    }

    fn dispatch(&mut self, request: Request) -> Response {
        let session = &mut self.session;
        let controller = &mut self.controller;
        match request {
            Request::InitPhysics => {
                controller.clear_drag();
                Response::from_result(session.init(), |_| Response::Done)
            }
            Request::Reset => {
                controller.clear_drag();
                session.reset();
                Response::Done
            }
            Request::CreateGround => Response::from_result(session.create_ground(), |_| Response::Done),
            Request::CreateObstacle { kind, radius, height, position } => Response::from_result(
                session.create_obstacle(kind, radius, height, position),
                |_| Response::Done,
            ),
            Request::CreateCloth(spec) => {
                let result = session.create_cloth(&spec);
                if result.is_ok() {
                    controller.clear_drag();
                }
                Response::from_result(result, Response::Cloth)
            }
            Request::BuildScene(recipe) => {
                let result = session.build_scene(&recipe);
                if result.is_ok() {
                    controller.clear_drag();
                }
                Response::from_result(result, Response::Cloth)
            }
            Request::UpdateMaterial(update) => {
                Response::from_result(session.update_material(&update), |_| Response::Done)
            }
            Request::SetTool(mode) => Response::Interaction(controller.set_tool(mode)),
            Request::PickNode { node, target } => interaction(controller.pick(session, node, target)),
            Request::DragNode { target } => interaction(controller.drag(session, target)),
            Request::ReleaseNode => interaction(controller.release(session)),
            Request::PinNode { node } => interaction(controller.pin(session, node)),
            Request::Step { dt } => Response::from_result(session.step(dt), Response::Frame),
            Request::StepStats => Response::Stats(session.last_step_stats()),
        }
    }

    /// Release everything the session holds. Used when the host goes away.
    pub fn shutdown(&mut self) {
        self.controller.clear_drag();
        self.session.reset();
    }
}

fn interaction(result: SessionResult<InteractionOutcome>) -> Response {
    Response::from_result(result, Response::Interaction)
}
