use std::thread::{self, JoinHandle};

use tokio::sync::{mpsc, oneshot};

use crate::core::Vec3;
use crate::domain::{
    ClothInfo, ClothSpec, EngineConfig, MaterialUpdate, ObstacleKind, SceneRecipe, SessionError, SessionResult,
};
use crate::interaction::{InteractionOutcome, ToolMode};
use crate::simulation::StepStats;
use crate::systems::dynamics::{DynamicsBackend, PbdWorld};

use super::actor::SessionActor;
use super::protocol::{Request, Response, StepResult};

type Envelope = (Request, oneshot::Sender<Response>);

/// Requests in flight at once. `&mut self` on every call keeps it at one.
const CHANNEL_CAPACITY: usize = 1;

/// Native handle to a session running on its own thread.
///
/// Every method takes `&mut self`, so a caller cannot issue a second request
/// before the first one has been answered.
pub struct SessionClient {
    tx: Option<mpsc::Sender<Envelope>>,
    thread: Option<JoinHandle<()>>,
}

impl SessionClient {
    /// Start a session over the in-crate integrator.
    pub fn spawn(config: EngineConfig) -> SessionResult<Self> {
        Self::spawn_with::<PbdWorld>(config)
    }

    /// Start a session over backend `B`. The backend is created on the
    /// session thread and never crosses threads.
    pub fn spawn_with<B: DynamicsBackend + 'static>(config: EngineConfig) -> SessionResult<Self> {
        let (tx, mut rx) = mpsc::channel::<Envelope>(CHANNEL_CAPACITY);
        let thread = thread::Builder::new()
            .name("drape-session".to_string())
            .spawn(move || {
                let mut actor = SessionActor::<B>::new(config);
                while let Some((request, reply)) = rx.blocking_recv() {
                    // Receiver gone means the caller stopped waiting.
                    let _ = reply.send(actor.handle(request));
                }
                actor.shutdown();
                engine_debug!("session thread stopped");
            })
            .map_err(|e| SessionError::Initialization(format!("could not start session thread: {}", e)))?;

        Ok(Self { tx: Some(tx), thread: Some(thread) })
    }

    async fn request(&mut self, request: Request) -> SessionResult<Response> {
        let tx = self.tx.as_ref().ok_or(SessionError::Disconnected)?;
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send((request, reply_tx)).await.map_err(|_| SessionError::Disconnected)?;
        reply_rx.await.map_err(|_| SessionError::Disconnected)
    }

    pub async fn init_physics(&mut self) -> SessionResult<()> {
        self.request(Request::InitPhysics).await?.into_done()
    }

    pub async fn reset(&mut self) -> SessionResult<()> {
        self.request(Request::Reset).await?.into_done()
    }

    pub async fn create_ground(&mut self) -> SessionResult<()> {
        self.request(Request::CreateGround).await?.into_done()
    }

    pub async fn create_obstacle(
        &mut self,
        kind: ObstacleKind,
        radius: f32,
        height: f32,
        position: Vec3,
    ) -> SessionResult<()> {
        self.request(Request::CreateObstacle { kind, radius, height, position })
            .await?
            .into_done()
    }

    pub async fn create_cloth(&mut self, spec: ClothSpec) -> SessionResult<ClothInfo> {
        self.request(Request::CreateCloth(spec)).await?.into_cloth()
    }

    /// Reset, ground, obstacle, cloth; each awaited before the next.
    pub async fn build_scene(&mut self, recipe: SceneRecipe) -> SessionResult<ClothInfo> {
        recipe.cloth.validate()?;
        self.reset().await?;
        self.create_ground().await?;
        let o = recipe.obstacle;
        self.create_obstacle(o.kind, o.radius, o.height, o.position).await?;
        self.create_cloth(recipe.cloth).await
    }

    pub async fn update_material(&mut self, update: MaterialUpdate) -> SessionResult<()> {
        self.request(Request::UpdateMaterial(update)).await?.into_done()
    }

    pub async fn set_tool(&mut self, mode: ToolMode) -> SessionResult<InteractionOutcome> {
        self.request(Request::SetTool(mode)).await?.into_outcome()
    }

    pub async fn pick_node(&mut self, node: usize, target: Vec3) -> SessionResult<InteractionOutcome> {
        self.request(Request::PickNode { node, target }).await?.into_outcome()
    }

    pub async fn drag_node(&mut self, target: Vec3) -> SessionResult<InteractionOutcome> {
        self.request(Request::DragNode { target }).await?.into_outcome()
    }

    pub async fn release_node(&mut self) -> SessionResult<InteractionOutcome> {
        self.request(Request::ReleaseNode).await?.into_outcome()
    }

    pub async fn pin_node(&mut self, node: usize) -> SessionResult<InteractionOutcome> {
        self.request(Request::PinNode { node }).await?.into_outcome()
    }

    pub async fn step(&mut self, dt: f32) -> SessionResult<StepResult> {
        self.request(Request::Step { dt }).await?.into_frame()
    }

    pub async fn step_stats(&mut self) -> SessionResult<StepStats> {
        self.request(Request::StepStats).await?.into_stats()
    }

    /// Stop the session thread after it releases the scene.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                engine_error!("session thread panicked");
            }
        }
    }
}

impl Drop for SessionClient {
    fn drop(&mut self) {
        self.stop();
    }
}
