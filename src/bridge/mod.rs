//! Step Bridge - request/response access to a session living elsewhere
//!
//! - protocol - the request and reply messages
//! - actor    - owns the session and the tool controller, answers one
//!              request at a time
//! - host     - native host: the actor on its own thread behind a tokio
//!              channel (not built for wasm, where `api::wasm` is the host)

mod actor;
mod protocol;

#[cfg(not(target_arch = "wasm32"))]
mod host;

pub use actor::SessionActor;
pub use protocol::{PositionBuffer, Request, Response, StepResult};

#[cfg(not(target_arch = "wasm32"))]
pub use host::SessionClient;
