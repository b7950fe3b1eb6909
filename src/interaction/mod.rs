//! Interaction - tool modes on the caller side of the session
//!
//! The session keeps drag and pin state per node and will happily hold both.
//! Mutual exclusion between the tools is enforced here, before a request
//! reaches the session.

mod controller;

pub use controller::{InteractionController, InteractionOutcome, ToolMode};
