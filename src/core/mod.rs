//! Core - macros and math shared by every layer
//!
//! Macros must be declared before the modules that use them, so this module
//! is mounted first in `lib.rs`.

#[macro_use]
#[path = "utils/log.rs"]
pub mod log;

#[macro_use]
#[path = "utils/safety.rs"]
pub mod safety;

#[path = "math/vec3.rs"]
pub mod vec3;

pub use vec3::Vec3;
