//! Systems - the physics the session drives
//!
//! - dynamics/   - backend boundary (trait, handles, descriptors) and `PbdWorld`
//! - rigid_body/ - static colliders
//! - soft_body/  - cloth patches, links, clusters and the solver

pub mod dynamics;
pub mod rigid_body;
pub mod soft_body;
