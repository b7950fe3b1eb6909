//! SoftBody - cloth patch made of nodes joined by distance links
//!
//! Structural and shear links carry the live stiffness, bending links are
//! baked in at build time. Nodes are grouped into clusters for self
//! collision.

mod body;
pub mod clusters;
pub mod solver;

pub use body::{Link, LinkKind, SoftBody};
pub use clusters::Cluster;
