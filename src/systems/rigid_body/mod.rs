//! Static rigid bodies - ground slab and obstacles the cloth collides with
//!
//! Bodies never move. Each one is a box, an upright cylinder or a sphere,
//! inflated by its margin, and pushes cloth nodes back to its surface.

mod body;
mod collision;

pub use body::StaticBody;
pub use collision::Contact;
