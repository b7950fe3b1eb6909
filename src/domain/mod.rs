//! Domain - plain data shared across layers (no simulation logic)

pub mod config;
pub mod error;
pub mod frame;
pub mod material;
pub mod scene;

pub use config::{EngineConfig, GroundConfig};
pub use error::{PreconditionViolation, ResourceCleanupError, SessionError, SessionResult};
pub use frame::{PositionBuffer, StepResult};
pub use material::{ClothMaterial, LiveMaterial, MaterialPreset, MaterialUpdate, StructuralMaterial};
pub use scene::{
    ClothInfo, ClothSpec, ClothTopology, ObstacleKind, ObstacleSpec, SceneRecipe, ShapeDescriptor, ShapeKind,
};
