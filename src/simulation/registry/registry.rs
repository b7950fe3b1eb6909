//! Scene State Registry
//!
//! Sole owner of every backend handle the session created. Handles never
//! leave this module through the session API.

use crate::domain::{ClothInfo, ClothMaterial, ClothTopology, ResourceCleanupError, ShapeDescriptor};
use crate::systems::dynamics::{DynamicsBackend, RigidHandle, SoftHandle};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RigidEntry {
    pub(crate) handle: RigidHandle,
    pub shape: ShapeDescriptor,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClothEntry {
    pub(crate) handle: SoftHandle,
    pub topology: ClothTopology,
    pub material: ClothMaterial,
    pub info: ClothInfo,
}

/// Outcome of releasing every handle.
#[derive(Debug, Default)]
pub(crate) struct ReleaseReport {
    pub(crate) released: usize,
    pub(crate) failures: Vec<ResourceCleanupError>,
}

#[derive(Debug, Default)]
pub(crate) struct SceneRegistry {
    rigid: Vec<RigidEntry>,
    cloth: Option<ClothEntry>,
}

impl SceneRegistry {
    pub(crate) fn rigid_bodies(&self) -> &[RigidEntry] {
        &self.rigid
    }

    pub(crate) fn cloth(&self) -> Option<&ClothEntry> {
        self.cloth.as_ref()
    }

    pub(crate) fn cloth_mut(&mut self) -> Option<&mut ClothEntry> {
        self.cloth.as_mut()
    }

    pub(crate) fn push_rigid(&mut self, entry: RigidEntry) {
        self.rigid.push(entry);
    }

    /// Install the cloth. The caller must have released any previous one.
    pub(crate) fn set_cloth(&mut self, entry: ClothEntry) {
        debug_assert!(self.cloth.is_none(), "previous cloth was not released");
        self.cloth = Some(entry);
    }

    pub(crate) fn take_cloth(&mut self) -> Option<ClothEntry> {
        self.cloth.take()
    }

    pub(crate) fn len(&self) -> usize {
        self.rigid.len() + usize::from(self.cloth.is_some())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Release every handle, best effort. A failed destroy is recorded and
    /// the remaining handles are still released; the registry always ends
    /// empty.
    pub(crate) fn release_all<B: DynamicsBackend>(&mut self, backend: &mut B) -> ReleaseReport {
        let mut report = ReleaseReport::default();

        if let Some(cloth) = self.cloth.take() {
            match backend.remove_soft_body(cloth.handle) {
                Ok(()) => report.released += 1,
                Err(source) => report.failures.push(ResourceCleanupError {
                    what: format!("cloth {}", cloth.handle),
                    source,
                }),
            }
        }

        for entry in self.rigid.drain(..) {
            match backend.remove_rigid_body(entry.handle) {
                Ok(()) => report.released += 1,
                Err(source) => report.failures.push(ResourceCleanupError {
                    what: format!("{:?} {}", entry.shape.kind, entry.handle),
                    source,
                }),
            }
        }

        for failure in &report.failures {
            engine_warn!("reset: {}", failure);
        }
        report
    }
}
