use std::collections::BTreeSet;

use crate::core::Vec3;

/// Per-node interaction state seen by `step`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum NodeOverride {
    None,
    /// Clamped to this position with zero velocity before every step.
    DraggedTo(Vec3),
    /// Inverse mass zero until the next reset or rebuild.
    Pinned,
}

/// At most one dragged node, any number of pinned ones. A node can be both;
/// pinned wins.
#[derive(Debug, Default)]
pub(crate) struct NodeOverrides {
    dragged: Option<(usize, Vec3)>,
    pinned: BTreeSet<usize>,
}

impl NodeOverrides {
    pub(crate) fn get(&self, node: usize) -> NodeOverride {
        if self.pinned.contains(&node) {
            return NodeOverride::Pinned;
        }
        match self.dragged {
            Some((n, target)) if n == node => NodeOverride::DraggedTo(target),
            _ => NodeOverride::None,
        }
    }

    pub(crate) fn start_drag(&mut self, node: usize, target: Vec3) {
        self.dragged = Some((node, target));
    }

    /// Returns false when no drag is active.
    pub(crate) fn move_drag(&mut self, target: Vec3) -> bool {
        match self.dragged.as_mut() {
            Some((_, t)) => {
                *t = target;
                true
            }
            None => false,
        }
    }

    pub(crate) fn end_drag(&mut self) -> bool {
        self.dragged.take().is_some()
    }

    /// Returns false if the node was already pinned.
    pub(crate) fn pin(&mut self, node: usize) -> bool {
        self.pinned.insert(node)
    }

    pub(crate) fn is_pinned(&self, node: usize) -> bool {
        self.pinned.contains(&node)
    }

    /// The drag clamp to apply this step, if any. Skipped for pinned nodes.
    pub(crate) fn drag_clamp(&self) -> Option<(usize, Vec3)> {
        self.dragged.filter(|(node, _)| !self.pinned.contains(node))
    }

    pub(crate) fn pinned_count(&self) -> usize {
        self.pinned.len()
    }

    pub(crate) fn clear(&mut self) {
        self.dragged = None;
        self.pinned.clear();
    }
}
