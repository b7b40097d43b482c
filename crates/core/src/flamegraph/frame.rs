use serde::{Deserialize, Serialize};

use crate::model::{FrameId, NodeId, ProfileId};

/// Index of a [`FlamegraphFrame`] within one built flamegraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlamegraphFrameId(pub usize);

/// One visual occurrence of a call tree node in a built flamegraph.
///
/// Call-order builds produce one frame per traversal visit, so several
/// frames may reference the same node; sorted builds produce one frame per
/// node. Frames reference their profile's frame table and call tree by id
/// and never duplicate either.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlamegraphFrame {
    /// Unique incrementing identifier within one build (its arena index).
    pub key: FlamegraphFrameId,
    pub frame: FrameId,
    pub node: NodeId,
    /// Enclosing frame; `None` only for the synthetic root.
    pub parent: Option<FlamegraphFrameId>,
    pub children: Vec<FlamegraphFrameId>,
    /// Stack depth at close time. Meaningful only for materialized frames.
    pub depth: u32,
    /// Start position on the time axis, in the profile's unit.
    pub start: f64,
    /// End position on the time axis. Never less than `start`.
    pub end: f64,
    /// Source profiles contributing to this frame. Populated by sorted
    /// builds only.
    pub profile_ids: Vec<ProfileId>,
}

impl FlamegraphFrame {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}
