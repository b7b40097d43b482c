use serde::{Deserialize, Serialize};

use crate::model::FrameId;

/// Index of a [`CallTreeNode`] in a profile's call tree arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Aggregated call tree node: one node per unique call path, merging every
/// occurrence of that path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTreeNode {
    pub frame: FrameId,
    pub children: Vec<NodeId>,
    /// Weight of this node including all descendants.
    pub total_weight: f64,
    /// Weight spent in this node itself, excluding children.
    pub self_weight: f64,
    /// Wall-clock duration in nanoseconds summed across occurrences.
    pub aggregate_duration_ns: f64,
}

impl CallTreeNode {
    pub fn new(frame: FrameId) -> Self {
        Self {
            frame,
            children: Vec::new(),
            total_weight: 0.0,
            self_weight: 0.0,
            aggregate_duration_ns: 0.0,
        }
    }
}

/// Arena-allocated call tree. Node 0 is always the sentinel root; it keeps
/// zero weight of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallTree {
    nodes: Vec<CallTreeNode>,
}

impl CallTree {
    pub const ROOT: NodeId = NodeId(0);

    pub fn new(root_frame: FrameId) -> Self {
        Self {
            nodes: vec![CallTreeNode::new(root_frame)],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &CallTreeNode {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut CallTreeNode {
        &mut self.nodes[id.0]
    }

    /// Find the child of `parent` carrying `frame`, creating it if this
    /// call path has not been seen before.
    pub(crate) fn child_with_frame(&mut self, parent: NodeId, frame: FrameId) -> NodeId {
        let existing = self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|child| self.nodes[child.0].frame == frame);
        if let Some(child) = existing {
            return child;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(CallTreeNode::new(frame));
        self.nodes[parent.0].children.push(id);
        id
    }
}
