use crate::flamegraph::frame::{FlamegraphFrame, FlamegraphFrameId};
use crate::flamegraph::sort::NodeOrdering;
use crate::flamegraph::FlamegraphError;
use crate::model::{CallTree, FrameId, FrameVisitor, NodeId, Profile, ProfileId};

const ROOT: FlamegraphFrameId = FlamegraphFrameId(0);

/// Shared frame bookkeeping for both construction algorithms: owns the
/// frame arena (index 0 is the synthetic root), the in-progress stack, the
/// close-ordered output list, and the running maximum depth.
pub(crate) struct ChartBuilder {
    arena: Vec<FlamegraphFrame>,
    stack: Vec<FlamegraphFrameId>,
    frames: Vec<FlamegraphFrameId>,
    depth: u32,
}

impl ChartBuilder {
    pub(crate) fn new(root_frame: FrameId, root_node: NodeId) -> Self {
        let root = FlamegraphFrame {
            key: ROOT,
            frame: root_frame,
            node: root_node,
            parent: None,
            children: Vec::new(),
            depth: 0,
            start: 0.0,
            end: 0.0,
            profile_ids: Vec::new(),
        };
        Self {
            arena: vec![root],
            stack: Vec::new(),
            frames: Vec::new(),
            depth: 0,
        }
    }

    pub(crate) fn open(
        &mut self,
        node: NodeId,
        frame: FrameId,
        at: f64,
        profile_ids: Vec<ProfileId>,
    ) {
        let parent = self.stack.last().copied().unwrap_or(ROOT);
        let id = FlamegraphFrameId(self.arena.len());
        self.arena.push(FlamegraphFrame {
            key: id,
            frame,
            node,
            parent: Some(parent),
            children: Vec::new(),
            depth: 0,
            start: at,
            end: at,
            profile_ids,
        });
        self.arena[parent.0].children.push(id);
        self.stack.push(id);
    }

    pub(crate) fn close(&mut self, at: f64) -> Result<(), FlamegraphError> {
        let Some(top) = self.stack.pop() else {
            return Err(FlamegraphError::UnbalancedStack);
        };
        let depth = self.stack.len() as u32;
        let frame = &mut self.arena[top.0];
        frame.end = at;
        frame.depth = depth;
        // Zero-width frames stay attached in the tree but are never drawn.
        if frame.end - frame.start == 0.0 {
            return Ok(());
        }
        self.frames.push(top);
        self.depth = self.depth.max(depth);
        Ok(())
    }

    pub(crate) fn finish(self) -> (Vec<FlamegraphFrame>, Vec<FlamegraphFrameId>, u32) {
        (self.arena, self.frames, self.depth)
    }
}

/// Consumes a flamechart profile's chronological traversal, materializing
/// one frame per visit in close order.
pub(crate) struct CallOrderBuilder<'a> {
    pub(crate) profile: &'a Profile,
    pub(crate) chart: ChartBuilder,
}

impl FrameVisitor for CallOrderBuilder<'_> {
    type Error = FlamegraphError;

    fn open_frame(&mut self, node: NodeId, at: f64) -> Result<(), FlamegraphError> {
        let frame = self.profile.node(node).frame;
        self.chart.open(node, frame, at, Vec::new());
        Ok(())
    }

    fn close_frame(&mut self, _node: NodeId, at: f64) -> Result<(), FlamegraphError> {
        self.chart.close(at)
    }
}

/// Sorted construction: order every node's children by the comparator,
/// then lay siblings back-to-back, each interval sized by its subtree
/// weight. The order is computed into a side table so the shared profile
/// stays untouched.
pub(crate) fn build_sorted(
    profile: &Profile,
    chart: &mut ChartBuilder,
    cmp: NodeOrdering,
) -> Result<(), FlamegraphError> {
    let tree = profile.call_tree();
    let mut order: Vec<Vec<NodeId>> = (0..tree.len())
        .map(|index| tree.node(NodeId(index)).children.clone())
        .collect();
    for children in &mut order {
        children.sort_by(|a, b| cmp(profile, *a, *b));
    }

    struct Visit {
        node: NodeId,
        next_child: usize,
        start: f64,
        cursor: f64,
    }

    let mut stack = vec![Visit {
        node: CallTree::ROOT,
        next_child: 0,
        start: 0.0,
        cursor: 0.0,
    }];

    loop {
        let Some(top) = stack.last_mut() else { break };
        let node = top.node;
        let next = top.next_child;
        if let Some(&child) = order[node.0].get(next) {
            top.next_child += 1;
            let start = top.cursor;
            top.cursor += tree.node(child).total_weight;
            chart.open(
                child,
                tree.node(child).frame,
                start,
                profile.node_profile_ids(child).to_vec(),
            );
            stack.push(Visit {
                node: child,
                next_child: 0,
                start,
                cursor: start,
            });
        } else {
            let Some(state) = stack.pop() else { break };
            // The sentinel root is never materialized as a frame.
            if state.node == CallTree::ROOT {
                break;
            }
            chart.close(state.start + tree.node(state.node).total_weight)?;
        }
    }
    Ok(())
}
