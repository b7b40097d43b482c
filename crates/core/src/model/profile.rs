use emberview_protocol::ProfilingUnit;
use serde::{Deserialize, Serialize};

use crate::model::{CallTree, CallTreeNode, Frame, FrameId, NodeId};

/// Identifier of the raw profile a call tree node originated from. Used to
/// attribute aggregated frames back to their source profiles.
pub type ProfileId = String;

/// Capability class of a profile: which sort orders its data supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    /// Chronological open/close data is available. Supports call order and
    /// left heavy.
    Flamechart,
    /// Aggregated weights only, no chronology. Supports left heavy and
    /// alphabetical.
    Flamegraph,
}

impl std::fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flamechart => write!(f, "flamechart"),
            Self::Flamegraph => write!(f, "flamegraph"),
        }
    }
}

/// Whether a traversal step enters or leaves a call tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Open,
    Close,
}

/// One chronological traversal step, timestamped in the profile's unit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileEvent {
    pub kind: EventKind,
    pub node: NodeId,
    pub at: f64,
}

/// Raw open/close record over the frame table, before call tree
/// resolution. The input to [`Profile::from_events`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameEvent {
    pub kind: EventKind,
    pub frame: FrameId,
    pub at: f64,
}

/// A stack sample: leaf-last call stack plus the weight it accounts for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub stack: Vec<FrameId>,
    pub weight: f64,
    /// Source profiles that contributed this sample, in aggregation
    /// scenarios.
    #[serde(default)]
    pub profile_ids: Vec<ProfileId>,
}

/// Visitor receiving a profile's depth-first open/close traversal.
///
/// `open_frame` fires when the traversal enters a call tree node,
/// `close_frame` when it leaves it; timestamps are in the profile's unit.
pub trait FrameVisitor {
    type Error;

    fn open_frame(&mut self, node: NodeId, at: f64) -> Result<(), Self::Error>;
    fn close_frame(&mut self, node: NodeId, at: f64) -> Result<(), Self::Error>;
}

/// A recorded performance profile: frame table, aggregated call tree, and
/// (for flamecharts) the chronological event stream.
///
/// Profiles are immutable once a constructor returns; flamegraph builds
/// share them behind `Arc` and only read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    name: Option<String>,
    kind: ProfileKind,
    unit: ProfilingUnit,
    duration: f64,
    frames: Vec<Frame>,
    call_tree: CallTree,
    events: Vec<ProfileEvent>,
    /// Arena-parallel map from call tree node to the set of profile ids
    /// that contributed to it.
    node_profile_ids: Vec<Vec<ProfileId>>,
}

/// A frame currently open while replaying raw events.
struct OpenSpan {
    node: NodeId,
    opened_at: f64,
    child_time: f64,
}

fn finish_span(
    tree: &mut CallTree,
    stack: &mut Vec<OpenSpan>,
    span: OpenSpan,
    at: f64,
    ns_factor: Option<f64>,
    out: &mut Vec<ProfileEvent>,
) {
    let duration = (at - span.opened_at).max(0.0);
    let node = tree.node_mut(span.node);
    node.total_weight += duration;
    node.self_weight += (duration - span.child_time).max(0.0);
    if let Some(factor) = ns_factor {
        node.aggregate_duration_ns += duration * factor;
    }
    if let Some(parent) = stack.last_mut() {
        parent.child_time += duration;
    }
    out.push(ProfileEvent {
        kind: EventKind::Close,
        node: span.node,
        at,
    });
}

impl Profile {
    /// Build a flamechart profile from raw open/close records.
    ///
    /// Timestamps are normalized to a zero origin at `start`. Stray closes
    /// are dropped and frames still open at `end` are closed there, so the
    /// stored event stream is always balanced.
    pub fn from_events(
        name: Option<String>,
        unit: ProfilingUnit,
        mut frames: Vec<Frame>,
        events: &[FrameEvent],
        start: f64,
        end: f64,
    ) -> Self {
        let root_frame = FrameId(frames.len());
        frames.push(Frame::root());
        let mut call_tree = CallTree::new(root_frame);
        let mut out = Vec::with_capacity(events.len());
        let mut stack: Vec<OpenSpan> = Vec::new();
        let ns_factor = unit.to_nanoseconds_factor();

        for event in events {
            let at = event.at - start;
            match event.kind {
                EventKind::Open => {
                    let parent = stack.last().map_or(CallTree::ROOT, |span| span.node);
                    let node = call_tree.child_with_frame(parent, event.frame);
                    out.push(ProfileEvent {
                        kind: EventKind::Open,
                        node,
                        at,
                    });
                    stack.push(OpenSpan {
                        node,
                        opened_at: at,
                        child_time: 0.0,
                    });
                }
                EventKind::Close => {
                    let Some(span) = stack.pop() else { continue };
                    let at = at.max(span.opened_at);
                    finish_span(&mut call_tree, &mut stack, span, at, ns_factor, &mut out);
                }
            }
        }

        let end_at = end - start;
        while let Some(span) = stack.pop() {
            let at = end_at.max(span.opened_at);
            finish_span(&mut call_tree, &mut stack, span, at, ns_factor, &mut out);
        }

        let node_profile_ids = vec![Vec::new(); call_tree.len()];
        Self {
            name,
            kind: ProfileKind::Flamechart,
            unit,
            duration: (end - start).max(0.0),
            frames,
            call_tree,
            events: out,
            node_profile_ids,
        }
    }

    /// Build a flamechart profile from chronological stack samples.
    ///
    /// Consecutive samples sharing a stack prefix continue the same spans;
    /// the event stream lays samples back-to-back by weight.
    pub fn from_samples(
        name: Option<String>,
        unit: ProfilingUnit,
        mut frames: Vec<Frame>,
        samples: &[Sample],
    ) -> Self {
        let root_frame = FrameId(frames.len());
        frames.push(Frame::root());
        let mut call_tree = CallTree::new(root_frame);
        let mut node_profile_ids: Vec<Vec<ProfileId>> = vec![Vec::new()];
        let mut events = Vec::new();
        let ns_factor = unit.to_nanoseconds_factor();
        let mut open: Vec<(FrameId, NodeId)> = Vec::new();
        let mut cursor = 0.0;

        for sample in samples {
            let mut shared = 0;
            while shared < open.len()
                && shared < sample.stack.len()
                && open[shared].0 == sample.stack[shared]
            {
                shared += 1;
            }
            while open.len() > shared {
                if let Some((_, node)) = open.pop() {
                    events.push(ProfileEvent {
                        kind: EventKind::Close,
                        node,
                        at: cursor,
                    });
                }
            }
            for &frame in &sample.stack[shared..] {
                let parent = open.last().map_or(CallTree::ROOT, |&(_, node)| node);
                let node = call_tree.child_with_frame(parent, frame);
                node_profile_ids.resize_with(call_tree.len(), Vec::new);
                events.push(ProfileEvent {
                    kind: EventKind::Open,
                    node,
                    at: cursor,
                });
                open.push((frame, node));
            }
            for (position, &(_, node)) in open.iter().enumerate() {
                let tree_node = call_tree.node_mut(node);
                tree_node.total_weight += sample.weight;
                if position == open.len() - 1 {
                    tree_node.self_weight += sample.weight;
                }
                if let Some(factor) = ns_factor {
                    tree_node.aggregate_duration_ns += sample.weight * factor;
                }
                record_profile_ids(&mut node_profile_ids, node, &sample.profile_ids);
            }
            cursor += sample.weight;
        }

        while let Some((_, node)) = open.pop() {
            events.push(ProfileEvent {
                kind: EventKind::Close,
                node,
                at: cursor,
            });
        }

        node_profile_ids.resize_with(call_tree.len(), Vec::new);
        Self {
            name,
            kind: ProfileKind::Flamechart,
            unit,
            duration: cursor,
            frames,
            call_tree,
            events,
            node_profile_ids,
        }
    }

    /// Build an aggregated (flamegraph-kind) profile from weighted stacks,
    /// typically merged from several source profiles. No chronology is
    /// retained, so call-order views are unavailable.
    pub fn from_aggregate(
        name: Option<String>,
        unit: ProfilingUnit,
        mut frames: Vec<Frame>,
        samples: &[Sample],
    ) -> Self {
        let root_frame = FrameId(frames.len());
        frames.push(Frame::root());
        let mut call_tree = CallTree::new(root_frame);
        let mut node_profile_ids: Vec<Vec<ProfileId>> = vec![Vec::new()];
        let ns_factor = unit.to_nanoseconds_factor();
        let mut duration = 0.0;

        for sample in samples {
            let mut parent = CallTree::ROOT;
            for (position, &frame) in sample.stack.iter().enumerate() {
                let node = call_tree.child_with_frame(parent, frame);
                node_profile_ids.resize_with(call_tree.len(), Vec::new);
                let tree_node = call_tree.node_mut(node);
                tree_node.total_weight += sample.weight;
                if position == sample.stack.len() - 1 {
                    tree_node.self_weight += sample.weight;
                }
                if let Some(factor) = ns_factor {
                    tree_node.aggregate_duration_ns += sample.weight * factor;
                }
                record_profile_ids(&mut node_profile_ids, node, &sample.profile_ids);
                parent = node;
            }
            duration += sample.weight;
        }

        Self {
            name,
            kind: ProfileKind::Flamegraph,
            unit,
            duration,
            frames,
            call_tree,
            events: Vec::new(),
            node_profile_ids,
        }
    }

    /// Zero-data placeholder profile. Its zero duration makes flamegraphs
    /// built from it fall back to the one-second placeholder grid.
    pub fn empty() -> Self {
        Self::from_events(
            None,
            ProfilingUnit::Milliseconds,
            Vec::new(),
            &[],
            0.0,
            0.0,
        )
    }

    /// Canned demo profile used for UI previews.
    pub fn example() -> Self {
        let frames = vec![
            Frame::new("main").with_file("app/main.py"),
            Frame::new("parse_config").with_file("app/config.py"),
            Frame::new("run_app").with_file("app/main.py"),
            Frame::new("handle_request").with_file("app/server.py"),
            Frame::new("query_db").with_file("app/db.py"),
            Frame::new("render").with_file("app/views.py"),
            Frame::new("gc").with_file("runtime"),
        ];
        let stack = |ids: &[usize]| ids.iter().map(|&id| FrameId(id)).collect::<Vec<_>>();
        let samples = vec![
            Sample {
                stack: stack(&[0, 1]),
                weight: 20.0,
                profile_ids: Vec::new(),
            },
            Sample {
                stack: stack(&[0, 2, 3, 4]),
                weight: 40.0,
                profile_ids: Vec::new(),
            },
            Sample {
                stack: stack(&[0, 2, 3, 5]),
                weight: 30.0,
                profile_ids: Vec::new(),
            },
            Sample {
                stack: stack(&[0, 2, 6]),
                weight: 10.0,
                profile_ids: Vec::new(),
            },
        ];
        Self::from_samples(
            Some("example".to_string()),
            ProfilingUnit::Milliseconds,
            frames,
            &samples,
        )
    }

    /// Assemble a profile from already-built parts, without the balance
    /// guarantees of the public constructors.
    #[cfg(test)]
    pub(crate) fn from_raw_parts(
        kind: ProfileKind,
        unit: ProfilingUnit,
        duration: f64,
        frames: Vec<Frame>,
        call_tree: CallTree,
        events: Vec<ProfileEvent>,
    ) -> Self {
        let node_profile_ids = vec![Vec::new(); call_tree.len()];
        Self {
            name: None,
            kind,
            unit,
            duration,
            frames,
            call_tree,
            events,
            node_profile_ids,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    pub fn unit(&self) -> ProfilingUnit {
        self.unit
    }

    /// Total elapsed weight of the profile, in its own unit.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn frame(&self, id: FrameId) -> &Frame {
        &self.frames[id.0]
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn call_tree(&self) -> &CallTree {
        &self.call_tree
    }

    pub fn node(&self, id: NodeId) -> &CallTreeNode {
        self.call_tree.node(id)
    }

    /// Chronological event stream. Empty for aggregated profiles.
    pub fn events(&self) -> &[ProfileEvent] {
        &self.events
    }

    /// Profile ids attributed to a call tree node.
    pub fn node_profile_ids(&self, id: NodeId) -> &[ProfileId] {
        self.node_profile_ids
            .get(id.0)
            .map_or(&[], Vec::as_slice)
    }

    /// Walk the profile depth-first, reporting each node entry and exit to
    /// the visitor with timestamps in the profile's unit.
    ///
    /// Flamecharts replay their recorded event stream; aggregated profiles
    /// walk the call tree with synthetic back-to-back timestamps. The
    /// traversal borrows the profile immutably and can be restarted at
    /// will.
    pub fn visit_frames<V: FrameVisitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        match self.kind {
            ProfileKind::Flamechart => {
                for event in &self.events {
                    match event.kind {
                        EventKind::Open => visitor.open_frame(event.node, event.at)?,
                        EventKind::Close => visitor.close_frame(event.node, event.at)?,
                    }
                }
                Ok(())
            }
            ProfileKind::Flamegraph => self.visit_tree(visitor),
        }
    }

    fn visit_tree<V: FrameVisitor>(&self, visitor: &mut V) -> Result<(), V::Error> {
        struct VisitState {
            node: NodeId,
            next_child: usize,
            start: f64,
            cursor: f64,
        }

        let mut stack = vec![VisitState {
            node: CallTree::ROOT,
            next_child: 0,
            start: 0.0,
            cursor: 0.0,
        }];

        loop {
            let Some(top) = stack.last_mut() else { break };
            let node = top.node;
            let next = top.next_child;
            if let Some(&child) = self.call_tree.node(node).children.get(next) {
                top.next_child += 1;
                let start = top.cursor;
                top.cursor += self.call_tree.node(child).total_weight;
                visitor.open_frame(child, start)?;
                stack.push(VisitState {
                    node: child,
                    next_child: 0,
                    start,
                    cursor: start,
                });
            } else {
                let Some(state) = stack.pop() else { break };
                if state.node == CallTree::ROOT {
                    break;
                }
                let end = state.start + self.call_tree.node(state.node).total_weight;
                visitor.close_frame(state.node, end)?;
            }
        }
        Ok(())
    }
}

fn record_profile_ids(
    node_profile_ids: &mut [Vec<ProfileId>],
    node: NodeId,
    ids: &[ProfileId],
) {
    for id in ids {
        let entry = &mut node_profile_ids[node.0];
        if !entry.contains(id) {
            entry.push(id.clone());
        }
    }
}
