//! Profile model, importers, and flamegraph construction.

pub mod flamegraph;
pub mod import;
pub mod model;

pub use flamegraph::{
    Flamegraph, FlamegraphError, FlamegraphFrame, FlamegraphFrameId, FlamegraphOptions, SortOrder,
};
pub use model::{
    CallTree, CallTreeNode, EventKind, Frame, FrameEvent, FrameField, FrameId, FrameVisitor,
    NodeId, Profile, ProfileEvent, ProfileId, ProfileKind, Sample,
};
