pub mod call_tree;
pub mod frame;
pub mod profile;

pub use call_tree::{CallTree, CallTreeNode, NodeId};
pub use frame::{Frame, FrameField, FrameId};
pub use profile::{
    EventKind, FrameEvent, FrameVisitor, Profile, ProfileEvent, ProfileId, ProfileKind, Sample,
};
