use std::cmp::Ordering;
use std::str::FromStr;

use crate::flamegraph::FlamegraphError;
use crate::model::{NodeId, Profile, ProfileKind};

/// Order in which sibling frames are arranged on the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Chronological: frames appear where they actually opened and closed.
    #[default]
    CallOrder,
    /// Heaviest subtree first at every level.
    LeftHeavy,
    /// Ascending by frame name plus file at every level.
    Alphabetical,
}

impl SortOrder {
    /// Capability table: which sort orders each profile kind supports.
    /// Flamecharts have chronology but no stable global aggregation order;
    /// aggregated profiles have no chronology at all.
    pub fn supports(self, kind: ProfileKind) -> bool {
        !matches!(
            (kind, self),
            (ProfileKind::Flamechart, Self::Alphabetical)
                | (ProfileKind::Flamegraph, Self::CallOrder)
        )
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CallOrder => write!(f, "call order"),
            Self::LeftHeavy => write!(f, "left heavy"),
            Self::Alphabetical => write!(f, "alphabetical"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = FlamegraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "call order" => Ok(Self::CallOrder),
            "left heavy" => Ok(Self::LeftHeavy),
            "alphabetical" => Ok(Self::Alphabetical),
            other => Err(FlamegraphError::UnknownSortMode(other.to_string())),
        }
    }
}

/// Sibling comparator used by sorted builds.
pub(crate) type NodeOrdering = fn(&Profile, NodeId, NodeId) -> Ordering;

pub(crate) fn by_total_weight(profile: &Profile, a: NodeId, b: NodeId) -> Ordering {
    profile
        .node(b)
        .total_weight
        .total_cmp(&profile.node(a).total_weight)
}

pub(crate) fn by_frame_name(profile: &Profile, a: NodeId, b: NodeId) -> Ordering {
    sort_key(profile, a).cmp(&sort_key(profile, b))
}

fn sort_key(profile: &Profile, id: NodeId) -> String {
    let frame = profile.frame(profile.node(id).frame);
    match &frame.file {
        Some(file) => format!("{}{}", frame.name, file),
        None => frame.name.clone(),
    }
}
