use std::sync::Arc;

use emberview_protocol::{ProfilingUnit, Rect};
use thiserror::Error;

use crate::model::{
    CallTree, CallTreeNode, Frame, FrameField, Profile, ProfileKind,
};

mod builder;
pub mod frame;
pub mod sort;

pub use frame::{FlamegraphFrame, FlamegraphFrameId};
pub use sort::SortOrder;

use builder::{build_sorted, CallOrderBuilder, ChartBuilder};
use sort::{by_frame_name, by_total_weight};

/// Fatal construction and lookup errors. No partial flamegraph is ever
/// returned.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlamegraphError {
    #[error("{kind} profiles do not support {sort} sorting")]
    UnsupportedSort { kind: ProfileKind, sort: SortOrder },
    #[error("unknown sort mode: {0}")]
    UnknownSortMode(String),
    #[error("traversal closed more frames than it opened")]
    UnbalancedStack,
    #[error("no frame fields provided to match against")]
    NoFieldsProvided,
}

/// View options for building a [`Flamegraph`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FlamegraphOptions {
    pub sort: SortOrder,
    /// Walk/interpret the profile bottom-up. Stored for consumers; it does
    /// not alter construction.
    pub inverted: bool,
    /// Overrides the config space width for flamecharts with a duration.
    pub config_space: Option<Rect>,
}

/// The positioned, depth-annotated flattening of a profile's call tree.
///
/// Built once from a profile and a sort order, then immutable; a different
/// view of the same profile is a new instance via [`Flamegraph::with_options`].
/// Instances share the profile behind `Arc` and are safe to read from
/// multiple observers.
#[derive(Debug, Clone)]
pub struct Flamegraph {
    profile: Arc<Profile>,
    /// All built frames; index 0 is the synthetic root.
    arena: Vec<FlamegraphFrame>,
    /// Materialized frames in close order. Zero-width frames are excluded.
    frames: Vec<FlamegraphFrameId>,
    /// Synthetic root node carrying the finalized weight totals.
    root_node: CallTreeNode,
    /// Synthetic root frame carrying the finalized weight total.
    root_frame: Frame,
    depth: u32,
    config_space: Rect,
    inverted: bool,
    sort: SortOrder,
    unit: ProfilingUnit,
}

impl Flamegraph {
    pub fn new(
        profile: Arc<Profile>,
        options: FlamegraphOptions,
    ) -> Result<Self, FlamegraphError> {
        if !options.sort.supports(profile.kind()) {
            return Err(FlamegraphError::UnsupportedSort {
                kind: profile.kind(),
                sort: options.sort,
            });
        }

        let root_node_id = CallTree::ROOT;
        let root_frame_id = profile.node(root_node_id).frame;

        let chart = match options.sort {
            SortOrder::CallOrder => {
                let mut visitor = CallOrderBuilder {
                    profile: profile.as_ref(),
                    chart: ChartBuilder::new(root_frame_id, root_node_id),
                };
                profile.visit_frames(&mut visitor)?;
                visitor.chart
            }
            SortOrder::LeftHeavy => {
                let mut chart = ChartBuilder::new(root_frame_id, root_node_id);
                build_sorted(profile.as_ref(), &mut chart, by_total_weight)?;
                chart
            }
            SortOrder::Alphabetical => {
                let mut chart = ChartBuilder::new(root_frame_id, root_node_id);
                build_sorted(profile.as_ref(), &mut chart, by_frame_name)?;
                chart
            }
        };

        let (mut arena, frames, depth) = chart.finish();

        // Finalize root aggregates, once per construction, on copies owned
        // by this flamegraph.
        let weight: f64 = arena[0]
            .children
            .iter()
            .map(|child| profile.node(arena[child.0].node).total_weight)
            .sum();
        let duration_ns: f64 = arena[0]
            .children
            .iter()
            .map(|child| profile.node(arena[child.0].node).aggregate_duration_ns)
            .sum();

        let mut root_node = profile.node(root_node_id).clone();
        root_node.total_weight += weight;
        root_node.aggregate_duration_ns = duration_ns;
        let mut root_frame = profile.frame(root_frame_id).clone();
        root_frame.total_weight += weight;
        arena[0].end = arena[0].start + weight;

        let width = if profile.kind() == ProfileKind::Flamegraph && weight > 0.0 {
            weight
        } else if profile.duration() > 0.0 {
            options
                .config_space
                .map_or(profile.duration(), |rect| rect.w)
        } else {
            // Zero-duration profile: use a one-second placeholder grid
            // rather than a zero-width chart.
            profile.unit().one_second()
        };
        let config_space = Rect::new(0.0, 0.0, width, f64::from(depth));

        let unit = profile.unit();
        Ok(Self {
            profile,
            arena,
            frames,
            root_node,
            root_frame,
            depth,
            config_space,
            inverted: options.inverted,
            sort: options.sort,
            unit,
        })
    }

    /// Zero-data placeholder flamegraph.
    pub fn empty() -> Self {
        Self::new(Arc::new(Profile::empty()), FlamegraphOptions::default())
            .expect("an empty profile supports the default sort")
    }

    /// Canned demo flamegraph for UI previews.
    pub fn example() -> Self {
        Self::new(Arc::new(Profile::example()), FlamegraphOptions::default())
            .expect("the example profile supports the default sort")
    }

    /// Rebuild a different view of the same underlying profile.
    pub fn with_options(&self, options: FlamegraphOptions) -> Result<Self, FlamegraphError> {
        Self::new(Arc::clone(&self.profile), options)
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Materialized frames in close order.
    pub fn frames(&self) -> impl Iterator<Item = &FlamegraphFrame> + '_ {
        self.frames.iter().map(|id| &self.arena[id.0])
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, id: FlamegraphFrameId) -> &FlamegraphFrame {
        &self.arena[id.0]
    }

    /// The synthetic top frame whose children are the top-level frames.
    pub fn root(&self) -> &FlamegraphFrame {
        &self.arena[0]
    }

    /// Root call tree node with the finalized weight totals.
    pub fn root_node(&self) -> &CallTreeNode {
        &self.root_node
    }

    /// Root frame with the finalized weight total.
    pub fn root_frame(&self) -> &Frame {
        &self.root_frame
    }

    /// Maximum stack depth reached by any materialized frame.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The coordinate space renderers must map pixel geometry into:
    /// `[0, width] x [0, depth]`.
    pub fn config_space(&self) -> Rect {
        self.config_space
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn sort(&self) -> SortOrder {
        self.sort
    }

    pub fn unit(&self) -> ProfilingUnit {
        self.unit
    }

    /// Format a weight value for display, in the profile's unit.
    pub fn format(&self, value: f64) -> String {
        self.unit.format_value(value)
    }

    /// Format a time-axis position for timeline labels.
    pub fn format_timeline(&self, value: f64) -> String {
        self.unit.format_timeline(value)
    }

    /// All frames where any of the given fields equals `query` exactly.
    /// At most one entry per frame, however many fields match.
    pub fn find_all_matching_frames_by(
        &self,
        query: &str,
        fields: &[FrameField],
    ) -> Result<Vec<&FlamegraphFrame>, FlamegraphError> {
        if fields.is_empty() {
            return Err(FlamegraphError::NoFieldsProvided);
        }
        let mut matches = Vec::new();
        for frame in self.frames() {
            let location = self.profile.frame(frame.frame);
            if fields
                .iter()
                .any(|&field| location.field(field) == Some(query))
            {
                matches.push(frame);
            }
        }
        Ok(matches)
    }

    /// All frames matching a name and package. The package matches either
    /// by trimmed package or, for profiles that recorded module instead of
    /// package, by module against the untrimmed query. Package trimming is
    /// platform-specific and injected by the caller.
    pub fn find_all_matching_frames(
        &self,
        frame_name: &str,
        frame_package: Option<&str>,
        trim_package: impl Fn(&str) -> String,
    ) -> Vec<&FlamegraphFrame> {
        let trimmed_query = frame_package.map(&trim_package);
        let mut matches = Vec::new();
        for frame in self.frames() {
            let location = self.profile.frame(frame.frame);
            if location.name != frame_name {
                continue;
            }
            let trimmed_package = location.package.as_deref().map(&trim_package);
            if trimmed_package == trimmed_query
                || location.module.as_deref() == frame_package
            {
                matches.push(frame);
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventKind, FrameEvent, FrameId, ProfileEvent, Sample};

    fn options(sort: SortOrder) -> FlamegraphOptions {
        FlamegraphOptions {
            sort,
            ..FlamegraphOptions::default()
        }
    }

    fn event(kind: EventKind, frame: usize, at: f64) -> FrameEvent {
        FrameEvent {
            kind,
            frame: FrameId(frame),
            at,
        }
    }

    /// a spans 0..10 with nested a1 0..4, b spans 10..16.
    fn evented_profile() -> Arc<Profile> {
        let frames = vec![Frame::new("a"), Frame::new("a1"), Frame::new("b")];
        let events = [
            event(EventKind::Open, 0, 0.0),
            event(EventKind::Open, 1, 0.0),
            event(EventKind::Close, 1, 4.0),
            event(EventKind::Close, 0, 10.0),
            event(EventKind::Open, 2, 10.0),
            event(EventKind::Close, 2, 16.0),
        ];
        Arc::new(Profile::from_events(
            None,
            emberview_protocol::ProfilingUnit::Milliseconds,
            frames,
            &events,
            0.0,
            16.0,
        ))
    }

    /// Aggregated tree: a (10) with child a1 (4), b (6).
    fn aggregate_profile() -> Arc<Profile> {
        let frames = vec![Frame::new("a"), Frame::new("a1"), Frame::new("b")];
        let samples = vec![
            Sample {
                stack: vec![FrameId(0), FrameId(1)],
                weight: 4.0,
                profile_ids: Vec::new(),
            },
            Sample {
                stack: vec![FrameId(0)],
                weight: 6.0,
                profile_ids: Vec::new(),
            },
            Sample {
                stack: vec![FrameId(2)],
                weight: 6.0,
                profile_ids: Vec::new(),
            },
        ];
        Arc::new(Profile::from_aggregate(
            None,
            emberview_protocol::ProfilingUnit::Count,
            frames,
            &samples,
        ))
    }

    fn spans(fg: &Flamegraph) -> Vec<(String, f64, f64, u32)> {
        fg.frames()
            .map(|frame| {
                (
                    fg.profile().frame(frame.frame).name.clone(),
                    frame.start,
                    frame.end,
                    frame.depth,
                )
            })
            .collect()
    }

    #[test]
    fn call_order_preserves_close_order() {
        let fg = Flamegraph::new(evented_profile(), options(SortOrder::CallOrder)).unwrap();

        assert_eq!(
            spans(&fg),
            vec![
                ("a1".to_string(), 0.0, 4.0, 1),
                ("a".to_string(), 0.0, 10.0, 0),
                ("b".to_string(), 10.0, 16.0, 0),
            ]
        );
        assert_eq!(fg.depth(), 1);
        assert_eq!(fg.config_space().w, 16.0);
        assert_eq!(fg.config_space().h, 1.0);
    }

    #[test]
    fn finalized_root_aggregates() {
        let fg = Flamegraph::new(evented_profile(), options(SortOrder::CallOrder)).unwrap();

        assert_eq!(fg.root().end, 16.0);
        assert_eq!(fg.root_node().total_weight, 16.0);
        assert_eq!(fg.root_frame().total_weight, 16.0);
        assert!(fg.root_frame().is_root);
        // milliseconds: 16ms of children summed in nanoseconds
        assert_eq!(fg.root_node().aggregate_duration_ns, 16.0 * 1e6);
    }

    #[test]
    fn frames_are_sorted_by_close_time_with_ancestor_depth() {
        let fg = Flamegraph::new(
            Arc::new(Profile::example()),
            options(SortOrder::CallOrder),
        )
        .unwrap();

        let ends: Vec<f64> = fg.frames().map(|frame| frame.end).collect();
        assert!(ends.windows(2).all(|pair| pair[0] <= pair[1]));

        for frame in fg.frames() {
            let mut ancestors = 0;
            let mut parent = frame.parent;
            while let Some(id) = parent {
                if id == fg.root().key {
                    break;
                }
                ancestors += 1;
                parent = fg.frame(id).parent;
            }
            assert_eq!(frame.depth, ancestors);
        }
    }

    #[test]
    fn single_root_child_roundtrip() {
        let frames = vec![Frame::new("work")];
        let events = [
            event(EventKind::Open, 0, 0.0),
            event(EventKind::Close, 0, 8.0),
        ];
        let profile = Arc::new(Profile::from_events(
            None,
            emberview_protocol::ProfilingUnit::Milliseconds,
            frames,
            &events,
            0.0,
            8.0,
        ));
        let fg = Flamegraph::new(profile, options(SortOrder::CallOrder)).unwrap();

        assert_eq!(spans(&fg), vec![("work".to_string(), 0.0, 8.0, 0)]);
        assert_eq!(fg.config_space().w, 8.0);
    }

    #[test]
    fn zero_width_frames_are_discarded_but_stay_in_tree() {
        let frames = vec![Frame::new("wide"), Frame::new("instant")];
        let events = [
            event(EventKind::Open, 0, 0.0),
            event(EventKind::Close, 0, 10.0),
            event(EventKind::Open, 1, 10.0),
            event(EventKind::Close, 1, 10.0),
        ];
        let profile = Arc::new(Profile::from_events(
            None,
            emberview_protocol::ProfilingUnit::Milliseconds,
            frames,
            &events,
            0.0,
            10.0,
        ));
        let fg = Flamegraph::new(profile, options(SortOrder::CallOrder)).unwrap();

        assert_eq!(fg.frame_count(), 1);
        assert!(fg.frames().all(|frame| frame.width() > 0.0));
        // the instant frame still exists as a child of the root
        assert_eq!(fg.root().children.len(), 2);
    }

    #[test]
    fn left_heavy_orders_siblings_by_weight() {
        let fg = Flamegraph::new(aggregate_profile(), options(SortOrder::LeftHeavy)).unwrap();

        assert_eq!(
            spans(&fg),
            vec![
                ("a1".to_string(), 0.0, 4.0, 1),
                ("a".to_string(), 0.0, 10.0, 0),
                ("b".to_string(), 10.0, 16.0, 0),
            ]
        );
        // aggregated profile: exactly as wide as its sampled weight
        assert_eq!(fg.config_space().w, 16.0);

        let top_level: Vec<&str> = fg
            .root()
            .children
            .iter()
            .map(|&id| fg.profile().frame(fg.frame(id).frame).name.as_str())
            .collect();
        assert_eq!(top_level, vec!["a", "b"]);
    }

    #[test]
    fn left_heavy_on_flamechart_keeps_duration_width() {
        let frames = vec![Frame::new("a"), Frame::new("b")];
        let events = [
            event(EventKind::Open, 0, 0.0),
            event(EventKind::Close, 0, 10.0),
            event(EventKind::Open, 1, 10.0),
            event(EventKind::Close, 1, 16.0),
        ];
        // the profile ran for 20ms; 4ms were idle
        let profile = Arc::new(Profile::from_events(
            None,
            emberview_protocol::ProfilingUnit::Milliseconds,
            frames,
            &events,
            0.0,
            20.0,
        ));
        let fg = Flamegraph::new(profile, options(SortOrder::LeftHeavy)).unwrap();

        assert_eq!(fg.config_space().w, 20.0);
        assert_eq!(
            spans(&fg),
            vec![
                ("a".to_string(), 0.0, 10.0, 0),
                ("b".to_string(), 10.0, 16.0, 0),
            ]
        );
    }

    #[test]
    fn alphabetical_orders_by_name_and_file() {
        let frames = vec![
            Frame::new("b"),
            Frame::new("a").with_file("x.rs"),
            Frame::new("a").with_file("m.rs"),
        ];
        let samples = vec![
            Sample {
                stack: vec![FrameId(0)],
                weight: 1.0,
                profile_ids: Vec::new(),
            },
            Sample {
                stack: vec![FrameId(1)],
                weight: 2.0,
                profile_ids: Vec::new(),
            },
            Sample {
                stack: vec![FrameId(2)],
                weight: 3.0,
                profile_ids: Vec::new(),
            },
        ];
        let profile = Arc::new(Profile::from_aggregate(
            None,
            emberview_protocol::ProfilingUnit::Count,
            frames,
            &samples,
        ));
        let fg = Flamegraph::new(profile, options(SortOrder::Alphabetical)).unwrap();

        let names_in_order: Vec<(String, f64)> = fg
            .frames()
            .map(|frame| {
                let location = fg.profile().frame(frame.frame);
                (
                    format!(
                        "{}{}",
                        location.name,
                        location.file.as_deref().unwrap_or_default()
                    ),
                    frame.start,
                )
            })
            .collect();
        assert_eq!(
            names_in_order,
            vec![
                ("am.rs".to_string(), 0.0),
                ("ax.rs".to_string(), 3.0),
                ("b".to_string(), 5.0),
            ]
        );
    }

    #[test]
    fn sorted_build_populates_profile_ids() {
        let frames = vec![Frame::new("a")];
        let samples = vec![Sample {
            stack: vec![FrameId(0)],
            weight: 5.0,
            profile_ids: vec!["p1".to_string(), "p2".to_string()],
        }];
        let profile = Arc::new(Profile::from_aggregate(
            None,
            emberview_protocol::ProfilingUnit::Count,
            frames,
            &samples,
        ));
        let fg = Flamegraph::new(profile, options(SortOrder::LeftHeavy)).unwrap();

        let frame = fg.frames().next().unwrap();
        assert_eq!(frame.profile_ids, vec!["p1".to_string(), "p2".to_string()]);
    }

    #[test]
    fn call_order_build_leaves_profile_ids_empty() {
        let fg = Flamegraph::new(evented_profile(), options(SortOrder::CallOrder)).unwrap();
        assert!(fg.frames().all(|frame| frame.profile_ids.is_empty()));
    }

    #[test]
    fn alphabetical_on_flamechart_is_rejected() {
        let err = Flamegraph::new(evented_profile(), options(SortOrder::Alphabetical))
            .unwrap_err();
        assert_eq!(
            err,
            FlamegraphError::UnsupportedSort {
                kind: ProfileKind::Flamechart,
                sort: SortOrder::Alphabetical,
            }
        );
    }

    #[test]
    fn call_order_on_aggregate_is_rejected() {
        let err =
            Flamegraph::new(aggregate_profile(), options(SortOrder::CallOrder)).unwrap_err();
        assert_eq!(
            err,
            FlamegraphError::UnsupportedSort {
                kind: ProfileKind::Flamegraph,
                sort: SortOrder::CallOrder,
            }
        );
    }

    #[test]
    fn unbalanced_traversal_is_fatal() {
        let mut call_tree = CallTree::new(FrameId(1));
        let node = call_tree.child_with_frame(CallTree::ROOT, FrameId(0));
        let events = vec![ProfileEvent {
            kind: EventKind::Close,
            node,
            at: 5.0,
        }];
        let profile = Arc::new(Profile::from_raw_parts(
            ProfileKind::Flamechart,
            emberview_protocol::ProfilingUnit::Milliseconds,
            5.0,
            vec![Frame::new("a"), Frame::root()],
            call_tree,
            events,
        ));

        let err = Flamegraph::new(profile, options(SortOrder::CallOrder)).unwrap_err();
        assert_eq!(err, FlamegraphError::UnbalancedStack);
    }

    #[test]
    fn rebuild_with_same_options_is_structurally_equal() {
        let fg = Flamegraph::new(aggregate_profile(), options(SortOrder::LeftHeavy)).unwrap();
        let rebuilt = fg
            .with_options(FlamegraphOptions {
                sort: fg.sort(),
                inverted: fg.inverted(),
                config_space: None,
            })
            .unwrap();

        assert_eq!(spans(&fg), spans(&rebuilt));
        assert_eq!(fg.depth(), rebuilt.depth());
        assert_eq!(fg.config_space(), rebuilt.config_space());
    }

    #[test]
    fn rebuild_switches_views_of_the_same_profile() {
        let fg = Flamegraph::new(evented_profile(), options(SortOrder::CallOrder)).unwrap();
        let left_heavy = fg.with_options(options(SortOrder::LeftHeavy)).unwrap();

        assert_eq!(left_heavy.sort(), SortOrder::LeftHeavy);
        assert_eq!(left_heavy.frame_count(), 3);
        assert!(std::ptr::eq(fg.profile(), left_heavy.profile()));
    }

    #[test]
    fn empty_flamegraph_gets_placeholder_grid() {
        let fg = Flamegraph::empty();
        assert_eq!(fg.frame_count(), 0);
        assert_eq!(fg.depth(), 0);
        // one second in milliseconds
        assert_eq!(fg.config_space().w, 1e3);
        assert_eq!(fg.root().end, 0.0);
    }

    #[test]
    fn zero_duration_placeholder_respects_unit() {
        let profile = Arc::new(Profile::from_events(
            None,
            emberview_protocol::ProfilingUnit::Nanoseconds,
            Vec::new(),
            &[],
            0.0,
            0.0,
        ));
        let fg = Flamegraph::new(profile, options(SortOrder::CallOrder)).unwrap();
        assert_eq!(fg.config_space().w, 1e9);
    }

    #[test]
    fn caller_config_space_overrides_width() {
        let fg = Flamegraph::new(
            evented_profile(),
            FlamegraphOptions {
                sort: SortOrder::CallOrder,
                inverted: false,
                config_space: Some(Rect::new(0.0, 0.0, 1000.0, 0.0)),
            },
        )
        .unwrap();
        assert_eq!(fg.config_space().w, 1000.0);
    }

    #[test]
    fn inverted_flag_is_stored_untouched() {
        let fg = Flamegraph::new(
            evented_profile(),
            FlamegraphOptions {
                sort: SortOrder::CallOrder,
                inverted: true,
                config_space: None,
            },
        )
        .unwrap();
        assert!(fg.inverted());
        assert_eq!(fg.frame_count(), 3);
    }

    #[test]
    fn example_flamegraph_is_usable() {
        let fg = Flamegraph::example();
        assert_eq!(fg.frame_count(), 7);
        assert_eq!(fg.depth(), 3);
        assert_eq!(fg.config_space().w, 100.0);
        assert_eq!(fg.format(fg.root().end), "100.0ms");
    }

    #[test]
    fn find_by_matches_any_listed_field_once() {
        let frames = vec![
            Frame::new("foo").with_file("foo"),
            Frame::new("bar").with_file("bar.rs"),
        ];
        let events = [
            event(EventKind::Open, 0, 0.0),
            event(EventKind::Close, 0, 5.0),
            event(EventKind::Open, 1, 5.0),
            event(EventKind::Close, 1, 9.0),
        ];
        let profile = Arc::new(Profile::from_events(
            None,
            emberview_protocol::ProfilingUnit::Milliseconds,
            frames,
            &events,
            0.0,
            9.0,
        ));
        let fg = Flamegraph::new(profile, options(SortOrder::CallOrder)).unwrap();

        // "foo" matches both name and file, but the frame appears once
        let matches = fg
            .find_all_matching_frames_by("foo", &[FrameField::Name, FrameField::File])
            .unwrap();
        assert_eq!(matches.len(), 1);

        let matches = fg
            .find_all_matching_frames_by("bar.rs", &[FrameField::File])
            .unwrap();
        assert_eq!(matches.len(), 1);

        // exact, case-sensitive equality only
        let matches = fg
            .find_all_matching_frames_by("Foo", &[FrameField::Name, FrameField::File])
            .unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn find_by_requires_fields() {
        let fg = Flamegraph::example();
        assert_eq!(
            fg.find_all_matching_frames_by("foo", &[]).unwrap_err(),
            FlamegraphError::NoFieldsProvided
        );
    }

    #[test]
    fn find_matches_trimmed_package_or_module() {
        let frames = vec![
            Frame::new("alloc").with_package("/usr/lib/libc.so"),
            Frame::new("sin").with_module("libm"),
            Frame::new("plain"),
        ];
        let events = [
            event(EventKind::Open, 0, 0.0),
            event(EventKind::Close, 0, 3.0),
            event(EventKind::Open, 1, 3.0),
            event(EventKind::Close, 1, 6.0),
            event(EventKind::Open, 2, 6.0),
            event(EventKind::Close, 2, 9.0),
        ];
        let profile = Arc::new(Profile::from_events(
            None,
            emberview_protocol::ProfilingUnit::Milliseconds,
            frames,
            &events,
            0.0,
            9.0,
        ));
        let fg = Flamegraph::new(profile, options(SortOrder::CallOrder)).unwrap();
        let trim = |package: &str| {
            package
                .rsplit('/')
                .next()
                .unwrap_or(package)
                .to_string()
        };

        // package match goes through the trimmer on both sides
        let matches = fg.find_all_matching_frames("alloc", Some("libc.so"), trim);
        assert_eq!(matches.len(), 1);

        // module fallback compares against the untrimmed query
        let matches = fg.find_all_matching_frames("sin", Some("libm"), trim);
        assert_eq!(matches.len(), 1);

        // no package on either side still matches by name
        let matches = fg.find_all_matching_frames("plain", None, trim);
        assert_eq!(matches.len(), 1);

        let matches = fg.find_all_matching_frames("alloc", Some("libz.so"), trim);
        assert!(matches.is_empty());
    }
}
