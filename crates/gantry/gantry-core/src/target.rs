//! Targets and the resolved target graph.
//!
//! The graph is an append-only arena; a [`TargetId`] is an index into
//! it. Dependency lists hold ids in declared order, which downstream
//! traversals rely on. Everything here is immutable once target
//! resolution has finished, so the checker reads the graph from many
//! threads without locking.

use crate::config::{Config, ConfigValues};
use crate::label::Label;
use crate::label_pattern::LabelPattern;
use crate::source_file::SourceFile;
use crate::types::collections::FxHashSet;

/// Index of a target in its [`TargetGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(u32);

impl TargetId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a target builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    Executable,
    SharedLibrary,
    StaticLibrary,
    SourceSet,
    Group,
    Action,
    ActionForeach,
    Copy,
}

impl TargetKind {
    /// Binary targets compile sources; only they get include checks.
    pub fn is_binary(self) -> bool {
        matches!(
            self,
            TargetKind::Executable
                | TargetKind::SharedLibrary
                | TargetKind::StaticLibrary
                | TargetKind::SourceSet
        )
    }
}

/// Extra values carried by targets that build a Swift module.
#[derive(Debug, Clone, Default)]
pub struct SwiftValues {
    /// Objective-C bridge header, if the module declares one.
    pub bridge_header: Option<SourceFile>,
    /// Generated headers exposing the module to C-family dependents.
    pub generated_headers: Vec<SourceFile>,
}

/// One resolved target.
#[derive(Debug, Clone)]
pub struct Target {
    pub label: Label,
    pub kind: TargetKind,

    pub sources: Vec<SourceFile>,
    /// Explicit public headers. Must be empty when `all_headers_public`
    /// is set.
    pub public_headers: Vec<SourceFile>,
    /// When set, every source is implicitly public.
    pub all_headers_public: bool,

    /// Dependency edges, in declared order.
    pub public_deps: Vec<TargetId>,
    pub private_deps: Vec<TargetId>,

    /// Patterns naming targets allowed to include private headers.
    pub friends: Vec<LabelPattern>,
    /// Labels allowed to include this target's headers without a
    /// dependency path.
    pub allow_circular_includes_from: FxHashSet<Label>,
    /// Targets can opt out of include checking.
    pub check_includes: bool,

    /// The target's own configuration values, ahead of `configs`.
    pub own_values: ConfigValues,
    pub configs: Vec<Config>,

    /// Present iff the target builds a Swift module.
    pub swift: Option<SwiftValues>,
    /// Declared outputs of action-style targets.
    pub action_outputs: Vec<SourceFile>,
}

impl Target {
    pub fn new(label: Label, kind: TargetKind) -> Target {
        Target {
            label,
            kind,
            sources: Vec::new(),
            public_headers: Vec::new(),
            all_headers_public: true,
            public_deps: Vec::new(),
            private_deps: Vec::new(),
            friends: Vec::new(),
            allow_circular_includes_from: FxHashSet::default(),
            check_includes: true,
            own_values: ConfigValues::default(),
            configs: Vec::new(),
            swift: None,
            action_outputs: Vec::new(),
        }
    }

    /// Every configuration contributing values to this target, in
    /// declaration order: the target's own values first, then each
    /// attached config.
    pub fn all_config_values(&self) -> impl Iterator<Item = &ConfigValues> {
        std::iter::once(&self.own_values).chain(self.configs.iter().map(|c| &c.values))
    }

    pub fn builds_swift_module(&self) -> bool {
        self.swift.is_some()
    }
}

/// The resolved target universe.
#[derive(Debug, Default)]
pub struct TargetGraph {
    targets: Vec<Target>,
}

impl TargetGraph {
    pub fn new() -> TargetGraph {
        TargetGraph::default()
    }

    pub fn add(&mut self, target: Target) -> TargetId {
        let id = TargetId(u32::try_from(self.targets.len()).expect("target count overflow"));
        self.targets.push(target);
        id
    }

    pub fn get(&self, id: TargetId) -> &Target {
        &self.targets[id.index()]
    }

    /// Mutable access for graph construction; not used after resolution.
    pub fn get_mut(&mut self, id: TargetId) -> &mut Target {
        &mut self.targets[id.index()]
    }

    pub fn ids(&self) -> impl Iterator<Item = TargetId> + '_ {
        (0..self.targets.len()).map(|i| TargetId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
