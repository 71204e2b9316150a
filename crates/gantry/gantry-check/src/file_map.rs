//! The file map: source-file identity → claiming targets.
//!
//! Built once over the target universe before any checking starts and
//! read-only afterwards, so worker threads share it without locking.

use gantry_core::source_file::{FileKind, SourceFile};
use gantry_core::target::{TargetGraph, TargetId};
use gantry_core::types::collections::FxHashMap;
use smallvec::SmallVec;

/// One target's claim on a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetInfo {
    pub target: TargetId,
    /// True if the file is public in the claiming target.
    pub is_public: bool,
    /// True if the file is generated and may not exist on disk yet.
    pub is_generated: bool,
}

/// Claims for one file. Usually just one target.
pub type TargetVector = SmallVec<[TargetInfo; 2]>;

#[derive(Debug, Default)]
struct PublicGenerated {
    is_public: bool,
    is_generated: bool,
}

/// Maps each known source file to the targets claiming it, in the order
/// the targets were added.
#[derive(Debug, Default)]
pub struct FileMap {
    map: FxHashMap<SourceFile, TargetVector>,
}

impl FileMap {
    pub fn new() -> FileMap {
        FileMap::default()
    }

    /// Add every file the target claims.
    ///
    /// Merge order within the target matters: the public-header list
    /// upgrades plain sources to public, and generated outputs coexist
    /// with whatever came before them.
    pub fn add_target(&mut self, graph: &TargetGraph, id: TargetId) {
        let target = graph.get(id);
        let default_public = target.all_headers_public;

        let mut merged: FxHashMap<&SourceFile, PublicGenerated> = FxHashMap::default();

        // Plain sources get the default visibility. Depending on the
        // compiled target is enough to include these when the default is
        // public.
        for source in &target.sources {
            merged.entry(source).or_default().is_public = default_public;
        }

        // The explicit public list forces entries public; it may upgrade
        // sources and may introduce new files. The list is only used
        // when the default is not public.
        if default_public {
            debug_assert!(
                target.public_headers.is_empty(),
                "{}: all_headers_public with an explicit public list",
                target.label
            );
        }
        for header in &target.public_headers {
            merged.entry(header).or_default().is_public = true;
        }

        // A Swift module may carry a bridge header (default visibility)
        // and generates public headers for C-family dependents.
        if let Some(swift) = &target.swift {
            if let Some(bridge) = &swift.bridge_header {
                merged.entry(bridge).or_default().is_public = default_public;
            }
            for header in &swift.generated_headers {
                if header.kind() == FileKind::CHeader {
                    let entry = merged.entry(header).or_default();
                    entry.is_public = true;
                    entry.is_generated = true;
                }
            }
        }

        // Action outputs are public: if dependents couldn't use them,
        // emitting them would be pointless.
        for output in &target.action_outputs {
            let entry = merged.entry(output).or_default();
            entry.is_public = true;
            entry.is_generated = true;
        }

        for (file, flags) in merged {
            self.map.entry(file.clone()).or_default().push(TargetInfo {
                target: id,
                is_public: flags.is_public,
                is_generated: flags.is_generated,
            });
        }
    }

    pub fn get(&self, file: &SourceFile) -> Option<&TargetVector> {
        self.map.get(file)
    }

    pub fn contains(&self, file: &SourceFile) -> bool {
        self.map.contains_key(file)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SourceFile, &TargetVector)> {
        self.map.iter()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
