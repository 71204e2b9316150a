//! Check violations and their user-visible messages.
//!
//! Violations are plain data, not `Err` propagation: a task accumulates
//! them and keeps checking. Every location stored here has already been
//! re-anchored at an arena clone, so messages stay printable after the
//! originating task's buffers are gone.

use std::fmt;

use gantry_core::input_file::{InputFile, InputFileArena, LocationRange, PersistentRange};
use gantry_core::target::{Target, TargetGraph, TargetId};

use crate::file_map::TargetVector;
use crate::reachability::Chain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckErrorKind {
    /// A claimed source file could not be read and is not a
    /// yet-to-be-generated output.
    SourceFileNotFound,
    /// The header is reachable but private to its target, and no friend
    /// clause applies.
    PrivateHeader,
    /// The header is public but every chain to its target crosses a
    /// non-public edge after the first hop.
    NonPublicChain,
    /// No reachable target claims the header.
    Unreachable,
}

/// One check violation.
#[derive(Debug, Clone)]
pub struct CheckError {
    pub kind: CheckErrorKind,
    /// Missing only for violations without a readable source location
    /// (a file that could not be read has none).
    pub location: Option<PersistentRange>,
    pub title: &'static str,
    pub body: String,
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: ")?;
        }
        writeln!(f, "{}", self.title)?;
        f.write_str(&self.body)
    }
}

pub(crate) fn source_file_not_found(from_target: &Target, file_value: &str) -> CheckError {
    CheckError {
        kind: CheckErrorKind::SourceFileNotFound,
        location: None,
        title: "Source file not found.",
        body: format!(
            "The target:\n  {}\nhas a source file:\n  {}\nwhich was not found.",
            from_target.label.user_visible_name(false),
            file_value
        ),
    }
}

pub(crate) fn private_header_error(
    arena: &InputFileArena,
    source_file: &InputFile,
    range: LocationRange,
    to_target: &Target,
) -> CheckError {
    CheckError {
        kind: CheckErrorKind::PrivateHeader,
        location: Some(arena.persistent_range(source_file, range)),
        title: "Including a private header.",
        body: format!(
            "This file is private to the target {}",
            to_target.label.user_visible_name(false)
        ),
    }
}

pub(crate) fn non_public_chain_error(
    arena: &InputFileArena,
    source_file: &InputFile,
    range: LocationRange,
    graph: &TargetGraph,
    chain: &Chain,
) -> CheckError {
    CheckError {
        kind: CheckErrorKind::NonPublicChain,
        location: Some(arena.persistent_range(source_file, range)),
        title: "Can't include this header from here.",
        body: dependency_chain_body(graph, chain),
    }
}

/// Describe a chain whose headers `chain[len - 1]` is using without a
/// fully public path to `chain[0]`.
fn dependency_chain_body(graph: &TargetGraph, chain: &Chain) -> String {
    // A valid error chain has intermediate links: lengths 1 and 2 are
    // impossible because a target may always include headers from
    // itself and from its direct dependencies.
    debug_assert!(chain.len() > 2);

    let mut body = format!(
        "The target:\n  {}\nis including a file from the target:\n  {}\n",
        graph
            .get(chain[chain.len() - 1].target)
            .label
            .user_visible_name(false),
        graph.get(chain[0].target).label.user_visible_name(false),
    );

    body.push_str(
        "\nIt's usually best to depend directly on the destination target.\n\
         In some cases, the destination target is considered a subcomponent\n\
         of an intermediate target. In this case, the intermediate target\n\
         should depend publicly on the destination to forward the ability\n\
         to include headers.\n\
         \n\
         Dependency chain (there may also be others):\n",
    );

    for i in (0..chain.len()).rev() {
        body.push_str("  ");
        body.push_str(&graph.get(chain[i].target).label.user_visible_name(false));
        if i != 0 {
            // Mark private edges so the user can see where the chain
            // goes bad. The first link is skipped: direct dependencies
            // are fine either way and flagging them as private reads
            // like something to fix.
            if i == chain.len() - 1 || chain[i - 1].is_public {
                body.push_str(" -->");
            } else {
                body.push_str(" --[private]-->");
            }
        }
        body.push('\n');
    }
    body
}

/// Build the error for an include whose claiming targets are all
/// unreachable from `from_target`.
pub(crate) fn unreachable_error(
    arena: &InputFileArena,
    source_file: &InputFile,
    range: LocationRange,
    graph: &TargetGraph,
    from_target: TargetId,
    claims: &TargetVector,
) -> CheckError {
    let from = graph.get(from_target);

    // When cross-compiling the same file is often claimed by the same
    // target in several toolchains. Listing those duplicates confuses
    // more than it helps, so candidates from other toolchains are
    // dropped when a same-toolchain candidate carries the same label.
    let mut matching_toolchain: Vec<&Target> = Vec::new();
    let mut other_toolchain: Vec<&Target> = Vec::new();
    for claim in claims {
        let candidate = graph.get(claim.target);
        if candidate.label.toolchains_equal(&from.label) {
            matching_toolchain.push(candidate);
        } else {
            other_toolchain.push(candidate);
        }
    }
    other_toolchain.retain(|other| {
        !matching_toolchain
            .iter()
            .any(|matching| matching.label.matches_except_toolchain(&other.label))
    });

    // Toolchains only clutter the labels when they all agree.
    let include_toolchain = !other_toolchain.is_empty();

    let mut body = format!(
        "It is not in any dependency of\n  {}\nThe include file is in the target(s):\n",
        from.label.user_visible_name(include_toolchain)
    );
    for target in matching_toolchain.iter().chain(other_toolchain.iter()) {
        body.push_str("  ");
        body.push_str(&target.label.user_visible_name(include_toolchain));
        body.push('\n');
    }
    if matching_toolchain.len() + other_toolchain.len() > 1 {
        body.push_str("at least one of ");
    }
    body.push_str("which should somehow be reachable.\n");
    body.push_str(
        "This might be a false alarm when the include sits inside a\n\
         preprocessor conditional; annotate it with nogantrycheck to\n\
         suppress this check.",
    );

    CheckError {
        kind: CheckErrorKind::Unreachable,
        location: Some(arena.persistent_range(source_file, range)),
        title: "Include not allowed.",
        body,
    }
}

#[cfg(test)]
mod tests {
    use gantry_core::input_file::Location;
    use gantry_core::label::Label;
    use gantry_core::source_file::SourceFile;
    use gantry_core::target::TargetKind;
    use smallvec::smallvec;

    use crate::file_map::TargetInfo;
    use crate::reachability::ChainLink;

    use super::*;

    fn range() -> LocationRange {
        LocationRange::new(
            Location { line: 1, column: 11 },
            Location { line: 1, column: 14 },
        )
    }

    fn add_target(graph: &mut TargetGraph, label: Label) -> TargetId {
        graph.add(Target::new(label, TargetKind::StaticLibrary))
    }

    #[test]
    fn chain_rendering_marks_private_intermediate_edges() {
        let mut graph = TargetGraph::new();
        let t = add_target(&mut graph, Label::new("//t", "t"));
        let m = add_target(&mut graph, Label::new("//m", "m"));
        let s = add_target(&mut graph, Label::new("//s", "s"));

        // s --public--> m --private--> t
        let chain: Chain = vec![
            ChainLink { target: t, is_public: false },
            ChainLink { target: m, is_public: true },
            ChainLink { target: s, is_public: true },
        ];
        let body = dependency_chain_body(&graph, &chain);
        assert!(body.contains("  //s:s -->\n"));
        assert!(body.contains("  //m:m --[private]-->\n"));
        assert!(body.ends_with("  //t:t\n"));
    }

    #[test]
    fn chain_rendering_never_marks_the_first_hop() {
        let mut graph = TargetGraph::new();
        let t = add_target(&mut graph, Label::new("//t", "t"));
        let m = add_target(&mut graph, Label::new("//m", "m"));
        let s = add_target(&mut graph, Label::new("//s", "s"));

        // s --private--> m --private--> t: the s->m edge stays unmarked.
        let chain: Chain = vec![
            ChainLink { target: t, is_public: false },
            ChainLink { target: m, is_public: false },
            ChainLink { target: s, is_public: true },
        ];
        let body = dependency_chain_body(&graph, &chain);
        assert!(body.contains("  //s:s -->\n"));
        assert!(body.contains("  //m:m --[private]-->\n"));
    }

    #[test]
    fn unreachable_lists_candidates_without_toolchains_when_unique() {
        let mut graph = TargetGraph::new();
        let from = add_target(&mut graph, Label::new("//app", "app"));
        let a = add_target(&mut graph, Label::new("//lib", "a"));
        let b = add_target(&mut graph, Label::new("//lib", "b"));

        let arena = InputFileArena::new();
        let input = InputFile::new(SourceFile::new("//app/main.cc"), String::new());
        let claims: TargetVector = smallvec![
            TargetInfo { target: a, is_public: true, is_generated: false },
            TargetInfo { target: b, is_public: true, is_generated: false },
        ];
        let err = unreachable_error(&arena, &input, range(), &graph, from, &claims);

        assert_eq!(err.kind, CheckErrorKind::Unreachable);
        assert!(err.body.contains("  //lib:a\n"));
        assert!(err.body.contains("  //lib:b\n"));
        assert!(err.body.contains("at least one of which should somehow be reachable"));
        assert!(!err.body.contains("(//"));
    }

    #[test]
    fn unreachable_drops_cross_toolchain_duplicates() {
        let mut graph = TargetGraph::new();
        let from = add_target(
            &mut graph,
            Label::with_toolchain("//app", "app", "//tc", "host"),
        );
        let host = add_target(
            &mut graph,
            Label::with_toolchain("//lib", "lib", "//tc", "host"),
        );
        let arm = add_target(
            &mut graph,
            Label::with_toolchain("//lib", "lib", "//tc", "arm"),
        );

        let arena = InputFileArena::new();
        let input = InputFile::new(SourceFile::new("//app/main.cc"), String::new());
        let claims: TargetVector = smallvec![
            TargetInfo { target: host, is_public: true, is_generated: false },
            TargetInfo { target: arm, is_public: true, is_generated: false },
        ];
        let err = unreachable_error(&arena, &input, range(), &graph, from, &claims);

        // The arm duplicate is dropped, leaving one candidate and no
        // toolchain qualification.
        assert!(err.body.contains("  //lib:lib\n"));
        assert!(!err.body.contains("//tc:arm"));
        assert!(err.body.contains("which should somehow be reachable"));
        assert!(!err.body.contains("at least one of"));
    }

    #[test]
    fn unreachable_qualifies_labels_across_toolchains() {
        let mut graph = TargetGraph::new();
        let from = add_target(
            &mut graph,
            Label::with_toolchain("//app", "app", "//tc", "host"),
        );
        let other = add_target(
            &mut graph,
            Label::with_toolchain("//other", "other", "//tc", "arm"),
        );

        let arena = InputFileArena::new();
        let input = InputFile::new(SourceFile::new("//app/main.cc"), String::new());
        let claims: TargetVector = smallvec![TargetInfo {
            target: other,
            is_public: true,
            is_generated: false,
        }];
        let err = unreachable_error(&arena, &input, range(), &graph, from, &claims);

        assert!(err.body.contains("//app:app(//tc:host)"));
        assert!(err.body.contains("//other:other(//tc:arm)"));
    }

    #[test]
    fn display_carries_location_and_body() {
        let mut graph = TargetGraph::new();
        let t = add_target(&mut graph, Label::new("//t", "t"));
        let arena = InputFileArena::new();
        let input = InputFile::new(
            SourceFile::new("//app/main.cc"),
            "#include \"p.h\"\n".to_string(),
        );
        let err = private_header_error(&arena, &input, range(), graph.get(t));
        let rendered = err.to_string();
        assert!(rendered.starts_with("//app/main.cc:1:11: Including a private header."));
        assert!(rendered.contains("private to the target //t:t"));
    }
}
