//! gantry-check: header-inclusion checking over the resolved target graph.
//!
//! The checker verifies that every `#include` in a compilable source
//! file names a header the including target is allowed to see: the
//! header's target must be reachable through an appropriate dependency
//! chain, and the header must be effectively public to the includer.
//!
//! The pieces, top-down:
//! - Checker: per-file task dispatch and the include permission check
//! - File map: source-file identity → claiming targets, built up front
//! - Include iterator: lexical `#include` extraction with locations
//! - Resolver: include literals → known source files via the search path
//! - Reachability: memoized two-flavor BFS over the dependency graph
//! - Diagnostics: violation messages with persistent source locations

pub mod checker;
pub mod diagnostics;
pub mod file_map;
pub mod include_iterator;
pub mod reachability;
pub mod resolver;
pub mod summary;

// Re-exports for convenience
pub use checker::HeaderChecker;
pub use diagnostics::{CheckError, CheckErrorKind};
pub use file_map::{FileMap, TargetInfo, TargetVector};
pub use include_iterator::{IncludeIterator, IncludeRef, IncludeStyle};
pub use reachability::{Chain, ChainLink, DependencyCache, DependencyLookup, ReachabilityCache};
pub use resolver::source_file_for_include;
pub use summary::CheckSummary;
