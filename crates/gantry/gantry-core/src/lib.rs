//! gantry-core: data model for the gantry meta-build system.
//!
//! This crate holds everything the checker consumes from the rest of the
//! build: labels and label patterns, source-file identities, the
//! resolved target graph, configuration values, input files with
//! persistent error locations, and the capability traits behind which
//! the outside world (filesystem, thread pool) sits.

pub mod config;
pub mod errors;
pub mod input_file;
pub mod label;
pub mod label_pattern;
pub mod source_dir;
pub mod source_file;
pub mod target;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use config::{BuildSettings, CheckConfig, Config, ConfigValues};
pub use errors::LabelError;
pub use input_file::{InputFile, InputFileArena, Location, LocationRange, PersistentRange};
pub use label::Label;
pub use label_pattern::{LabelPattern, PatternKind};
pub use source_dir::SourceDir;
pub use source_file::{FileKind, SourceFile};
pub use target::{SwiftValues, Target, TargetGraph, TargetId, TargetKind};
pub use traits::{DiskFiles, FileProvider, RayonPool, SerialPool, WorkerPool};
