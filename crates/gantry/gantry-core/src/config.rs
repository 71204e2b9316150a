//! Configuration values and build settings.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::label::Label;
use crate::source_dir::SourceDir;
use crate::source_file::SourceFile;

/// The per-configuration values the checker reads. The full build
/// carries many more (defines, cflags, …); only include directories
/// matter for include resolution.
#[derive(Debug, Clone, Default)]
pub struct ConfigValues {
    /// Include directories in declaration order. Duplicates are allowed;
    /// resolution takes the first match.
    pub include_dirs: Vec<SourceDir>,
}

/// A named configuration attached to targets.
#[derive(Debug, Clone)]
pub struct Config {
    pub label: Label,
    pub values: ConfigValues,
}

impl Config {
    pub fn new(label: Label, values: ConfigValues) -> Config {
        Config { label, values }
    }
}

/// Paths fixed for the whole build: where the source root lives on disk
/// and which source-absolute directory receives generated outputs.
#[derive(Debug, Clone)]
pub struct BuildSettings {
    root_path: PathBuf,
    build_dir: SourceDir,
}

impl BuildSettings {
    pub fn new(root_path: impl Into<PathBuf>, build_dir: SourceDir) -> BuildSettings {
        BuildSettings {
            root_path: root_path.into(),
            build_dir,
        }
    }

    pub fn root_path(&self) -> &Path {
        &self.root_path
    }

    pub fn build_dir(&self) -> &SourceDir {
        &self.build_dir
    }

    /// Map a source-file identity to its on-disk path.
    pub fn full_path(&self, file: &SourceFile) -> PathBuf {
        match file.value().strip_prefix("//") {
            Some(relative) => self.root_path.join(relative),
            None => PathBuf::from(file.value()),
        }
    }

    /// True when the file lives under the build output directory.
    pub fn is_output_file(&self, file: &SourceFile) -> bool {
        file.value().starts_with(self.build_dir.value())
    }
}

/// Checker switches, as loaded from the command line or a config file.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Also check generated files. Only meaningful after a build has
    /// produced them.
    #[serde(default)]
    pub check_generated: bool,
    /// Also check `#include <…>` directives.
    #[serde(default)]
    pub check_system: bool,
}
