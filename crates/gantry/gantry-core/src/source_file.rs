//! Canonical source-file identities.
//!
//! A `SourceFile` is a label-like path, not a filesystem path:
//! `//base/files/file_util.h` for files under the source root, or
//! `/usr/include/stdio.h` for system-absolute files. Two targets naming
//! the same path produce the same identity, which is what makes the file
//! map work.

use std::fmt;

/// Classification of a source file by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    CSource,
    CppSource,
    CHeader,
    ObjcSource,
    ObjcppSource,
    WindowsResource,
    SwiftSource,
    Unknown,
}

impl FileKind {
    /// Kinds whose contents carry `#include` directives worth checking.
    pub fn is_checkable(self) -> bool {
        matches!(
            self,
            FileKind::CSource
                | FileKind::CppSource
                | FileKind::CHeader
                | FileKind::ObjcSource
                | FileKind::ObjcppSource
                | FileKind::WindowsResource
        )
    }
}

/// A canonical source-file path identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceFile(String);

impl SourceFile {
    /// Wrap an already-canonical path (`//…` or `/…`).
    pub fn new(value: impl Into<String>) -> SourceFile {
        let value = value.into();
        debug_assert!(
            value.starts_with('/'),
            "source file paths are absolute: {value}"
        );
        SourceFile(value)
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// True for files under the source root (`//…`) as opposed to
    /// system-absolute paths.
    pub fn is_source_absolute(&self) -> bool {
        self.0.starts_with("//")
    }

    /// The file name after the last slash.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or("")
    }

    /// The directory part including the trailing slash.
    pub fn dir_value(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..=idx],
            None => "",
        }
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        name.rfind('.').map(|idx| &name[idx + 1..])
    }

    pub fn kind(&self) -> FileKind {
        match self.extension() {
            Some("c") => FileKind::CSource,
            Some("cc" | "cpp" | "cxx" | "c++") => FileKind::CppSource,
            Some("h" | "hh" | "hpp" | "hxx" | "inc" | "ipp") => FileKind::CHeader,
            Some("m") => FileKind::ObjcSource,
            Some("mm") => FileKind::ObjcppSource,
            Some("rc") => FileKind::WindowsResource,
            Some("swift") => FileKind::SwiftSource,
            _ => FileKind::Unknown,
        }
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
