//! Source directories and relative-path resolution.

use crate::source_file::SourceFile;

/// A directory identity, stored with a trailing slash: `//base/files/`
/// for directories under the source root, `/usr/include/` for
/// system-absolute ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceDir(String);

impl SourceDir {
    pub fn new(value: impl Into<String>) -> SourceDir {
        let mut value = value.into();
        debug_assert!(value.starts_with('/'), "source dirs are absolute: {value}");
        if !value.ends_with('/') {
            value.push('/');
        }
        SourceDir(value)
    }

    pub fn value(&self) -> &str {
        &self.0
    }

    /// Resolve an include literal against this directory.
    ///
    /// Source-absolute (`//…`) and system-absolute (`/…`) literals ignore
    /// the directory. Relative literals are joined and normalized
    /// lexically; `..` escaping above the root yields `None`.
    pub fn resolve_relative_file(&self, literal: &str) -> Option<SourceFile> {
        if literal.is_empty() {
            return None;
        }
        let joined = if literal.starts_with('/') {
            literal.to_string()
        } else {
            format!("{}{literal}", self.0)
        };
        normalize_path(&joined).map(SourceFile::new)
    }
}

/// Lexical `.`/`..` normalization of an absolute path. Returns `None`
/// when `..` would climb above the root.
fn normalize_path(path: &str) -> Option<String> {
    let (prefix, rest) = if let Some(rest) = path.strip_prefix("//") {
        ("//", rest)
    } else {
        ("/", path.strip_prefix('/')?)
    };

    let mut components: Vec<&str> = Vec::new();
    for component in rest.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                components.pop()?;
            }
            other => components.push(other),
        }
    }
    Some(format!("{prefix}{}", components.join("/")))
}
