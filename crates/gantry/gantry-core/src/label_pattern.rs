//! Label patterns.
//!
//! Patterns select sets of targets and appear in `friends` lists. Three
//! shapes exist: an exact label (`//foo:bar`), every target in one
//! directory (`//foo:*`), and every target in a directory tree
//! (`//foo/*`, or the bare `*` for the whole build). A parenthesized
//! toolchain suffix restricts the pattern to targets resolved in that
//! toolchain.

use std::fmt;

use crate::errors::LabelError;
use crate::label::Label;

/// How a pattern's directory part is compared against a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    /// Exact directory and name.
    Match,
    /// Any target in exactly the given directory.
    Directory,
    /// Any target in the given directory or below.
    RecursiveDirectory,
}

/// A parsed label pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPattern {
    kind: PatternKind,
    /// Directory with trailing slash; empty for whole-build recursive
    /// patterns.
    dir: String,
    /// Target name; only meaningful for [`PatternKind::Match`].
    name: String,
    /// Toolchain restriction, if any.
    toolchain: Option<Label>,
}

impl LabelPattern {
    /// Parse a source-absolute pattern string.
    ///
    /// Accepted forms: `//dir:name`, `//dir:*`, `//dir/*`, `*`, each
    /// optionally followed by `(//toolchain:name)`. A wildcard anywhere
    /// else is rejected.
    pub fn parse(input: &str) -> Result<LabelPattern, LabelError> {
        let (body, toolchain) = match input.find('(') {
            None => (input, None),
            Some(open) => {
                if !input.ends_with(')') {
                    return Err(LabelError::UnterminatedToolchain(input.to_string()));
                }
                let tc = &input[open + 1..input.len() - 1];
                if tc.contains('*') {
                    return Err(LabelError::WildcardToolchain(input.to_string()));
                }
                let tc = if tc.is_empty() {
                    None
                } else {
                    Some(Label::parse(tc)?)
                };
                (&input[..open], tc)
            }
        };

        if body.is_empty() {
            return Err(LabelError::EmptyName(input.to_string()));
        }

        // Whole-build wildcard, with or without the redundant name part.
        if body == "*" || body == "*:*" {
            return Ok(LabelPattern {
                kind: PatternKind::RecursiveDirectory,
                dir: String::new(),
                name: String::new(),
                toolchain,
            });
        }

        let (kind, dir, name) = if let Some(dir_part) = body.strip_suffix(":*") {
            if let Some(prefix) = dir_part.strip_suffix("/*") {
                (PatternKind::RecursiveDirectory, format!("{prefix}/"), String::new())
            } else {
                (PatternKind::Directory, normalize(dir_part), String::new())
            }
        } else if let Some(prefix) = body.strip_suffix("/*") {
            (PatternKind::RecursiveDirectory, format!("{prefix}/"), String::new())
        } else {
            let label = Label::parse(body)?;
            (PatternKind::Match, label.dir().to_string(), label.name().to_string())
        };

        if dir.contains('*') || name.contains('*') {
            return Err(LabelError::MisplacedWildcard(input.to_string()));
        }
        if !dir.starts_with("//") {
            return Err(LabelError::NotSourceAbsolute(input.to_string()));
        }

        Ok(LabelPattern { kind, dir, name, toolchain })
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn toolchain(&self) -> Option<&Label> {
        self.toolchain.as_ref()
    }

    /// True when this pattern selects the given label.
    pub fn matches(&self, label: &Label) -> bool {
        if let Some(tc) = &self.toolchain {
            if label.toolchain_dir() != tc.dir() || label.toolchain_name() != tc.name() {
                return false;
            }
        }
        match self.kind {
            PatternKind::Match => label.dir() == self.dir && label.name() == self.name,
            PatternKind::Directory => label.dir() == self.dir,
            PatternKind::RecursiveDirectory => {
                self.dir.is_empty() || label.dir().starts_with(&self.dir)
            }
        }
    }

    /// True when any pattern in the slice matches. Order-insensitive.
    pub fn vector_matches(patterns: &[LabelPattern], label: &Label) -> bool {
        patterns.iter().any(|p| p.matches(label))
    }
}

impl fmt::Display for LabelPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PatternKind::Match => {
                let trimmed = self.dir.trim_end_matches('/');
                let dir = if trimmed.is_empty() { "//" } else { trimmed };
                write!(f, "{}:{}", dir, self.name)?;
            }
            PatternKind::Directory => {
                write!(f, "{}:*", self.dir.trim_end_matches('/'))?;
            }
            PatternKind::RecursiveDirectory => {
                write!(f, "{}*", self.dir)?;
            }
        }
        if let Some(tc) = &self.toolchain {
            write!(f, "({})", tc.user_visible_name(false))?;
        }
        Ok(())
    }
}

fn normalize(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}
