//! Target labels.
//!
//! A label names one target in the build graph: `//base/files:files`.
//! The optional parenthesized suffix names the toolchain the target was
//! resolved in: `//base/files:files(//build/toolchain:arm64)`. Labels in
//! this crate are always source-absolute; relative-label resolution
//! happens in the build-language frontend before the graph reaches us.

use std::fmt;

use crate::errors::LabelError;

/// A resolved target label: directory, short name, and optional toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label {
    /// Source-absolute directory, always with a trailing slash (`//foo/`).
    dir: String,
    /// Short name of the target within `dir`.
    name: String,
    /// Toolchain directory, empty when the label carries no toolchain.
    toolchain_dir: String,
    /// Toolchain short name, empty when the label carries no toolchain.
    toolchain_name: String,
}

impl Label {
    /// Create a label with no toolchain. `dir` is normalized to carry a
    /// trailing slash.
    pub fn new(dir: &str, name: &str) -> Label {
        Label {
            dir: normalize_dir(dir),
            name: name.to_string(),
            toolchain_dir: String::new(),
            toolchain_name: String::new(),
        }
    }

    /// Create a label in an explicit toolchain.
    pub fn with_toolchain(dir: &str, name: &str, toolchain_dir: &str, toolchain_name: &str) -> Label {
        Label {
            dir: normalize_dir(dir),
            name: name.to_string(),
            toolchain_dir: normalize_dir(toolchain_dir),
            toolchain_name: toolchain_name.to_string(),
        }
    }

    /// Parse a source-absolute label such as `//foo/bar:baz` or
    /// `//foo/bar:baz(//build/toolchain:arm64)`.
    ///
    /// When the name part is omitted (`//foo/bar`), the last directory
    /// component is implied as the name.
    pub fn parse(input: &str) -> Result<Label, LabelError> {
        let (body, toolchain) = split_toolchain(input)?;

        let toolchain = match toolchain {
            Some("") | None => None,
            Some(tc) => Some(Box::new(Label::parse(tc)?)),
        };
        if let Some(tc) = &toolchain {
            if tc.has_toolchain() {
                return Err(LabelError::NestedToolchain(input.to_string()));
            }
        }

        if !body.starts_with("//") {
            return Err(LabelError::NotSourceAbsolute(input.to_string()));
        }

        let (dir, name) = match body.rfind(':') {
            Some(colon) => (&body[..colon], &body[colon + 1..]),
            None => {
                // Implied name: the last directory component.
                let trimmed = body.trim_end_matches('/');
                match trimmed.rsplit('/').next() {
                    Some(last) if !last.is_empty() => (body, last),
                    _ => return Err(LabelError::EmptyName(input.to_string())),
                }
            }
        };
        if name.is_empty() {
            return Err(LabelError::EmptyName(input.to_string()));
        }

        Ok(match toolchain {
            Some(tc) => Label::with_toolchain(dir, name, tc.dir(), tc.name()),
            None => Label::new(dir, name),
        })
    }

    /// Source-absolute directory with a trailing slash.
    pub fn dir(&self) -> &str {
        &self.dir
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn toolchain_dir(&self) -> &str {
        &self.toolchain_dir
    }

    pub fn toolchain_name(&self) -> &str {
        &self.toolchain_name
    }

    pub fn has_toolchain(&self) -> bool {
        !self.toolchain_dir.is_empty() || !self.toolchain_name.is_empty()
    }

    /// True when both labels were resolved in the same toolchain.
    pub fn toolchains_equal(&self, other: &Label) -> bool {
        self.toolchain_dir == other.toolchain_dir && self.toolchain_name == other.toolchain_name
    }

    /// True when the labels name the same target, ignoring the toolchain.
    pub fn matches_except_toolchain(&self, other: &Label) -> bool {
        self.dir == other.dir && self.name == other.name
    }

    /// Render the label the way users see it in messages:
    /// `//foo/bar:baz`, with `(//tc:name)` appended when
    /// `include_toolchain` is set and the label has one.
    pub fn user_visible_name(&self, include_toolchain: bool) -> String {
        let mut out = String::with_capacity(self.dir.len() + self.name.len() + 1);
        out.push_str(dir_no_trailing_slash(&self.dir));
        out.push(':');
        out.push_str(&self.name);
        if include_toolchain && self.has_toolchain() {
            out.push('(');
            out.push_str(dir_no_trailing_slash(&self.toolchain_dir));
            out.push(':');
            out.push_str(&self.toolchain_name);
            out.push(')');
        }
        out
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.user_visible_name(false))
    }
}

/// Split `body(toolchain)` into its two parts.
fn split_toolchain(input: &str) -> Result<(&str, Option<&str>), LabelError> {
    match input.find('(') {
        None => Ok((input, None)),
        Some(open) => {
            if !input.ends_with(')') {
                return Err(LabelError::UnterminatedToolchain(input.to_string()));
            }
            Ok((&input[..open], Some(&input[open + 1..input.len() - 1])))
        }
    }
}

fn normalize_dir(dir: &str) -> String {
    if dir.ends_with('/') {
        dir.to_string()
    } else {
        format!("{dir}/")
    }
}

fn dir_no_trailing_slash(dir: &str) -> &str {
    if dir.len() > 2 && dir.ends_with('/') {
        &dir[..dir.len() - 1]
    } else {
        dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_explicit_name() {
        let label = Label::parse("//base/files:files").unwrap();
        assert_eq!(label.dir(), "//base/files/");
        assert_eq!(label.name(), "files");
        assert!(!label.has_toolchain());
    }

    #[test]
    fn parse_implied_name() {
        let label = Label::parse("//base/files").unwrap();
        assert_eq!(label.dir(), "//base/files/");
        assert_eq!(label.name(), "files");
    }

    #[test]
    fn parse_with_toolchain() {
        let label = Label::parse("//base:base(//build/toolchain:arm64)").unwrap();
        assert_eq!(label.toolchain_dir(), "//build/toolchain/");
        assert_eq!(label.toolchain_name(), "arm64");
        assert!(label.has_toolchain());
    }

    #[test]
    fn parse_empty_toolchain_parens() {
        let label = Label::parse("//base()").unwrap();
        assert_eq!(label.name(), "base");
        assert!(!label.has_toolchain());
    }

    #[test]
    fn parse_rejects_relative() {
        assert!(Label::parse("base:base").is_err());
        assert!(Label::parse(":base").is_err());
        assert!(Label::parse("").is_err());
    }

    #[test]
    fn parse_rejects_unterminated_toolchain() {
        assert!(Label::parse("//foo(//bar").is_err());
    }

    #[test]
    fn user_visible_name() {
        let label = Label::with_toolchain("//base/files", "files", "//tc", "arm64");
        assert_eq!(label.user_visible_name(false), "//base/files:files");
        assert_eq!(
            label.user_visible_name(true),
            "//base/files:files(//tc:arm64)"
        );
    }

    #[test]
    fn user_visible_name_root_dir() {
        let label = Label::new("//", "root");
        assert_eq!(label.user_visible_name(false), "//:root");
    }

    #[test]
    fn toolchains_equal() {
        let a = Label::with_toolchain("//a", "a", "//tc", "default");
        let b = Label::with_toolchain("//b", "b", "//tc", "default");
        let c = Label::with_toolchain("//b", "b", "//tc", "arm64");
        assert!(a.toolchains_equal(&b));
        assert!(!a.toolchains_equal(&c));
        assert!(b.matches_except_toolchain(&c));
    }
}
