//! Lexical `#include` extraction.
//!
//! The iterator walks a file buffer line by line and yields every
//! `#include`/`#import` directive with its location. It is deliberately
//! preprocessor-unaware: an include inside `#if 0` is still reported,
//! which is why unknown headers are tolerated downstream. Directives
//! carrying a `nogantrycheck` annotation anywhere on the line are
//! skipped so users can silence checks on conditional includes.
//!
//! Includes cluster at the top of C-family files, so scanning gives up
//! after a run of lines that look like real code. Blank lines, comments,
//! and other preprocessor directives don't count toward that limit.

use gantry_core::input_file::{InputFile, Location, LocationRange};

/// How many code-looking lines without an include end the scan.
const MAX_NON_INCLUDE_LINES: u32 = 10;

const SUPPRESSION_ANNOTATION: &str = "nogantrycheck";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncludeStyle {
    /// `#include "foo/bar.h"`
    Quoted,
    /// `#include <foo/bar.h>`
    System,
}

/// One include directive found in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncludeRef<'a> {
    pub literal: &'a str,
    pub style: IncludeStyle,
    /// Range covering the literal, without its delimiters.
    pub range: LocationRange,
}

/// Lazy iterator over the include directives of one input file.
pub struct IncludeIterator<'a> {
    lines: std::str::Lines<'a>,
    line_number: u32,
    lines_since_last_include: u32,
}

impl<'a> IncludeIterator<'a> {
    pub fn new(file: &'a InputFile) -> IncludeIterator<'a> {
        IncludeIterator {
            lines: file.contents().lines(),
            line_number: 0,
            lines_since_last_include: 0,
        }
    }
}

impl<'a> Iterator for IncludeIterator<'a> {
    type Item = IncludeRef<'a>;

    fn next(&mut self) -> Option<IncludeRef<'a>> {
        while self.lines_since_last_include <= MAX_NON_INCLUDE_LINES {
            let line = self.lines.next()?;
            self.line_number += 1;

            let trimmed = line.trim_start();
            if trimmed.is_empty() {
                continue;
            }

            if let Some((literal, style)) = extract_include(trimmed) {
                if !line.contains(SUPPRESSION_ANNOTATION) {
                    self.lines_since_last_include = 0;
                    // Byte offset of the literal within the original line.
                    let offset = literal.as_ptr() as usize - line.as_ptr() as usize;
                    let begin = Location {
                        line: self.line_number,
                        column: offset as u32 + 1,
                    };
                    let end = Location {
                        line: self.line_number,
                        column: begin.column + literal.len() as u32,
                    };
                    return Some(IncludeRef {
                        literal,
                        style,
                        range: LocationRange::new(begin, end),
                    });
                }
                continue;
            }

            if counts_toward_non_include_lines(trimmed) {
                self.lines_since_last_include += 1;
            }
        }
        None
    }
}

/// Pull the include literal out of a whitespace-trimmed line, if the
/// line is an include directive.
fn extract_include(trimmed: &str) -> Option<(&str, IncludeStyle)> {
    let rest = trimmed.strip_prefix('#')?.trim_start();
    let rest = rest
        .strip_prefix("include")
        .or_else(|| rest.strip_prefix("import"))?
        .trim_start();

    let (close, style) = match rest.as_bytes().first().copied()? {
        b'"' => ('"', IncludeStyle::Quoted),
        b'<' => ('>', IncludeStyle::System),
        _ => return None,
    };
    let body = &rest[1..];
    let literal = &body[..body.find(close)?];
    if literal.is_empty() {
        return None;
    }
    Some((literal, style))
}

/// Lines that plausibly are code. Comments, blank lines, and other
/// preprocessor directives (guards, defines) don't end the scan.
fn counts_toward_non_include_lines(trimmed: &str) -> bool {
    !(trimmed.starts_with('#')
        || trimmed.starts_with("//")
        || trimmed.starts_with("/*")
        || trimmed.starts_with('*'))
}
