//! Input files, locations, and the persistent input arena.
//!
//! Check tasks read file contents into task-local buffers. A diagnostic
//! that points into such a buffer must outlive the task, so before a
//! location is stored in an error it is rewritten against a clone of the
//! buffer held in the process-wide [`InputFileArena`]. The arena is
//! append-only; clones live for the rest of the run.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::source_file::SourceFile;

/// A named file buffer.
#[derive(Debug)]
pub struct InputFile {
    name: SourceFile,
    contents: String,
}

impl InputFile {
    pub fn new(name: SourceFile, contents: String) -> InputFile {
        InputFile { name, contents }
    }

    pub fn name(&self) -> &SourceFile {
        &self.name
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }
}

/// A 1-indexed line/column position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open range within one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationRange {
    pub begin: Location,
    pub end: Location,
}

impl LocationRange {
    pub fn new(begin: Location, end: Location) -> LocationRange {
        LocationRange { begin, end }
    }
}

/// A location range anchored at an arena-owned file clone, safe to keep
/// after the originating task's buffer is gone.
#[derive(Debug, Clone)]
pub struct PersistentRange {
    file: Arc<InputFile>,
    range: LocationRange,
}

impl PersistentRange {
    pub fn file(&self) -> &Arc<InputFile> {
        &self.file
    }

    pub fn range(&self) -> LocationRange {
        self.range
    }
}

impl fmt::Display for PersistentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.name(), self.range.begin)
    }
}

/// Process-wide append-only store of cloned input files.
#[derive(Debug, Default)]
pub struct InputFileArena {
    files: Mutex<Vec<Arc<InputFile>>>,
}

impl InputFileArena {
    pub fn new() -> InputFileArena {
        InputFileArena::default()
    }

    /// Clone `file`'s contents into the arena and return the range
    /// re-anchored at the clone.
    pub fn persistent_range(&self, file: &InputFile, range: LocationRange) -> PersistentRange {
        let clone = Arc::new(InputFile::new(file.name().clone(), file.contents().to_string()));
        self.files
            .lock()
            .expect("input arena poisoned")
            .push(Arc::clone(&clone));
        PersistentRange { file: clone, range }
    }

    pub fn len(&self) -> usize {
        self.files.lock().expect("input arena poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(line: u32, begin: u32, end: u32) -> LocationRange {
        LocationRange::new(
            Location { line, column: begin },
            Location { line, column: end },
        )
    }

    #[test]
    fn persistent_range_outlives_original() {
        let arena = InputFileArena::new();
        let persisted = {
            let local = InputFile::new(
                SourceFile::new("//a/b.cc"),
                "#include \"x.h\"\n".to_string(),
            );
            arena.persistent_range(&local, range(1, 11, 14))
        };
        // The original buffer is dropped; the clone still carries the bytes.
        assert_eq!(persisted.file().contents(), "#include \"x.h\"\n");
        assert_eq!(persisted.range().begin.line, 1);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn arena_appends_per_clone() {
        let arena = InputFileArena::new();
        let local = InputFile::new(SourceFile::new("//a/b.cc"), String::new());
        let first = arena.persistent_range(&local, range(1, 1, 1));
        let second = arena.persistent_range(&local, range(2, 1, 1));
        assert_eq!(arena.len(), 2);
        assert!(!Arc::ptr_eq(first.file(), second.file()));
    }
}
