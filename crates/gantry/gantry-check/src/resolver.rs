//! Include-literal resolution against a target's search path.

use gantry_core::source_dir::SourceDir;
use gantry_core::source_file::SourceFile;

use crate::file_map::FileMap;
use crate::include_iterator::IncludeStyle;

/// Resolve an include literal to a known source file.
///
/// Quoted includes try the including file's own directory first, the way
/// a compiler would. After that the search path is scanned in
/// declaration order and the first directory whose resolution names a
/// file in the map wins. `None` means the header is unknown to the
/// build, which is not an error; the scanner reports includes that the
/// preprocessor may never see.
pub fn source_file_for_include(
    literal: &str,
    style: IncludeStyle,
    include_dirs: &[SourceDir],
    containing_file: &SourceFile,
    file_map: &FileMap,
) -> Option<SourceFile> {
    let resolve_in = |dir: &SourceDir| {
        dir.resolve_relative_file(literal)
            .filter(|candidate| file_map.contains(candidate))
    };

    if style == IncludeStyle::Quoted {
        let own_dir = SourceDir::new(containing_file.dir_value());
        if let Some(found) = resolve_in(&own_dir) {
            return Some(found);
        }
    }

    include_dirs.iter().find_map(resolve_in)
}
