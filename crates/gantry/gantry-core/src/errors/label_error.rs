//! Label and label-pattern parse errors.

/// Errors produced while parsing labels and label patterns.
#[derive(Debug, thiserror::Error)]
pub enum LabelError {
    #[error("label '{0}' is not source-absolute (expected a leading //)")]
    NotSourceAbsolute(String),

    #[error("label '{0}' names no target")]
    EmptyName(String),

    #[error("toolchain suffix of '{0}' is missing its closing parenthesis")]
    UnterminatedToolchain(String),

    #[error("toolchain label inside '{0}' may not itself carry a toolchain")]
    NestedToolchain(String),

    #[error("wildcard in an invalid position in pattern '{0}'")]
    MisplacedWildcard(String),

    #[error("toolchain restriction of pattern '{0}' may not contain wildcards")]
    WildcardToolchain(String),
}
