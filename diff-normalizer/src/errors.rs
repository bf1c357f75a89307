//! Crate-wide error hierarchy for diff-normalizer.

use thiserror::Error;

/// Convenient alias for parser results.
pub type ParseResult<T> = Result<T, ParseError>;

/// Convenient alias for normalizer results.
pub type NormalizeResult<T> = Result<T, NormalizeError>;

/// Root error type for the diff-normalizer crate.
#[derive(Debug, Error)]
pub enum NormalizeError {
    /// Reassembled diff for `path` is not valid unified-diff syntax.
    #[error("malformed diff for `{path}`: {source}")]
    MalformedDiff {
        /// New path of the offending entry (old path when the new one is empty).
        path: String,
        #[source]
        source: ParseError,
    },
}

/// Unified diff parser errors.
///
/// `line` is the 1-based line number inside the reassembled document
/// (the two synthetic header lines included).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Hunk header could not be parsed or had invalid counters.
    #[error("invalid hunk header at line {line}: {header}")]
    InvalidHunkHeader { line: usize, header: String },

    /// Input ended (or a non-hunk line appeared) before the hunk's
    /// declared old/new line counts were consumed.
    #[error("hunk is shorter than expected at line {line}")]
    HunkTooShort { line: usize },

    /// A content line does not fit into the current hunk's ranges, or
    /// appears outside of any hunk.
    #[error("unexpected line {line}: {content}")]
    UnexpectedLine { line: usize, content: String },

    /// A second file header appeared after hunks were already read.
    #[error("more than one file in patch (line {line})")]
    MultipleFiles { line: usize },

    /// Integer overflow while computing line ranges.
    #[error("integer overflow")]
    Overflow,
}
