//! Diff normalization and classification for merge-request review.
//!
//! Source-control hosts return one diff entry per changed file, usually as
//! `{old_path, new_path, diff}` where `diff` is a bare hunk body. This crate
//! turns such entries into `NormalizedChange` records:
//!
//! 1. reassemble a canonical unified-diff document (`--- a/…`, `+++ b/…`, body);
//! 2. parse it with a strict single-file parser (`parser`);
//! 3. classify the change (added / deleted / renamed / modified / unknown);
//! 4. count added and removed lines;
//! 5. attach a short content-type label derived from the path.
//!
//! Everything here is synchronous and pure: the same input always produces
//! the same output, so callers are free to fan out across files themselves.

pub mod content_type;
pub mod errors;
pub mod normalize;
pub mod parser;
pub mod types;

pub use content_type::{content_type, guess_mime_type};
pub use errors::{NormalizeError, NormalizeResult, ParseError, ParseResult};
pub use normalize::{classify, normalize, normalize_one, reassemble};
pub use parser::parse_patched_file;
pub use types::{
    ChangeSummary, DiffLine, DiffStatus, Hunk, NormalizedChange, PatchedFile, RawFileDiff,
    TemplateInput,
};
