//! Raw host diffs -> classified `NormalizedChange` records.

use tracing::debug;

use crate::content_type::content_type;
use crate::errors::{NormalizeError, NormalizeResult};
use crate::parser::parse_patched_file;
use crate::types::{DiffStatus, NormalizedChange, PatchedFile, RawFileDiff};

/// Normalizes every entry, preserving count and order.
///
/// The first malformed entry aborts the whole batch; no partial output.
pub fn normalize(raw_diffs: &[RawFileDiff]) -> NormalizeResult<Vec<NormalizedChange>> {
    let changes = raw_diffs
        .iter()
        .map(normalize_one)
        .collect::<NormalizeResult<Vec<_>>>()?;
    debug!(files = changes.len(), "normalized comparison");
    Ok(changes)
}

/// Normalizes a single host entry.
pub fn normalize_one(raw: &RawFileDiff) -> NormalizeResult<NormalizedChange> {
    let diff_text = reassemble(raw);

    let patch = parse_patched_file(&diff_text).map_err(|source| NormalizeError::MalformedDiff {
        path: display_path(raw).to_string(),
        source,
    })?;

    let status = classify(&patch);
    let change = NormalizedChange {
        file_path: raw.new_path.clone(),
        status,
        added_lines: patch.added(),
        removed_lines: patch.removed(),
        content_type: content_type(&raw.new_path),
        diff_text,
    };

    debug!(
        file = %change.file_path,
        %status,
        added = change.added_lines,
        removed = change.removed_lines,
        content_type = %change.content_type,
        "normalized file diff"
    );

    Ok(change)
}

/// Prefixes the raw body with a synthetic `--- a/<old>` / `+++ b/<new>` header.
pub fn reassemble(raw: &RawFileDiff) -> String {
    format!(
        "--- a/{}\n+++ b/{}\n{}",
        raw.old_path, raw.new_path, raw.diff_body
    )
}

/// File-level status, first matching flag wins.
pub fn classify(patch: &PatchedFile) -> DiffStatus {
    if patch.is_added_file() {
        DiffStatus::Added
    } else if patch.is_removed_file() {
        DiffStatus::Deleted
    } else if patch.is_rename() {
        DiffStatus::Renamed
    } else if patch.is_modified_file() {
        DiffStatus::Modified
    } else {
        DiffStatus::Unknown
    }
}

fn display_path(raw: &RawFileDiff) -> &str {
    if raw.new_path.is_empty() {
        &raw.old_path
    } else {
        &raw.new_path
    }
}
