//! Data model shared by the parser and the normalizer.
//!
//! `RawFileDiff` is what a source-control host hands us; `NormalizedChange`
//! is what downstream review stages consume. The parser's own structures
//! (`PatchedFile`, `Hunk`, `DiffLine`) sit in between.

use serde::{Deserialize, Serialize};

/// One changed file as supplied by the host API (compare / commit diff).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFileDiff {
    pub old_path: String,
    pub new_path: String,
    /// Hunk body as returned by the host; file headers may be missing.
    pub diff_body: String,
}

impl RawFileDiff {
    pub fn new(
        old_path: impl Into<String>,
        new_path: impl Into<String>,
        diff_body: impl Into<String>,
    ) -> Self {
        Self {
            old_path: old_path.into(),
            new_path: new_path.into(),
            diff_body: diff_body.into(),
        }
    }
}

/// File-level change classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffStatus {
    Added,
    Deleted,
    Renamed,
    Modified,
    /// No file-level flag matched. Surfaced as-is, never coerced.
    Unknown,
}

impl DiffStatus {
    /// Short lowercase label used in logs and summaries.
    pub fn label(self) -> &'static str {
        match self {
            DiffStatus::Added => "added",
            DiffStatus::Deleted => "deleted",
            DiffStatus::Renamed => "renamed",
            DiffStatus::Modified => "modified",
            DiffStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized, immutable record for one changed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedChange {
    /// Equals the raw entry's `new_path`.
    pub file_path: String,
    pub status: DiffStatus,
    pub added_lines: u32,
    pub removed_lines: u32,
    /// Full unified-diff document: synthetic `---`/`+++` header + raw body.
    pub diff_text: String,
    /// Short type label such as `toml` or `python`; empty when unknown.
    pub content_type: String,
}

impl NormalizedChange {
    /// Template inputs for prompt rendering.
    pub fn template_input(&self) -> TemplateInput<'_> {
        TemplateInput {
            name: &self.file_path,
            language: &self.content_type,
            content: &self.diff_text,
        }
    }

    /// Whether the review stage should look at this file at all.
    pub fn is_reviewable(&self) -> bool {
        matches!(self.status, DiffStatus::Added | DiffStatus::Modified)
    }
}

/// `{name, language, content}` view of a change, borrowed from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TemplateInput<'a> {
    pub name: &'a str,
    pub language: &'a str,
    pub content: &'a str,
}

/// Aggregate counters over a set of normalized changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub files: usize,
    pub added_files: usize,
    pub deleted_files: usize,
    pub renamed_files: usize,
    pub modified_files: usize,
    pub unknown_files: usize,
    pub added_lines: u64,
    pub removed_lines: u64,
}

impl ChangeSummary {
    pub fn from_changes(changes: &[NormalizedChange]) -> Self {
        let mut s = ChangeSummary {
            files: changes.len(),
            ..Default::default()
        };
        for c in changes {
            match c.status {
                DiffStatus::Added => s.added_files += 1,
                DiffStatus::Deleted => s.deleted_files += 1,
                DiffStatus::Renamed => s.renamed_files += 1,
                DiffStatus::Modified => s.modified_files += 1,
                DiffStatus::Unknown => s.unknown_files += 1,
            }
            s.added_lines += u64::from(c.added_lines);
            s.removed_lines += u64::from(c.removed_lines);
        }
        s
    }
}

/// One line inside a diff hunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLine {
    Added {
        new_line: u32,
        content: String,
    },
    Removed {
        old_line: u32,
        content: String,
    },
    Context {
        old_line: u32,
        new_line: u32,
        content: String,
    },
}

/// A diff hunk (continuous block of changes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    /// Text after the closing `@@`, usually the enclosing function.
    pub section: String,
    pub lines: Vec<DiffLine>,
}

impl Hunk {
    pub fn added(&self) -> u32 {
        saturating_count(
            self.lines
                .iter()
                .filter(|l| matches!(l, DiffLine::Added { .. }))
                .count(),
        )
    }

    pub fn removed(&self) -> u32 {
        saturating_count(
            self.lines
                .iter()
                .filter(|l| matches!(l, DiffLine::Removed { .. }))
                .count(),
        )
    }
}

/// Clamps a line count to `u32::MAX`.
fn saturating_count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Git extended header markers seen before the first hunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMarkers {
    pub new_file: bool,
    pub deleted_file: bool,
    pub rename_from: Option<String>,
    pub rename_to: Option<String>,
    pub binary: bool,
}

/// Single-file patch produced by the parser.
///
/// `source`/`target` are `None` when the header path is `/dev/null` or empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchedFile {
    pub source: Option<String>,
    pub target: Option<String>,
    pub markers: FileMarkers,
    pub hunks: Vec<Hunk>,
}

impl PatchedFile {
    /// Target exists and the source does not (or the only hunk starts at `-0,0`).
    pub fn is_added_file(&self) -> bool {
        if self.target.is_none() {
            return false;
        }
        self.source.is_none()
            || self.markers.new_file
            || matches!(self.hunks.as_slice(), [h] if h.old_start == 0 && h.old_lines == 0)
    }

    /// Source exists and the target does not (or the only hunk ends at `+0,0`).
    pub fn is_removed_file(&self) -> bool {
        if self.source.is_none() {
            return false;
        }
        self.target.is_none()
            || self.markers.deleted_file
            || matches!(self.hunks.as_slice(), [h] if h.new_start == 0 && h.new_lines == 0)
    }

    pub fn is_rename(&self) -> bool {
        if self.markers.rename_from.is_some() || self.markers.rename_to.is_some() {
            return true;
        }
        matches!((&self.source, &self.target), (Some(s), Some(t)) if s != t)
    }

    pub fn is_modified_file(&self) -> bool {
        self.source.is_some()
            && self.target.is_some()
            && !self.is_added_file()
            && !self.is_removed_file()
    }

    /// Number of added content lines across all hunks.
    pub fn added(&self) -> u32 {
        self.hunks.iter().fold(0u32, |acc, h| acc.saturating_add(h.added()))
    }

    /// Number of removed content lines across all hunks.
    pub fn removed(&self) -> u32 {
        self.hunks.iter().fold(0u32, |acc, h| acc.saturating_add(h.removed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(status: DiffStatus, added: u32, removed: u32) -> NormalizedChange {
        NormalizedChange {
            file_path: "f".into(),
            status,
            added_lines: added,
            removed_lines: removed,
            diff_text: String::new(),
            content_type: String::new(),
        }
    }

    #[test]
    fn summary_counts_statuses_and_lines() {
        let s = ChangeSummary::from_changes(&[
            change(DiffStatus::Added, 10, 0),
            change(DiffStatus::Modified, 3, 1),
            change(DiffStatus::Modified, 1, 1),
            change(DiffStatus::Unknown, 0, 0),
        ]);
        assert_eq!(s.files, 4);
        assert_eq!(s.added_files, 1);
        assert_eq!(s.modified_files, 2);
        assert_eq!(s.unknown_files, 1);
        assert_eq!((s.added_lines, s.removed_lines), (14, 2));
    }

    #[test]
    fn line_counts_saturate_instead_of_wrapping() {
        assert_eq!(saturating_count(7), 7);
        assert_eq!(saturating_count(u32::MAX as usize), u32::MAX);
        assert_eq!(saturating_count(usize::MAX), u32::MAX);

        let hunk = Hunk {
            old_start: 1,
            old_lines: 1,
            new_start: 1,
            new_lines: 2,
            section: String::new(),
            lines: vec![
                DiffLine::Removed {
                    old_line: 1,
                    content: "a".into(),
                },
                DiffLine::Added {
                    new_line: 1,
                    content: "b".into(),
                },
                DiffLine::Added {
                    new_line: 2,
                    content: "c".into(),
                },
            ],
        };
        let file = PatchedFile {
            source: Some("x".into()),
            target: Some("x".into()),
            markers: FileMarkers::default(),
            hunks: vec![hunk.clone(), hunk],
        };
        assert_eq!((file.added(), file.removed()), (4, 2));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&DiffStatus::Renamed).unwrap();
        assert_eq!(json, "\"renamed\"");
        assert_eq!(DiffStatus::Deleted.to_string(), "deleted");
    }
}
