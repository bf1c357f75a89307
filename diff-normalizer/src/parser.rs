//! Strict unified-diff parser for single-file patches.
//!
//! Understands:
//! - `---` / `+++` file headers (`a/` and `b/` prefixes, `/dev/null`, tab-separated timestamps);
//! - git extended headers before the first hunk (`new file mode`, `rename from`, ...);
//! - `@@ -<old_start>[,<old_len>] +<new_start>[,<new_len>] @@ [section]` hunk headers;
//! - `\ No newline at end of file` markers (ignored).
//!
//! Unlike a display-oriented parser this one validates the hunk counters:
//! a hunk whose body is shorter than its header declares is an error, and so
//! is a content line that does not belong to any hunk.

use tracing::trace;

use crate::errors::{ParseError, ParseResult};
use crate::types::{DiffLine, FileMarkers, Hunk, PatchedFile};

/// Parses a unified diff document describing exactly one file.
pub fn parse_patched_file(diff: &str) -> ParseResult<PatchedFile> {
    let mut file = PatchedFile {
        source: None,
        target: None,
        markers: FileMarkers::default(),
        hunks: Vec::new(),
    };
    let mut open: Option<OpenHunk> = None;
    let mut last_line = 0usize;

    for (idx, text) in diff.lines().enumerate() {
        let lineno = idx + 1;
        last_line = lineno;

        if let Some(mut cur) = open.take() {
            if !text.starts_with('\\') {
                cur.push(text, lineno)?;
            }
            if cur.is_complete() {
                file.hunks.push(cur.hunk);
            } else {
                open = Some(cur);
            }
            continue;
        }

        if text.starts_with("@@") {
            let cur = OpenHunk::new(parse_hunk_header(text, lineno)?);
            if cur.is_complete() {
                file.hunks.push(cur.hunk);
            } else {
                open = Some(cur);
            }
            continue;
        }

        if text.starts_with('\\') {
            continue;
        }

        if let Some(rest) = text.strip_prefix("--- ") {
            if !file.hunks.is_empty() {
                return Err(ParseError::MultipleFiles { line: lineno });
            }
            file.source = header_path(rest);
            continue;
        }

        if let Some(rest) = text.strip_prefix("+++ ") {
            if !file.hunks.is_empty() {
                return Err(ParseError::MultipleFiles { line: lineno });
            }
            file.target = header_path(rest);
            continue;
        }

        if file.hunks.is_empty() {
            // Content or a mangled hunk header before any `@@` means the
            // hunk header is missing.
            if text.starts_with(['+', '-', ' ', '@']) && !text.trim().is_empty() {
                return Err(ParseError::UnexpectedLine {
                    line: lineno,
                    content: text.to_string(),
                });
            }
            read_extended_header(text, &mut file.markers);
            continue;
        }

        if text.starts_with("diff --git ") {
            return Err(ParseError::MultipleFiles { line: lineno });
        }

        // Hosts often leave a trailing blank line after the last hunk.
        if text.trim().is_empty() {
            continue;
        }

        return Err(ParseError::UnexpectedLine {
            line: lineno,
            content: text.to_string(),
        });
    }

    if open.is_some() {
        return Err(ParseError::HunkTooShort { line: last_line });
    }

    Ok(file)
}

/// Hunk being filled, with the counters still owed by its header.
struct OpenHunk {
    hunk: Hunk,
    old_left: u32,
    new_left: u32,
    next_old: u32,
    next_new: u32,
}

impl OpenHunk {
    fn new(hunk: Hunk) -> Self {
        Self {
            old_left: hunk.old_lines,
            new_left: hunk.new_lines,
            next_old: hunk.old_start,
            next_new: hunk.new_start,
            hunk,
        }
    }

    fn is_complete(&self) -> bool {
        self.old_left == 0 && self.new_left == 0
    }

    fn push(&mut self, text: &str, lineno: usize) -> ParseResult<()> {
        let unexpected = || ParseError::UnexpectedLine {
            line: lineno,
            content: text.to_string(),
        };

        match text.as_bytes().first() {
            Some(b'+') => {
                if self.new_left == 0 {
                    return Err(unexpected());
                }
                self.hunk.lines.push(DiffLine::Added {
                    new_line: self.next_new,
                    content: text[1..].to_string(),
                });
                self.new_left -= 1;
                self.next_new = self.next_new.checked_add(1).ok_or(ParseError::Overflow)?;
            }
            Some(b'-') => {
                if self.old_left == 0 {
                    return Err(unexpected());
                }
                self.hunk.lines.push(DiffLine::Removed {
                    old_line: self.next_old,
                    content: text[1..].to_string(),
                });
                self.old_left -= 1;
                self.next_old = self.next_old.checked_add(1).ok_or(ParseError::Overflow)?;
            }
            // Empty lines are context lines whose leading space was stripped.
            Some(b' ') | None => {
                if self.old_left == 0 || self.new_left == 0 {
                    return Err(unexpected());
                }
                let content = text.get(1..).unwrap_or_default().to_string();
                self.hunk.lines.push(DiffLine::Context {
                    old_line: self.next_old,
                    new_line: self.next_new,
                    content,
                });
                self.old_left -= 1;
                self.new_left -= 1;
                self.next_old = self.next_old.checked_add(1).ok_or(ParseError::Overflow)?;
                self.next_new = self.next_new.checked_add(1).ok_or(ParseError::Overflow)?;
            }
            Some(_) => return Err(ParseError::HunkTooShort { line: lineno }),
        }
        Ok(())
    }
}

/// Parses `@@ -a[,b] +c[,d] @@ optional section`.
fn parse_hunk_header(text: &str, lineno: usize) -> ParseResult<Hunk> {
    let invalid = || ParseError::InvalidHunkHeader {
        line: lineno,
        header: text.to_string(),
    };

    let rest = text.strip_prefix("@@ ").ok_or_else(invalid)?;
    let (ranges, section) = rest.split_once(" @@").ok_or_else(invalid)?;

    let mut parts = ranges.split(' ');
    let old_part = parts
        .next()
        .and_then(|p| p.strip_prefix('-'))
        .ok_or_else(invalid)?;
    let new_part = parts
        .next()
        .and_then(|p| p.strip_prefix('+'))
        .ok_or_else(invalid)?;
    if parts.next().is_some() {
        return Err(invalid());
    }

    let (old_start, old_lines) = split_range(old_part).ok_or_else(invalid)?;
    let (new_start, new_lines) = split_range(new_part).ok_or_else(invalid)?;

    Ok(Hunk {
        old_start,
        old_lines,
        new_start,
        new_lines,
        section: section.trim_start().to_string(),
        lines: Vec::new(),
    })
}

/// Splits "12,7" into (12, 7); a bare "12" means a one-line range.
fn split_range(s: &str) -> Option<(u32, u32)> {
    match s.split_once(',') {
        Some((start, len)) => Some((parse_num(start)?, parse_num(len)?)),
        None => Some((parse_num(s)?, 1)),
    }
}

fn parse_num(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Extracts the path from a `---`/`+++` header value.
///
/// Returns `None` for `/dev/null` and for an empty path.
fn header_path(rest: &str) -> Option<String> {
    let raw = rest.split('\t').next().unwrap_or_default().trim_end();
    if raw == "/dev/null" {
        return None;
    }
    let path = raw
        .strip_prefix("a/")
        .or_else(|| raw.strip_prefix("b/"))
        .unwrap_or(raw);
    if path.is_empty() {
        None
    } else {
        Some(path.to_string())
    }
}

fn read_extended_header(text: &str, markers: &mut FileMarkers) {
    if text.starts_with("new file mode") {
        markers.new_file = true;
    } else if text.starts_with("deleted file mode") {
        markers.deleted_file = true;
    } else if let Some(p) = text.strip_prefix("rename from ") {
        markers.rename_from = Some(p.trim_end().to_string());
    } else if let Some(p) = text.strip_prefix("rename to ") {
        markers.rename_to = Some(p.trim_end().to_string());
    } else if text.starts_with("Binary files ") || text.starts_with("GIT binary patch") {
        markers.binary = true;
    } else {
        // diff --git, index, old/new mode, similarity index, binary payload
        trace!(line = text, "skipping extended header line");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_headers_and_hunk_lines() {
        let diff = "--- a/src/lib.rs\n+++ b/src/lib.rs\n@@ -1,3 +1,4 @@ fn main()\n use std::io;\n-let a = 1;\n+let a = 2;\n+let b = 3;\n fn x() {}\n";
        let f = parse_patched_file(diff).unwrap();

        assert_eq!(f.source.as_deref(), Some("src/lib.rs"));
        assert_eq!(f.target.as_deref(), Some("src/lib.rs"));
        assert_eq!(f.hunks.len(), 1);
        let h = &f.hunks[0];
        assert_eq!((h.old_start, h.old_lines, h.new_start, h.new_lines), (1, 3, 1, 4));
        assert_eq!(h.section, "fn main()");
        assert_eq!(
            h.lines[2],
            DiffLine::Added {
                new_line: 2,
                content: "let a = 2;".into()
            }
        );
        assert_eq!(
            h.lines[4],
            DiffLine::Context {
                old_line: 3,
                new_line: 4,
                content: "fn x() {}".into()
            }
        );
        assert_eq!((f.added(), f.removed()), (2, 1));
        assert!(f.is_modified_file());
    }

    #[test]
    fn range_without_length_means_one_line() {
        let diff = "--- a/x\n+++ b/x\n@@ -3 +3 @@\n-old\n+new\n";
        let f = parse_patched_file(diff).unwrap();
        assert_eq!(f.hunks[0].old_lines, 1);
        assert_eq!(f.hunks[0].new_lines, 1);
        assert_eq!((f.added(), f.removed()), (1, 1));
    }

    #[test]
    fn no_newline_marker_is_not_a_line() {
        let diff = "--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n\\ No newline at end of file\n+b\n\\ No newline at end of file\n";
        let f = parse_patched_file(diff).unwrap();
        assert_eq!(f.hunks[0].lines.len(), 2);
    }

    #[test]
    fn multiple_hunks_are_counted_together() {
        let diff = "--- a/x\n+++ b/x\n@@ -1,2 +1,2 @@\n-a\n+b\n c\n@@ -10,1 +10,3 @@\n d\n+e\n+f\n";
        let f = parse_patched_file(diff).unwrap();
        assert_eq!(f.hunks.len(), 2);
        assert_eq!((f.added(), f.removed()), (3, 1));
        assert_eq!(
            f.hunks[1].lines[2],
            DiffLine::Added {
                new_line: 12,
                content: "f".into()
            }
        );
    }

    #[test]
    fn empty_line_inside_hunk_is_context() {
        let diff = "--- a/x\n+++ b/x\n@@ -1,3 +1,3 @@\n a\n\n-b\n+c\n";
        let f = parse_patched_file(diff).unwrap();
        assert_eq!(f.hunks[0].lines.len(), 4);
    }

    #[test]
    fn dev_null_and_empty_paths_are_absent() {
        let f = parse_patched_file("--- /dev/null\n+++ b/new.txt\n@@ -0,0 +1 @@\n+hi\n").unwrap();
        assert_eq!(f.source, None);
        assert!(f.is_added_file());

        let f = parse_patched_file("--- a/\n+++ b/\n").unwrap();
        assert_eq!((f.source, f.target), (None, None));
    }

    #[test]
    fn header_timestamps_are_dropped() {
        let f = parse_patched_file("--- a/x.c\t2024-01-01 10:00:00\n+++ b/x.c\t2024-01-02\n")
            .unwrap();
        assert_eq!(f.source.as_deref(), Some("x.c"));
        assert_eq!(f.target.as_deref(), Some("x.c"));
    }

    #[test]
    fn git_extended_headers_set_markers() {
        let diff = "--- a/old.rs\n+++ b/new.rs\ndiff --git a/old.rs b/new.rs\nsimilarity index 100%\nrename from old.rs\nrename to new.rs\n";
        let f = parse_patched_file(diff).unwrap();
        assert_eq!(f.markers.rename_from.as_deref(), Some("old.rs"));
        assert_eq!(f.markers.rename_to.as_deref(), Some("new.rs"));
        assert!(f.is_rename());
        assert!(f.hunks.is_empty());
    }

    #[test]
    fn binary_notice_is_recorded() {
        let f = parse_patched_file("--- a/logo.png\n+++ b/logo.png\nBinary files a/logo.png and b/logo.png differ\n")
            .unwrap();
        assert!(f.markers.binary);
        assert!(f.hunks.is_empty());
    }

    #[test]
    fn rejects_bad_hunk_header() {
        for bad in [
            "@@ -a,b +1,2 @@",
            "@@ -1,2 @@",
            "@@ 1,2 +1,2 @@",
            "@@ -1,2 +1,2",
            "@@ -1,2 +1,x @@",
            "@@@ -1,2 -1,2 +1,3 @@@",
        ] {
            let diff = format!("--- a/x\n+++ b/x\n{bad}\n a\n");
            let err = parse_patched_file(&diff).unwrap_err();
            assert!(
                matches!(err, ParseError::InvalidHunkHeader { line: 3, .. }),
                "{bad}: {err:?}"
            );
        }
    }

    #[test]
    fn rejects_truncated_hunk() {
        let err = parse_patched_file("--- a/x\n+++ b/x\n@@ -1,3 +1,3 @@\n a\n").unwrap_err();
        assert_eq!(err, ParseError::HunkTooShort { line: 4 });
    }

    #[test]
    fn rejects_line_that_overflows_hunk() {
        let err = parse_patched_file("--- a/x\n+++ b/x\n@@ -1,1 +1,2 @@\n-a\n-b\n+c\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedLine { line: 5, .. }));
    }

    #[test]
    fn rejects_content_after_last_hunk() {
        let err = parse_patched_file("--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b\ngarbage\n").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedLine { line: 6, .. }));
    }

    #[test]
    fn rejects_second_file() {
        let diff = "--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b\n--- a/y\n+++ b/y\n";
        let err = parse_patched_file(diff).unwrap_err();
        assert_eq!(err, ParseError::MultipleFiles { line: 6 });
    }

    #[test]
    fn rejects_content_before_first_hunk() {
        for (body, line) in [
            ("-a\n+b\n", 3),
            ("@ -1 +1 @\n-a\n+b\n", 3),
            ("index 1a2b..3c4d 100644\n ctx\n", 4),
        ] {
            let diff = format!("--- a/x\n+++ b/x\n{body}");
            let err = parse_patched_file(&diff).unwrap_err();
            assert!(
                matches!(err, ParseError::UnexpectedLine { line: l, .. } if l == line),
                "{body:?}: {err:?}"
            );
        }
    }

    #[test]
    fn blank_lines_before_first_hunk_are_tolerated() {
        let f = parse_patched_file("--- a/x\n+++ b/x\n\n \n@@ -1 +1 @@\n-a\n+b\n").unwrap();
        assert_eq!(f.hunks.len(), 1);
    }

    #[test]
    fn trailing_blank_line_is_tolerated() {
        let f = parse_patched_file("--- a/x\n+++ b/x\n@@ -1 +1 @@\n-a\n+b\n\n").unwrap();
        assert_eq!(f.hunks.len(), 1);
    }
}
