//! Best-effort content-type labels derived from file paths.
//!
//! Lookup goes through a small local override map first and falls back to
//! the `mime_guess` extension table. Both are read-only; nothing is ever
//! registered globally. The resulting MIME type is shortened to a bare label
//! (`text/x-toml` -> `toml`) so it can be dropped straight into a prompt as a
//! language hint.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

/// Entries that win over the `mime_guess` table.
const OVERRIDES: &[(&str, &str)] = &[
    (".toml", "text/x-toml"),
    (".yml", "text/x-yaml"),
    (".yaml", "text/x-yaml"),
    (".gitignore", "text/x-sh"),
];

fn overrides() -> &'static HashMap<&'static str, &'static str> {
    static OVERRIDE_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    OVERRIDE_MAP.get_or_init(|| OVERRIDES.iter().copied().collect())
}

struct Rewrites {
    category: Regex,
    vendor: Regex,
    plain: Regex,
}

fn rewrites() -> &'static Rewrites {
    static REWRITES: OnceLock<Rewrites> = OnceLock::new();
    REWRITES.get_or_init(|| Rewrites {
        category: Regex::new(r"^[a-z]+/").expect("valid category regex"),
        vendor: Regex::new(r"^x-").expect("valid vendor regex"),
        plain: Regex::new(r"^plain").expect("valid plain regex"),
    })
}

/// Full MIME type for `path`: local overrides first, then `mime_guess`.
pub fn guess_mime_type(path: &str) -> Option<&'static str> {
    let key = lookup_key(path)?;
    let map = overrides();
    map.get(key)
        .or_else(|| map.get(key.to_ascii_lowercase().as_str()))
        .copied()
        .or_else(|| mime_guess::from_ext(key.trim_start_matches('.')).first_raw())
}

/// Short content-type label for `path`; empty when no type is known.
///
/// Strips the top-level category (`text/`, `application/`, ...), then a
/// leading `x-` vendor marker, then rewrites `plain` to `text`.
pub fn content_type(path: &str) -> String {
    let Some(mime) = guess_mime_type(path) else {
        return String::new();
    };
    let rw = rewrites();
    let label = rw.category.replace(mime, "");
    let label = rw.vendor.replace(&label, "");
    rw.plain.replace(&label, "text").into_owned()
}

/// Table key for a path: the whole name for dotfiles without an extension
/// (`.gitignore`), otherwise the last extension including its dot.
fn lookup_key(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let dot = name.rfind('.')?;
    if dot == 0 {
        return Some(name);
    }
    let ext = &name[dot..];
    if ext.len() == 1 { None } else { Some(ext) }
}
