//! Module path validation rules.
//!
//! Pure functions with no I/O or side effects. Validation failures carry a
//! short reason; callers attach the offending input.

use crate::module::semver;

const BAD_WINDOWS_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Validates a module path.
///
/// ## Rules
/// - Non-empty, no leading dash or slash, no `//`, no trailing slash
/// - First element contains a dot and only `[a-z0-9.-]`
/// - Every element passes [`check_elem`]
/// - A trailing major-version suffix is well formed (`/v2`, never `/v1` or `/v0`)
pub fn check_path(path: &str) -> Result<(), String> {
    check_path_elems(path)?;

    let first_end = path.find('/').unwrap_or(path.len());
    let first = &path[..first_end];
    if !first.contains('.') {
        return Err("missing dot in first path element".to_string());
    }
    if first.starts_with('-') {
        return Err("leading dash in first path element".to_string());
    }
    if let Some(c) = first
        .chars()
        .find(|&c| !(c == '-' || c == '.' || c.is_ascii_digit() || c.is_ascii_lowercase()))
    {
        return Err(format!("invalid char '{}' in first path element", c));
    }

    if split_path_version(path).is_none() {
        return Err("invalid version".to_string());
    }

    Ok(())
}

fn check_path_elems(path: &str) -> Result<(), String> {
    if path.is_empty() {
        return Err("empty string".to_string());
    }
    if path.starts_with('-') {
        return Err("leading dash".to_string());
    }
    if path.starts_with('/') {
        return Err("leading slash".to_string());
    }
    if path.contains("//") {
        return Err("double slash".to_string());
    }
    if path.ends_with('/') {
        return Err("trailing slash".to_string());
    }
    for elem in path.split('/') {
        check_elem(elem)?;
    }
    Ok(())
}

/// Validates a single `/`-separated element of a module path.
pub fn check_elem(elem: &str) -> Result<(), String> {
    if elem.is_empty() {
        return Err("empty path element".to_string());
    }
    if elem.chars().all(|c| c == '.') {
        return Err(format!("invalid path element '{}'", elem));
    }
    if elem.starts_with('.') {
        return Err(format!("leading dot in path element '{}'", elem));
    }
    if let Some(c) = elem.chars().find(|&c| !is_mod_path_char(c)) {
        return Err(format!("invalid char '{}'", c));
    }
    if elem.ends_with('.') {
        return Err(format!("trailing dot in path element '{}'", elem));
    }

    // Windows disallows a bad name as the part before the first dot.
    let short = elem.split('.').next().unwrap_or(elem);
    if BAD_WINDOWS_NAMES
        .iter()
        .any(|bad| bad.eq_ignore_ascii_case(short))
    {
        return Err(format!("disallowed path element '{}'", elem));
    }

    // Windows 8.3 short names: NAME~1.
    if let Some(tilde) = short.rfind('~') {
        let suffix = &short[tilde + 1..];
        if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!(
                "trailing tilde and digits in path element '{}'",
                elem
            ));
        }
    }

    Ok(())
}

fn is_mod_path_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~')
}

/// Splits a module path into `(prefix, path_major)`.
///
/// `path_major` is the trailing `/vN` (or `.vN` for `gopkg.in`) and is empty
/// when the path has no major-version suffix. Returns `None` when the suffix
/// is malformed (`/v1`, `/v0`, `/v02`, `/v2.0`).
pub fn split_path_version(path: &str) -> Option<(&str, &str)> {
    if path.starts_with("gopkg.in/") {
        return split_gopkg_in(path);
    }

    let bytes = path.as_bytes();
    let mut i = bytes.len();
    let mut dot = false;
    while i > 0 && (bytes[i - 1].is_ascii_digit() || bytes[i - 1] == b'.') {
        if bytes[i - 1] == b'.' {
            dot = true;
        }
        i -= 1;
    }
    if i <= 1 || i == bytes.len() || bytes[i - 1] != b'v' || bytes[i - 2] != b'/' {
        return Some((path, ""));
    }

    let (prefix, path_major) = path.split_at(i - 2);
    if dot || path_major.len() <= 2 || path_major.as_bytes()[2] == b'0' || path_major == "/v1" {
        return None;
    }
    Some((prefix, path_major))
}

fn split_gopkg_in(path: &str) -> Option<(&str, &str)> {
    let bytes = path.as_bytes();
    let mut i = bytes.len();
    if path.ends_with("-unstable") {
        i -= "-unstable".len();
    }
    while i > 0 && bytes[i - 1].is_ascii_digit() {
        i -= 1;
    }
    if i <= 1 || bytes[i - 1] != b'v' || bytes[i - 2] != b'.' {
        // gopkg.in paths always end in .vN
        return None;
    }

    let (prefix, path_major) = path.split_at(i - 2);
    if path_major.len() <= 2 || (path_major.as_bytes()[2] == b'0' && path_major != ".v0") {
        return None;
    }
    Some((prefix, path_major))
}

/// Strips the major-version suffix, if any. Malformed suffixes are kept.
pub fn strip_major(path: &str) -> &str {
    split_path_version(path).map_or(path, |(prefix, _)| prefix)
}

/// Checks that version `v` is allowed for a path ending in `path_major`.
pub fn check_path_major(v: &str, path_major: &str) -> Result<(), String> {
    let path_major = if path_major.starts_with(".v") {
        path_major.trim_end_matches("-unstable")
    } else {
        path_major
    };
    // Old pseudo-versions for gopkg.in .v1 used v0.0.0.
    if v.starts_with("v0.0.0-") && path_major == ".v1" {
        return Ok(());
    }

    let major = semver::major(v).unwrap_or("");
    let expected = if path_major.is_empty() {
        if major == "v0" || major == "v1" || semver::build(v) == Some("+incompatible") {
            return Ok(());
        }
        "v0 or v1"
    } else {
        let want = &path_major[1..];
        if major == want {
            return Ok(());
        }
        want
    };

    Err(format!("should be {}, not {}", expected, major))
}
