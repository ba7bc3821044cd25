//! Go-flavoured semantic versions.
//!
//! Versions carry a leading `v` and may be shortened (`v1`, `v1.2`), which
//! canonicalizes to the full `vMAJOR.MINOR.PATCH` form. Build metadata is not
//! part of the canonical form, except `+incompatible` which module versions
//! keep.

use regex::Regex;
use std::sync::LazyLock;

static PSEUDO_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^v[0-9]+\.(0\.0-|\d+\.\d+-([^+]*\.)?0\.)\d{14}-[A-Za-z0-9]+(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$",
    )
    .expect("pseudo-version pattern is valid")
});

#[derive(Debug, Default, PartialEq, Eq)]
struct Parsed<'a> {
    major: &'a str,
    minor: &'a str,
    patch: &'a str,
    /// Missing `.MINOR.PATCH` or `.PATCH` completion for shortened versions.
    short: &'static str,
    prerelease: &'a str,
    build: &'a str,
}

fn parse(v: &str) -> Option<Parsed<'_>> {
    let rest = v.strip_prefix('v')?;
    let mut p = Parsed::default();

    let (major, rest) = parse_int(rest)?;
    p.major = major;
    if rest.is_empty() {
        p.minor = "0";
        p.patch = "0";
        p.short = ".0.0";
        return Some(p);
    }

    let (minor, rest) = parse_int(rest.strip_prefix('.')?)?;
    p.minor = minor;
    if rest.is_empty() {
        p.patch = "0";
        p.short = ".0";
        return Some(p);
    }

    let (patch, mut rest) = parse_int(rest.strip_prefix('.')?)?;
    p.patch = patch;

    if rest.starts_with('-') {
        let (prerelease, tail) = parse_prerelease(rest)?;
        p.prerelease = prerelease;
        rest = tail;
    }
    if rest.starts_with('+') {
        let (build, tail) = parse_build(rest)?;
        p.build = build;
        rest = tail;
    }

    rest.is_empty().then_some(p)
}

fn parse_int(s: &str) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let digits = &s[..end];
    if digits.is_empty() || (digits.len() > 1 && digits.starts_with('0')) {
        return None;
    }
    Some((digits, &s[end..]))
}

/// Splits `-ident(.ident)*` off the front of `s`.
fn parse_prerelease(s: &str) -> Option<(&str, &str)> {
    let end = s[1..].find('+').map_or(s.len(), |i| i + 1);
    let prerelease = &s[..end];
    for ident in prerelease[1..].split('.') {
        if !is_ident(ident) || is_bad_num(ident) {
            return None;
        }
    }
    Some((prerelease, &s[end..]))
}

/// Splits `+ident(.ident)*` off the front of `s`; consumes the rest.
fn parse_build(s: &str) -> Option<(&str, &str)> {
    if s[1..].split('.').all(is_ident) {
        Some((s, ""))
    } else {
        None
    }
}

fn is_ident(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn is_bad_num(s: &str) -> bool {
    s.len() > 1 && s.starts_with('0') && s.chars().all(|c| c.is_ascii_digit())
}

/// Reports whether `v` is a valid semantic version.
pub fn is_valid(v: &str) -> bool {
    parse(v).is_some()
}

/// Returns the canonical `vX.Y.Z[-pre]` form of `v`, or `None` if invalid.
pub fn canonical(v: &str) -> Option<String> {
    let p = parse(v)?;
    if !p.build.is_empty() {
        return Some(v[..v.len() - p.build.len()].to_string());
    }
    Some(format!("{}{}", v, p.short))
}

/// Returns the `vN` major prefix of `v`, or `None` if invalid.
pub fn major(v: &str) -> Option<&str> {
    let p = parse(v)?;
    Some(&v[..1 + p.major.len()])
}

/// Returns the `+build` suffix of `v` (empty when absent), or `None` if invalid.
pub fn build(v: &str) -> Option<&str> {
    parse(v).map(|p| p.build)
}

/// Reports whether `v` looks like a pseudo-version
/// (`vX.0.0-yyyymmddhhmmss-abcdefabcdef` and friends).
pub fn is_pseudo_version(v: &str) -> bool {
    v.matches('-').count() >= 2 && is_valid(v) && PSEUDO_VERSION.is_match(v)
}

/// Canonical form of a module version.
///
/// Pseudo-versions are returned unchanged; `+incompatible` survives
/// canonicalization.
pub fn canonical_module_version(v: &str) -> Option<String> {
    if is_pseudo_version(v) {
        return Some(v.to_string());
    }
    let mut cv = canonical(v)?;
    if build(v) == Some("+incompatible") {
        cv.push_str("+incompatible");
    }
    Some(cv)
}
