//! Slash-delimited path handling for the namespace.
//!
//! Everything here is pure string logic; no lookups against the store.

use crate::{AnonfsError, Result};

/// Full path of the root directory.
pub const ROOT: &str = "/";

/// Canonicalize a path.
///
/// A missing leading slash is added and a single trailing slash is dropped.
/// Empty interior segments (`a//b`) and `.`/`..` segments are rejected.
pub fn normalize(path: &str) -> Result<String> {
    if path.is_empty() || path == ROOT {
        return Ok(ROOT.to_string());
    }

    let body = path.strip_prefix('/').unwrap_or(path);
    let body = body.strip_suffix('/').unwrap_or(body);
    if body.is_empty() {
        return Err(AnonfsError::InvalidPath(path.to_string()));
    }

    for segment in body.split('/') {
        check_segment(segment).map_err(|_| AnonfsError::InvalidPath(path.to_string()))?;
    }

    Ok(format!("/{body}"))
}

/// Split a path into `(parent_path, leaf_name)`.
///
/// The root resolves to itself with an empty leaf. A trailing slash on any
/// other path means an empty leaf and is rejected.
pub fn resolve(path: &str) -> Result<(String, String)> {
    if path != ROOT && path.ends_with('/') {
        return Err(AnonfsError::InvalidPath(path.to_string()));
    }

    let canonical = normalize(path)?;
    if canonical == ROOT {
        return Ok((ROOT.to_string(), String::new()));
    }

    // `canonical` always starts with '/', so there is at least one separator.
    let idx = canonical.rfind('/').unwrap_or(0);
    let parent = if idx == 0 { ROOT } else { &canonical[..idx] };
    Ok((parent.to_string(), canonical[idx + 1..].to_string()))
}

/// Build the full path of `name` inside `parent`.
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

/// Validate a single leaf name.
pub fn validate_name(name: &str) -> Result<()> {
    check_segment(name).map_err(AnonfsError::InvalidPath)
}

fn check_segment(segment: &str) -> std::result::Result<(), String> {
    if segment.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if segment == "." || segment == ".." {
        return Err(format!("reserved name: {segment}"));
    }
    if segment.contains('/') {
        return Err(format!("name must not contain '/': {segment}"));
    }
    if segment.chars().any(char::is_control) {
        return Err(format!("name contains control characters: {segment:?}"));
    }
    Ok(())
}

/// True when `path` lies strictly below `ancestor`.
pub fn is_descendant(path: &str, ancestor: &str) -> bool {
    if ancestor == ROOT {
        return path != ROOT && path.starts_with('/');
    }
    path.len() > ancestor.len() + 1
        && path.starts_with(ancestor)
        && path.as_bytes()[ancestor.len()] == b'/'
}

/// Half-open key range `[low, high)` covering every strict descendant of `path`.
///
/// Every descendant starts with `path/`; `'0'` is the byte right after `'/'`,
/// so `path0` bounds the range under binary collation.
pub fn descendant_range(path: &str) -> (String, String) {
    if path == ROOT {
        return ("/".to_string(), "0".to_string());
    }
    (format!("{path}/"), format!("{path}0"))
}
