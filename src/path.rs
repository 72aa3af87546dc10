//! Path and file name utilities for f2

use std::fs;
use std::io;
use std::path::Path;

use crate::platform::Platform;

/// Split a file name into its stem and extension.
///
/// The extension includes the leading dot. A leading dot on its own does not
/// start an extension, so `.bashrc` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// Returns the last segment of a relative target.
pub fn file_name(target: &str, platform: Platform) -> &str {
    let trimmed = target.trim_end_matches(|c| platform.is_separator(c));
    match trimmed.rfind(|c| platform.is_separator(c)) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Replace the last segment of `target` with `name`, keeping its directory.
pub fn with_file_name(target: &str, name: &str, platform: Platform) -> String {
    let trimmed = target.trim_end_matches(|c| platform.is_separator(c));
    match trimmed.rfind(|c| platform.is_separator(c)) {
        Some(idx) => format!("{}{}", &trimmed[..=idx], name),
        None => name.to_string(),
    }
}

/// Extract a trailing `(N)` counter from a file stem.
///
/// Returns the stem up to the opening parenthesis together with `N`, so
/// `"report (3)"` yields `("report ", 3)`.
pub fn numbered_suffix(stem: &str) -> Option<(&str, u64)> {
    let inner = stem.strip_suffix(')')?;
    let open = inner.rfind('(')?;
    let digits = &inner[open + 1..];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number = digits.parse().ok()?;
    Some((&inner[..open], number))
}

/// Whether anything (including a dangling symlink) occupies `path`.
pub fn exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Whether `path` is definitely unoccupied.
///
/// Lookups that fail for any reason other than "not found" (permissions,
/// a file where a directory is expected) count as occupied.
pub fn is_free(path: &Path) -> bool {
    matches!(fs::symlink_metadata(path), Err(e) if e.kind() == io::ErrorKind::NotFound)
}

/// Case-insensitive path comparison.
pub fn eq_ignore_case(a: &Path, b: &Path) -> bool {
    a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
}

/// Encode an absolute path into a single file name.
///
/// Path separators (and drive colons on Windows) are replaced with
/// underscores, e.g. `/home/user/pics` becomes `_home_user_pics`.
pub fn sanitize_key(path: &Path, platform: Platform) -> String {
    path.to_string_lossy()
        .chars()
        .map(|c| match c {
            c if platform.is_separator(c) => '_',
            ':' if platform == Platform::Windows => '_',
            c => c,
        })
        .collect()
}

/// Strip the operation/path prefix from a recorded filesystem error.
///
/// Errors are recorded as `"rename <from> <to>: <reason>"`; only the reason
/// is shown to users.
pub fn display_error(message: &str) -> &str {
    match message.rsplit_once(": ") {
        Some((_, reason)) => reason.trim(),
        None => message.trim(),
    }
}
