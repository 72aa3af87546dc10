//! Unique target generation.
//!
//! `photo.png` becomes `photo (2).png`, `photo (2).png` becomes
//! `photo (3).png`, and so on until a name is found that neither exists on
//! disk nor is claimed by another pending rename in the batch. Names near
//! the length limit lose characters from the end of the stem so that the
//! counter and extension always fit.

use std::path::Path;

use crate::change::Change;
use crate::error::{Error, Result};
use crate::path;
use crate::platform::Platform;

/// Upper bound on counters tried for a single target.
pub const MAX_TARGET_ATTEMPTS: usize = 10_000;

/// Generate a target for `change` that does not collide with anything.
///
/// `is_claimed` reports whether a full path is already the destination of
/// another rename in the batch. The counter only ever increases; if no free
/// name turns up within [`MAX_TARGET_ATTEMPTS`] the search gives up with
/// [`Error::Unresolvable`].
pub fn new_target(
    change: &Change,
    platform: Platform,
    is_claimed: impl Fn(&Path) -> bool,
) -> Result<String> {
    let name = path::file_name(&change.target, platform);
    let (stem, ext) = path::split_extension(name);

    let (prefix, mut number) = match path::numbered_suffix(stem) {
        Some((prefix, n)) => (prefix.to_string(), n.saturating_add(1)),
        None => (format!("{} ", stem), 2),
    };
    let body = prefix.trim_end_matches(' ');
    let spacer = &prefix[body.len()..];

    let mut candidate = change.target.clone();
    for _ in 0..MAX_TARGET_ATTEMPTS {
        let suffix = format!("{}({}){}", spacer, number, ext);
        let candidate_name = platform.fit_name(body, &suffix);
        candidate = path::with_file_name(&change.target, &candidate_name, platform);
        let candidate_path = change.base_dir.join(&candidate);

        if path::is_free(&candidate_path) && !is_claimed(&candidate_path) {
            return Ok(candidate);
        }
        number = number.saturating_add(1);
    }

    Err(Error::Unresolvable {
        target: change.base_dir.join(candidate),
        attempts: MAX_TARGET_ATTEMPTS,
    })
}
