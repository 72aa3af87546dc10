//! # Platform Naming Policy
//!
//! File naming rules differ between operating systems. Instead of branching
//! on the host OS at every check, the conflict engine receives a [`Platform`]
//! chosen once (normally [`Platform::current`]) and asks it three things:
//!
//! - the maximum length of a single file name and how it is measured,
//! - which characters are forbidden in a target,
//! - whether path segments may end in a period.
//!
//! Path separators are never treated as forbidden characters: a `/` in a
//! target intentionally creates subdirectories.

/// Characters Windows rejects in file names, separators excluded.
const WINDOWS_FORBIDDEN: &[char] = &['<', '>', ':', '"', '|', '?', '*'];

/// macOS (Finder) rejects colons.
const MACOS_FORBIDDEN: &[char] = &[':'];

/// Maximum file name length on Windows, in UTF-16 code units.
pub const WINDOWS_MAX_LENGTH: usize = 260;

/// Maximum file name length on Unix-like systems, in bytes.
pub const UNIX_MAX_BYTES: usize = 255;

/// The operating system family whose naming rules apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    MacOs,
    Unix,
}

impl Platform {
    /// The policy for the host operating system.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOs
        } else {
            Platform::Unix
        }
    }

    /// Whether `c` separates path segments in a target.
    pub fn is_separator(self, c: char) -> bool {
        match self {
            Platform::Windows => c == '/' || c == '\\',
            Platform::MacOs | Platform::Unix => c == '/',
        }
    }

    fn forbidden(self) -> &'static [char] {
        match self {
            Platform::Windows => WINDOWS_FORBIDDEN,
            Platform::MacOs => MACOS_FORBIDDEN,
            Platform::Unix => &[],
        }
    }

    /// Forbidden characters present in `target`, in order of appearance.
    pub fn forbidden_chars(self, target: &str) -> Vec<char> {
        let forbidden = self.forbidden();
        target.chars().filter(|c| forbidden.contains(c)).collect()
    }

    /// Remove every forbidden character from `target`.
    pub fn strip_forbidden(self, target: &str) -> String {
        let forbidden = self.forbidden();
        target.chars().filter(|c| !forbidden.contains(c)).collect()
    }

    /// Whether segments ending in `.` are rejected.
    pub fn forbids_trailing_periods(self) -> bool {
        self == Platform::Windows
    }

    /// Whether any segment of `target` ends in a period.
    ///
    /// `.` and `..` segments are navigation, not names, and are ignored.
    pub fn has_trailing_period(self, target: &str) -> bool {
        self.forbids_trailing_periods()
            && target
                .split(|c| self.is_separator(c))
                .any(|segment| !is_navigation(segment) && segment.ends_with('.'))
    }

    /// Strip trailing periods from every segment, keeping separators.
    pub fn strip_trailing_periods(self, target: &str) -> String {
        let mut out = String::with_capacity(target.len());
        for piece in target.split_inclusive(|c| self.is_separator(c)) {
            let (segment, separator) = match piece.chars().last() {
                Some(c) if self.is_separator(c) => piece.split_at(piece.len() - c.len_utf8()),
                _ => (piece, ""),
            };
            if is_navigation(segment) {
                out.push_str(segment);
            } else {
                out.push_str(segment.trim_end_matches('.'));
            }
            out.push_str(separator);
        }
        out
    }

    /// Length of a file name in this platform's unit.
    pub fn name_length(self, name: &str) -> usize {
        match self {
            Platform::Windows => name.encode_utf16().count(),
            Platform::MacOs | Platform::Unix => name.len(),
        }
    }

    /// Maximum file name length in this platform's unit.
    pub fn max_length(self) -> usize {
        match self {
            Platform::Windows => WINDOWS_MAX_LENGTH,
            Platform::MacOs | Platform::Unix => UNIX_MAX_BYTES,
        }
    }

    /// Describe the limit exceeded by `name`, if any.
    pub fn length_violation(self, name: &str) -> Option<String> {
        if self.name_length(name) <= self.max_length() {
            return None;
        }
        Some(match self {
            Platform::Windows => format!("{} characters", WINDOWS_MAX_LENGTH),
            Platform::MacOs | Platform::Unix => format!("{} bytes", UNIX_MAX_BYTES),
        })
    }

    /// Shorten `name` to fit the length limit, keeping its extension.
    ///
    /// Characters are dropped from the end of the stem. When the extension
    /// alone does not fit, the whole name is cut instead.
    pub fn truncate_name(self, name: &str) -> String {
        let (stem, ext) = crate::path::split_extension(name);
        if self.name_length(ext) >= self.max_length() {
            return self.fit_name(name, "");
        }
        self.fit_name(stem, ext)
    }

    /// Join `stem` and `suffix`, dropping characters from the end of the
    /// stem until the result fits the length limit.
    ///
    /// The suffix is always kept whole, so the result only exceeds the limit
    /// when the suffix does on its own.
    pub fn fit_name(self, stem: &str, suffix: &str) -> String {
        let budget = self.max_length().saturating_sub(self.name_length(suffix));

        let mut kept = String::with_capacity(stem.len() + suffix.len());
        let mut used = 0;
        for c in stem.chars() {
            let width = match self {
                Platform::Windows => c.len_utf16(),
                Platform::MacOs | Platform::Unix => c.len_utf8(),
            };
            if used + width > budget {
                break;
            }
            used += width;
            kept.push(c);
        }
        kept.push_str(suffix);
        kept
    }
}

fn is_navigation(segment: &str) -> bool {
    segment == "." || segment == ".."
}
