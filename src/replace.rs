//! # Find and Replace
//!
//! A [`Replacer`] is a chain of find/replace stages. The first stage decides
//! which candidates match at all; every stage then rewrites the name produced
//! by the previous one. Once the chain has run, each change's `source` is
//! its original name again and `target` holds the final result.

use regex::{Captures, Regex};

use crate::change::Change;
use crate::error::{Error, Result};
use crate::path::split_extension;

/// Pattern used when a stage has no find pattern of its own.
const WHOLE_NAME: &str = "^.*$";

/// User-supplied find/replace settings.
#[derive(Debug, Clone, Default)]
pub struct ReplaceOptions {
    pub find: Vec<String>,
    pub replace: Vec<String>,
    /// Treat find patterns as literal strings.
    pub string_mode: bool,
    pub ignore_case: bool,
    /// Leave file extensions out of matching and replacement.
    pub ignore_ext: bool,
    /// Replace only the first `n` matches, or the last `-n` when negative.
    /// `0` replaces every match.
    pub replace_limit: i64,
    pub exclude: Vec<String>,
}

#[derive(Debug)]
struct Stage {
    find: Regex,
    replacement: String,
}

/// A compiled find/replace chain.
#[derive(Debug)]
pub struct Replacer {
    stages: Vec<Stage>,
    exclude: Option<Regex>,
    ignore_ext: bool,
    limit: i64,
}

impl Replacer {
    pub fn new(options: &ReplaceOptions) -> Result<Self> {
        let count = options.find.len().max(options.replace.len()).max(1);

        let stages = (0..count)
            .map(|index| -> Result<Stage> {
                let find = match options.find.get(index) {
                    Some(pattern) if !pattern.is_empty() => {
                        compile_find(pattern, options.string_mode, options.ignore_case)?
                    }
                    _ => Regex::new(WHOLE_NAME)?,
                };
                let replacement = options.replace.get(index).cloned().unwrap_or_default();
                Ok(Stage { find, replacement })
            })
            .collect::<Result<Vec<_>>>()?;

        let exclude = if options.exclude.is_empty() {
            None
        } else {
            Some(Regex::new(&options.exclude.join("|"))?)
        };

        Ok(Self {
            stages,
            exclude,
            ignore_ext: options.ignore_ext,
            limit: options.replace_limit,
        })
    }

    /// Whether the first stage matches `change` and no exclude pattern does.
    pub fn is_match(&self, change: &Change) -> bool {
        if self
            .exclude
            .as_ref()
            .is_some_and(|exclude| exclude.is_match(&change.source))
        {
            return false;
        }

        self.stages
            .first()
            .is_some_and(|stage| stage.find.is_match(self.searchable(&change.source, change.is_dir)))
    }

    /// Keep the matching candidates and compute their targets.
    pub fn apply(&self, candidates: Vec<Change>) -> Vec<Change> {
        candidates
            .into_iter()
            .filter(|change| self.is_match(change))
            .map(|change| self.rename(change))
            .collect()
    }

    fn rename(&self, mut change: Change) -> Change {
        let last = self.stages.len().saturating_sub(1);

        for (index, stage) in self.stages.iter().enumerate() {
            change.target = self.replace_once(stage, &change.source, change.is_dir);
            if index != last {
                change.source = change.target.clone();
            }
        }

        change.source = change.original_source().to_string();
        change
    }

    fn replace_once(&self, stage: &Stage, name: &str, is_dir: bool) -> String {
        let (stem, ext) = if self.ignore_ext && !is_dir {
            split_extension(name)
        } else {
            (name, "")
        };

        let mut replaced = replace_limited(&stage.find, stem, &stage.replacement, self.limit);
        replaced.push_str(ext);
        replaced
    }

    fn searchable<'a>(&self, name: &'a str, is_dir: bool) -> &'a str {
        if self.ignore_ext && !is_dir {
            split_extension(name).0
        } else {
            name
        }
    }
}

fn compile_find(pattern: &str, string_mode: bool, ignore_case: bool) -> Result<Regex> {
    let mut pattern = if string_mode {
        regex::escape(pattern)
    } else {
        pattern.to_string()
    };
    if ignore_case {
        pattern.insert_str(0, "(?i)");
    }

    Regex::new(&pattern).map_err(|e| Error::InvalidArgument {
        message: format!("find pattern '{}' is not a valid regular expression: {}", pattern, e),
    })
}

/// Replace matches of `find` in `name`, expanding capture references in
/// `replacement`. See [`ReplaceOptions::replace_limit`] for `limit`.
fn replace_limited(find: &Regex, name: &str, replacement: &str, limit: i64) -> String {
    let matches: Vec<Captures<'_>> = find.captures_iter(name).collect();

    let skip = if limit < 0 {
        let from_end = usize::try_from(limit.unsigned_abs()).unwrap_or(usize::MAX);
        matches.len().saturating_sub(from_end)
    } else {
        0
    };
    let take = if limit > 0 {
        usize::try_from(limit).unwrap_or(usize::MAX)
    } else {
        usize::MAX
    };

    let mut out = String::with_capacity(name.len());
    let mut last = 0;
    for caps in matches.iter().skip(skip).take(take) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&name[last..whole.start()]);
        caps.expand(replacement, &mut out);
        last = whole.end();
    }
    out.push_str(&name[last..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(find: &[&str], replace: &[&str]) -> ReplaceOptions {
        ReplaceOptions {
            find: find.iter().map(|s| s.to_string()).collect(),
            replace: replace.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn rename(options: &ReplaceOptions, source: &str) -> Option<String> {
        let replacer = Replacer::new(options).unwrap();
        replacer
            .apply(vec![Change::new(".", source, false)])
            .pop()
            .map(|change| change.target)
    }

    #[test]
    fn test_simple_replacement() {
        let opts = options(&["jpeg"], &["jpg"]);
        assert_eq!(rename(&opts, "photo.jpeg").as_deref(), Some("photo.jpg"));
    }

    #[test]
    fn test_non_matching_candidates_are_dropped() {
        let opts = options(&["jpeg"], &["jpg"]);
        assert_eq!(rename(&opts, "notes.txt"), None);
    }

    #[test]
    fn test_capture_expansion() {
        let opts = options(&[r"(\w+)-(\d+)"], &["${2}_$1"]);
        assert_eq!(rename(&opts, "photo-42.png").as_deref(), Some("42_photo.png"));

        let opts = options(&[r"(?P<year>\d{4})-(?P<rest>.*)"], &["${year}/${rest}"]);
        assert_eq!(rename(&opts, "2021-trip.jpg").as_deref(), Some("2021/trip.jpg"));
    }

    #[test]
    fn test_missing_find_matches_whole_name() {
        let opts = options(&[], &["renamed.txt"]);
        assert_eq!(rename(&opts, "anything.md").as_deref(), Some("renamed.txt"));

        let opts = options(&[""], &["x"]);
        assert_eq!(rename(&opts, "abc").as_deref(), Some("x"));
    }

    #[test]
    fn test_missing_replacement_deletes_match() {
        let opts = options(&["-draft"], &[]);
        assert_eq!(rename(&opts, "essay-draft.md").as_deref(), Some("essay.md"));
    }

    #[test]
    fn test_string_mode_escapes_pattern() {
        let mut opts = options(&["(1)"], &["one"]);
        opts.string_mode = true;
        assert_eq!(rename(&opts, "file (1).txt").as_deref(), Some("file one.txt"));
    }

    #[test]
    fn test_ignore_case() {
        let mut opts = options(&["JPG"], &["png"]);
        assert_eq!(rename(&opts, "a.jpg"), None);
        opts.ignore_case = true;
        assert_eq!(rename(&opts, "a.jpg").as_deref(), Some("a.png"));
    }

    #[test]
    fn test_ignore_ext() {
        let mut opts = options(&["txt"], &["md"]);
        opts.ignore_ext = true;
        assert_eq!(rename(&opts, "txt.txt").as_deref(), Some("md.txt"));
        // Only the extension would match, so the file is not a candidate
        assert_eq!(rename(&opts, "notes.txt"), None);
    }

    #[test]
    fn test_ignore_ext_keeps_directory_names_whole() {
        let mut opts = options(&["v1.0"], &["v2.0"]);
        opts.ignore_ext = true;
        let replacer = Replacer::new(&opts).unwrap();
        let changes = replacer.apply(vec![Change::new(".", "release-v1.0", true)]);
        assert_eq!(changes[0].target, "release-v2.0");
    }

    #[test]
    fn test_replace_limit() {
        let mut opts = options(&["a"], &["b"]);
        opts.replace_limit = 2;
        assert_eq!(rename(&opts, "aaaa").as_deref(), Some("bbaa"));

        opts.replace_limit = -1;
        assert_eq!(rename(&opts, "aaaa").as_deref(), Some("aaab"));

        opts.replace_limit = -10;
        assert_eq!(rename(&opts, "aaaa").as_deref(), Some("bbbb"));

        opts.replace_limit = 0;
        assert_eq!(rename(&opts, "aaaa").as_deref(), Some("bbbb"));
    }

    #[test]
    fn test_chained_stages() {
        let opts = options(&["Screenshot", " "], &["shot", "_"]);
        let replacer = Replacer::new(&opts).unwrap();
        let changes = replacer.apply(vec![Change::new(".", "Screenshot from today.png", false)]);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].target, "shot_from_today.png");
        assert_eq!(changes[0].source, "Screenshot from today.png");
    }

    #[test]
    fn test_chain_only_filters_on_first_stage() {
        // The second pattern does not appear in the original name
        let opts = options(&["a", "bb"], &["bb", "c"]);
        assert_eq!(rename(&opts, "xa.txt").as_deref(), Some("xc.txt"));
    }

    #[test]
    fn test_exclude() {
        let mut opts = options(&["txt"], &["md"]);
        opts.exclude = vec!["^keep".to_string(), "draft".to_string()];
        let replacer = Replacer::new(&opts).unwrap();
        let changes = replacer.apply(vec![
            Change::new(".", "keep.txt", false),
            Change::new(".", "a-draft.txt", false),
            Change::new(".", "notes.txt", false),
        ]);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].target, "notes.md");
    }

    #[test]
    fn test_invalid_pattern() {
        let opts = options(&["(unclosed"], &["x"]);
        let err = Replacer::new(&opts).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }
}
