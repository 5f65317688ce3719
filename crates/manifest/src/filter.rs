// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Directory walk filtering for a [`crate::ProcessingStrategy`].

use regex::Regex;
use serde::{Deserialize, Serialize};

/// How the discovery stage should handle symlinks it encounters while
/// walking a dataset's paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymlinkPolicy {
    /// Don't descend into or follow symlinks.
    #[default]
    Skip,
    /// Follow symlinks as if they were the files/directories they point to.
    Follow,
}

fn default_recursion() -> bool {
    true
}

/// Include/exclude rules applied while walking a dataset's configured paths
/// (spec §4.3 stage 1's five-component filter).
///
/// Patterns are glob-style (`*.pdf`, `**/drafts/**`); `exclude` is applied
/// after `include` and always wins on conflict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryFilter {
    /// Descend into subdirectories. `false` walks only the immediate
    /// contents of the dataset's configured path.
    #[serde(default = "default_recursion")]
    pub recursion: bool,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Stop discovery after this many files have been admitted by the
    /// filter, in walk order. `None` means unbounded.
    #[serde(default)]
    pub max_files: Option<usize>,
    #[serde(default)]
    pub symlinks: SymlinkPolicy,
}

impl Default for DirectoryFilter {
    fn default() -> Self {
        Self { recursion: true, include: Vec::new(), exclude: Vec::new(), max_files: None, symlinks: SymlinkPolicy::default() }
    }
}

impl DirectoryFilter {
    /// Whether `relative_path` (forward-slash separated, relative to the
    /// dataset root) should be processed under this filter. Does not apply
    /// `recursion` or `max_files`, which are structural walk controls the
    /// caller applies separately (see `lf_pipeline::discovery::discover`).
    pub fn matches(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|pat| glob_match(pat, relative_path));
        if !included {
            return false;
        }
        !self.exclude.iter().any(|pat| glob_match(pat, relative_path))
    }
}

/// Minimal glob matcher supporting `*`, `**`, and literal segments, enough
/// for the include/exclude patterns a manifest can express. `**` matches
/// across path separators; `*` does not.
fn glob_match(pattern: &str, path: &str) -> bool {
    let regex_str = glob_to_regex(pattern);
    Regex::new(&regex_str).map(|re| re.is_match(path)).unwrap_or(false)
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    out.push_str(".*");
                } else {
                    out.push_str("[^/]*");
                }
            }
            '.' | '(' | ')' | '+' | '|' | '^' | '$' => {
                out.push('\\');
                out.push(c);
            }
            '?' => out.push_str("[^/]"),
            other => out.push(other),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_includes_everything() {
        let filter = DirectoryFilter::default();
        assert!(filter.matches("docs/readme.md"));
    }

    #[test]
    fn include_restricts_to_matching_patterns() {
        let filter = DirectoryFilter {
            include: vec!["*.pdf".into()],
            ..Default::default()
        };
        assert!(!filter.matches("notes.txt"));
    }

    #[test]
    fn double_star_crosses_directory_boundaries() {
        let filter = DirectoryFilter {
            include: vec!["**/drafts/**".into()],
            ..Default::default()
        };
        assert!(filter.matches("a/b/drafts/c/d.md"));
    }

    #[test]
    fn exclude_wins_over_include() {
        let filter = DirectoryFilter {
            include: vec!["**".into()],
            exclude: vec!["**/tmp/**".into()],
            ..Default::default()
        };
        assert!(!filter.matches("a/tmp/b.md"));
    }

    #[test]
    fn symlink_policy_defaults_to_skip() {
        assert_eq!(DirectoryFilter::default().symlinks, SymlinkPolicy::Skip);
    }

    #[test]
    fn recursion_and_max_files_default_to_unbounded_recursive() {
        let filter = DirectoryFilter::default();
        assert!(filter.recursion);
        assert_eq!(filter.max_files, None);
    }

    #[test]
    fn recursion_and_max_files_parse_from_yaml() {
        let filter: DirectoryFilter = serde_yaml::from_str("recursion: false\nmax_files: 10\n").unwrap();
        assert!(!filter.recursion);
        assert_eq!(filter.max_files, Some(10));
    }
}
