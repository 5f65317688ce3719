// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Discovery (§4.3 stage 1): turn a `source_path` into an ordered list of
//! files routed to a parser, plus a skipped list for anything the strategy's
//! filter excludes or that has no matching parser.

use std::path::{Path, PathBuf};

use lf_manifest::{ParserRule, ProcessingStrategy, SymlinkPolicy};
use walkdir::WalkDir;

use crate::job::SkippedEntry;

/// One file routed to a parser, ready for stage 2.
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub parser_rule: ParserRule,
}

/// Walk `source_path` (a file or a directory) and route every entry the
/// strategy's filter admits to a parser by extension. Entries with no
/// matching parser, or that the filter excludes, land in `skipped` instead.
/// Honors the filter's `recursion` flag (immediate children only when
/// `false`) and stops admitting new files once `max_files` is reached.
pub fn discover(
    source_path: &Path,
    strategy: &ProcessingStrategy,
) -> (Vec<DiscoveredFile>, Vec<SkippedEntry>) {
    let mut discovered = Vec::new();
    let mut skipped = Vec::new();

    if source_path.is_file() {
        route_one(source_path, source_path, strategy, &mut discovered, &mut skipped);
        return (discovered, skipped);
    }

    let filter = &strategy.filter;
    let follow_links = filter.symlinks == SymlinkPolicy::Follow;
    let mut walker = WalkDir::new(source_path).follow_links(follow_links);
    if !filter.recursion {
        walker = walker.max_depth(1);
    }
    let mut admitted: usize = 0;
    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                skipped.push(SkippedEntry::new(path, format!("unreadable: {e}")));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_path)
            .unwrap_or(entry.path())
            .to_string_lossy()
            .replace('\\', "/");
        if !filter.matches(&relative) {
            continue;
        }
        if filter.max_files.is_some_and(|max| admitted >= max) {
            break;
        }
        admitted += 1;
        route_one(entry.path(), source_path, strategy, &mut discovered, &mut skipped);
    }

    (discovered, skipped)
}

fn route_one(
    path: &Path,
    base: &Path,
    strategy: &ProcessingStrategy,
    discovered: &mut Vec<DiscoveredFile>,
    skipped: &mut Vec<SkippedEntry>,
) {
    let relative_path = path.strip_prefix(base).unwrap_or(path).to_string_lossy().replace('\\', "/");
    let relative_path = if relative_path.is_empty() {
        path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
    } else {
        relative_path
    };
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match strategy.parser_for(extension) {
        Some(rule) => discovered.push(DiscoveredFile {
            path: path.to_path_buf(),
            relative_path,
            parser_rule: rule.clone(),
        }),
        None => skipped.push(SkippedEntry::new(relative_path, format!("no parser for extension `{extension}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lf_manifest::DirectoryFilter;
    use std::fs;
    use tempfile::TempDir;

    fn strategy_for(extension: &str) -> ProcessingStrategy {
        let parsers = vec![ParserRule {
            parser: "text".into(),
            file_extensions: vec![extension.to_string()],
            options: Default::default(),
            chunk_size: None,
            chunk_overlap: None,
        }];
        ProcessingStrategy { filter: DirectoryFilter::default(), parsers, extractors: vec![] }
    }

    #[test]
    fn single_file_with_matching_parser_is_discovered() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.txt");
        fs::write(&file, b"hello").unwrap();
        let (discovered, skipped) = discover(&file, &strategy_for("txt"));
        assert_eq!(discovered.len(), 1);
        assert!(skipped.is_empty());
    }

    #[test]
    fn file_with_no_matching_parser_is_skipped() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.bin");
        fs::write(&file, b"hello").unwrap();
        let (discovered, skipped) = discover(&file, &strategy_for("txt"));
        assert!(discovered.is_empty());
        assert_eq!(skipped.len(), 1);
    }

    #[test]
    fn directory_walk_honors_exclude_filter() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"keep").unwrap();
        fs::create_dir_all(dir.path().join("tmp")).unwrap();
        fs::write(dir.path().join("tmp/b.txt"), b"drop").unwrap();

        let mut strategy = strategy_for("txt");
        strategy.filter.exclude.push("tmp/**".to_string());
        let (discovered, _skipped) = discover(dir.path(), &strategy);
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].relative_path, "a.txt");
    }

    #[test]
    fn non_recursive_filter_skips_nested_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"top-level").unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/b.txt"), b"nested").unwrap();

        let mut strategy = strategy_for("txt");
        strategy.filter.recursion = false;
        let (discovered, _skipped) = discover(dir.path(), &strategy);
        assert_eq!(discovered.len(), 1);
        assert_eq!(discovered[0].relative_path, "a.txt");
    }

    #[test]
    fn max_files_caps_admitted_files_in_walk_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), b"1").unwrap();
        fs::write(dir.path().join("b.txt"), b"2").unwrap();
        fs::write(dir.path().join("c.txt"), b"3").unwrap();

        let mut strategy = strategy_for("txt");
        strategy.filter.max_files = Some(2);
        let (discovered, _skipped) = discover(dir.path(), &strategy);
        assert_eq!(discovered.len(), 2);
    }
}
