// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2026 LlamaFarm Contributors

//! Path normalization for the Result Store's on-disk identifier.
//!
//! Most platforms address the store by a plain directory path. Some callers
//! (config loaders, cross-platform log lines) want a URL-form identifier
//! instead; on Windows that means drive letters and backslashes need
//! normalizing to the `file:///<letter>:/...` form rename semantics expect.

use std::path::{Path, PathBuf};

/// Render `path` as a `file://` URL, normalizing backslashes to forward
/// slashes and prefixing a bare Windows drive letter (`C:\...`) with the
/// extra slash `file:///C:/...` needs.
pub fn to_file_url(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    if is_drive_letter_path(&raw) {
        format!("file:///{raw}")
    } else if raw.starts_with('/') {
        format!("file://{raw}")
    } else {
        format!("file:///{raw}")
    }
}

/// Parse a `file://` URL (as produced by [`to_file_url`]) back into a
/// filesystem path usable with `std::fs`.
pub fn from_file_url(url: &str) -> PathBuf {
    let stripped = url.strip_prefix("file://").unwrap_or(url);
    let stripped = stripped.strip_prefix('/').filter(|s| is_drive_letter_path(s)).unwrap_or(stripped);
    PathBuf::from(stripped)
}

fn is_drive_letter_path(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
