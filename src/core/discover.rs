use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use anyhow::Result;
use regex::Regex;
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::interrupt;

/// Base name of the directory that marks a repository.
pub const DEFAULT_MARKER_PATTERN: &str = r"^\.git$";

/// Collect every directory below `root` whose base name matches `pattern`.
///
/// The whole tree is walked, so markers nested inside other repositories are
/// found as well. The root itself is never matched. Results are sorted by
/// their byte-wise path string, which fixes the order commands run in.
///
/// A root that does not exist or cannot be read yields no matches.
///
/// # Errors
/// Returns `DeepError::Interrupted` if Ctrl-C is pressed during the walk.
pub fn discover(root: &Path, pattern: &Regex) -> Result<Vec<PathBuf>> {
    let root = strip_trailing_separators(root);
    let mut found = Vec::new();

    for entry in WalkDir::new(&root).min_depth(1).follow_links(false) {
        interrupt::check()?;
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("skipping unreadable entry under {}: {e}", root.display());
                continue;
            }
        };

        // Markers may be symlinks to directories
        let is_dir =
            entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir());
        if !is_dir {
            continue;
        }

        if pattern.is_match(&entry.file_name().to_string_lossy()) {
            trace!("marker {}", entry.path().display());
            found.push(entry.into_path());
        }
    }

    // Byte order of the path string, not component order
    found.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    debug!("found {} marker(s) under {}", found.len(), root.display());
    Ok(found)
}

fn strip_trailing_separators(root: &Path) -> PathBuf {
    let raw = root.to_string_lossy();
    let trimmed = raw.trim_end_matches(MAIN_SEPARATOR);
    if trimmed.is_empty() {
        root.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}
