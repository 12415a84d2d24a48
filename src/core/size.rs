use std::path::Path;

use anyhow::Result;
use tracing::debug;
use walkdir::WalkDir;

use super::interrupt;

/// Symbol table used by [`format_bytes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symbols {
    /// `B`, `K`, `M`, ...
    #[default]
    Short,
    /// `byte`, `kilo`, `mega`, ...
    Long,
}

const SHORT: [&str; 9] = ["B", "K", "M", "G", "T", "P", "E", "Z", "Y"];
const LONG: [&str; 9] = [
    "byte", "kilo", "mega", "giga", "tera", "peta", "exa", "zetta", "yotta",
];

impl Symbols {
    const fn table(self) -> &'static [&'static str; 9] {
        match self {
            Self::Short => &SHORT,
            Self::Long => &LONG,
        }
    }
}

/// Sum the sizes of all regular files below `path`.
///
/// Symbolic links are neither followed nor counted, so linked cycles cannot
/// keep the walk going. Entries that cannot be read are skipped.
///
/// # Errors
/// Returns `DeepError::Interrupted` if Ctrl-C is pressed during the walk.
pub fn directory_size(path: &Path) -> Result<u64> {
    let mut total = 0u64;
    for entry in WalkDir::new(path).follow_links(false) {
        interrupt::check()?;
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("skipping unreadable entry: {e}");
                continue;
            }
        };
        // Regular files only; links and special files add nothing
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.metadata() {
            Ok(meta) => total += meta.len(),
            Err(e) => debug!("no metadata for {}: {e}", entry.path().display()),
        }
    }
    Ok(total)
}

/// Render a byte count with 1024-based units and no decimals, e.g. `"2 K"`.
#[must_use]
pub fn format_bytes(bytes: u64, symbols: Symbols) -> String {
    let table = symbols.table();
    for (rank, symbol) in table.iter().enumerate().skip(1).rev() {
        let base = 1u128 << (10 * rank);
        if u128::from(bytes) >= base {
            #[allow(clippy::cast_precision_loss)]
            let value = bytes as f64 / base as f64;
            return format!("{value:.0} {symbol}");
        }
    }
    // Below 1024: raw count
    format!("{bytes} {}", table[0])
}
