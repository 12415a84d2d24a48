use anyhow::{Context, Result};
use git2::Config;
use regex::Regex;
use tracing::debug;

use crate::core::discover::DEFAULT_MARKER_PATTERN;

/// gitdeep settings sourced from git config.
#[derive(Debug, Clone)]
pub struct DeepConfig {
    /// Regex matched against directory base names to find repositories.
    pub marker_pattern: String,
    /// Version-control executable invoked in each repository.
    pub program: String,
    /// Print the per-repository banner (path and size).
    pub banner: bool,
}

impl Default for DeepConfig {
    fn default() -> Self {
        Self {
            marker_pattern: DEFAULT_MARKER_PATTERN.to_string(),
            program: "git".to_string(),
            banner: true,
        }
    }
}

impl DeepConfig {
    /// Load configuration from the global, XDG and system git config files.
    /// Falls back to defaults when no git config can be opened.
    ///
    /// # Errors
    /// Returns an error if `gitdeep.pattern` is not a valid regex.
    pub fn load() -> Result<Self> {
        match Config::open_default() {
            Ok(cfg) => Self::from_git_config(&cfg),
            Err(e) => {
                debug!("no git config available, using defaults: {e}");
                Ok(Self::default())
            }
        }
    }

    /// Read `gitdeep.*` keys from an opened git config.
    ///
    /// # Errors
    /// Returns an error if `gitdeep.pattern` is not a valid regex.
    pub fn from_git_config(cfg: &Config) -> Result<Self> {
        let mut out = Self::default();

        // Validate the pattern now so a bad value fails before any walk
        if let Ok(pattern) = cfg.get_string("gitdeep.pattern") {
            out.marker_pattern = pattern;
            out.marker_regex()?;
        }
        // Blank program falls back to git
        if let Ok(program) = cfg.get_string("gitdeep.program")
            && !program.trim().is_empty()
        {
            out.program = program;
        }
        if let Ok(banner) = cfg.get_bool("gitdeep.banner") {
            out.banner = banner;
        }

        Ok(out)
    }

    /// Compile the marker pattern.
    ///
    /// # Errors
    /// Returns an error if the pattern is not a valid regex.
    pub fn marker_regex(&self) -> Result<Regex> {
        Regex::new(&self.marker_pattern)
            .with_context(|| format!("invalid gitdeep.pattern: {}", self.marker_pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn defaults_without_keys() {
        let td = tempdir().unwrap();
        let path = td.path().join("config");
        fs::write(&path, "[core]\n\tbare = false\n").unwrap();

        let cfg = DeepConfig::from_git_config(&Config::open(&path).unwrap()).unwrap();
        assert_eq!(cfg.marker_pattern, DEFAULT_MARKER_PATTERN);
        assert_eq!(cfg.program, "git");
        assert!(cfg.banner);
    }

    #[test]
    fn reads_gitdeep_keys() {
        let td = tempdir().unwrap();
        let path = td.path().join("config");
        fs::write(
            &path,
            "[gitdeep]\n\tpattern = ^\\\\.(git|hg)$\n\tprogram = /usr/local/bin/git\n\tbanner = false\n",
        )
        .unwrap();

        let cfg = DeepConfig::from_git_config(&Config::open(&path).unwrap()).unwrap();
        let re = cfg.marker_regex().unwrap();
        assert!(re.is_match(".hg"));
        assert!(!re.is_match(".svn"));
        assert_eq!(cfg.program, "/usr/local/bin/git");
        assert!(!cfg.banner);
    }

    #[test]
    fn rejects_invalid_pattern() {
        let td = tempdir().unwrap();
        let path = td.path().join("config");
        fs::write(&path, "[gitdeep]\n\tpattern = (unclosed\n").unwrap();

        let err = DeepConfig::from_git_config(&Config::open(&path).unwrap()).unwrap_err();
        assert!(err.to_string().contains("invalid gitdeep.pattern"));
    }
}
