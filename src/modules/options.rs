//! Import Configuration
//!
//! Options for the `Importer`, either built in code or read from a
//! `jimp.toml` file:
//!
//! ```toml
//! [import]
//! search_paths = ["data", "/etc/app/defaults"]
//! cache_modules = true
//! ```
//!
//! Relative search paths in `jimp.toml` are resolved against the directory
//! holding the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

/// File name looked up by `ImportOptions::load`.
pub const CONFIG_FILE_NAME: &str = "jimp.toml";

/// Import behavior options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    /// Directories searched for top-level imports.
    /// Default: empty (the current working directory is searched).
    pub search_paths: Vec<PathBuf>,

    /// Keep imported modules in the importer's cache.
    /// Default: true.
    pub cache_modules: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            search_paths: Vec::new(),
            cache_modules: true,
        }
    }
}

/// Layout of `jimp.toml`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    import: ImportOptions,
}

impl ImportOptions {
    /// Create options that search the given directories.
    pub fn with_search_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            search_paths: paths.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Disable the module cache; every import re-reads its file.
    pub fn without_cache(mut self) -> Self {
        self.cache_modules = false;
        self
    }

    /// Parse options from `jimp.toml` content.
    pub fn parse_toml(content: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(content)?;
        Ok(file.import)
    }

    /// Load options from `dir/jimp.toml`.
    ///
    /// Returns `None` if the file is missing, unreadable, or malformed.
    pub fn load(dir: &Path) -> Option<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return None;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read import config");
                return None;
            }
        };

        match Self::parse_toml(&content) {
            Ok(options) => Some(options.relative_to(dir)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not parse import config");
                None
            }
        }
    }

    /// Resolve relative search paths against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        for path in &mut self.search_paths {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }

    /// Search paths as the finders expect them (`None` when unset).
    pub fn search_paths(&self) -> Option<&[PathBuf]> {
        if self.search_paths.is_empty() {
            None
        } else {
            Some(&self.search_paths)
        }
    }
}
