//! Module Finders
//!
//! A finder decides whether an import name can be served and, if so, returns
//! a `ModuleDescriptor` with a loader bound to the located resource. Finders
//! are consulted in registration order by the `FinderRegistry`.
//!
//! `JsonFinder` probes each search directory for `<leaf>.json`:
//!
//! ```text
//! find_spec("pkg.sub.users", [d1, d2])
//!   ├── d1/users.json  (missing, keep going)
//!   └── d2/users.json  (exists, bind JsonLoader, stop)
//! ```

use std::path::PathBuf;

use tracing::{debug, trace};

use super::descriptor::ModuleDescriptor;
use super::loader::JsonLoader;
use super::path::{candidate_path, effective_search_paths};

/// A strategy for locating modules.
pub trait Finder: Send + Sync {
    /// Identity used to keep a finder from being registered twice.
    fn key(&self) -> &str;

    /// Locate `name`, probing `search_paths` (or the finder's defaults when
    /// `None` or empty).
    ///
    /// Returns `None` on a miss so the next finder can try. Must not read
    /// the resource; that is the loader's job.
    fn find_spec(&self, name: &str, search_paths: Option<&[PathBuf]>) -> Option<ModuleDescriptor>;
}

/// Finds `<leaf>.json` files and binds a `JsonLoader` to the first one found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JsonFinder;

impl JsonFinder {
    /// Registry key shared by every `JsonFinder`.
    pub const KEY: &'static str = "jimp.json";

    /// Create a new finder.
    pub fn new() -> Self {
        Self
    }
}

impl Finder for JsonFinder {
    fn key(&self) -> &str {
        Self::KEY
    }

    fn find_spec(&self, name: &str, search_paths: Option<&[PathBuf]>) -> Option<ModuleDescriptor> {
        for dir in effective_search_paths(search_paths) {
            let candidate = candidate_path(&dir, name);
            trace!(module = name, candidate = %candidate.display(), "probing");
            if candidate.exists() {
                debug!(module = name, path = %candidate.display(), "json module found");
                return Some(ModuleDescriptor::new(
                    name,
                    Box::new(JsonLoader::new(candidate)),
                ));
            }
        }

        debug!(module = name, "no json module found");
        None
    }
}
