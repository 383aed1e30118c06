//! Module System Infrastructure
//!
//! This module provides the types that let JSON documents be imported as modules:
//! - `Finder` / `JsonFinder` - Locate `<leaf>.json` across search directories
//! - `Loader` / `JsonLoader` - Two-phase materialize-then-populate loading
//! - `ModuleDescriptor` - Import name paired with its bound loader
//! - `Module` - The resulting attribute namespace
//! - `FinderRegistry` - Ordered, idempotent finder list (plus a process-wide one)
//! - `Importer` - Cache-backed import machinery driving the finders
//! - `ImportOptions` - Search paths and caching, optionally from `jimp.toml`

mod descriptor;
mod finder;
mod importer;
mod loader;
mod module;
mod options;
mod path;
mod registry;

pub use descriptor::ModuleDescriptor;
pub use finder::{Finder, JsonFinder};
pub use importer::{realize, ImportError, ImportResult, Importer};
pub use loader::{JsonLoader, LoadError, LoadResult, Loader, LoaderState, MAX_NESTING_DEPTH};
pub use module::Module;
pub use options::{ImportOptions, CONFIG_FILE_NAME};
pub use path::{candidate_path, default_search_paths, effective_search_paths, leaf_name, JSON_EXTENSION};
pub use registry::{
    append_unguarded, global, install, new_shared_registry, register, FinderId, FinderRegistry,
    Registration, SharedFinderRegistry,
};
