//! Import Machinery
//!
//! The `Importer` plays the runtime's part of an import statement:
//!
//! ```text
//! import("pkg.users")
//!   ├── module cache hit?  -> return cached module
//!   ├── FinderRegistry::find(name, search paths)
//!   │     └── miss         -> ImportError::NotFound
//!   ├── loader.materialize()
//!   │     └── failure      -> ImportError::Load (nothing cached)
//!   ├── loader.create(name) -> empty Module
//!   ├── loader.populate(module)
//!   └── cache under "pkg.users"
//! ```
//!
//! The cache holds finished modules only. Loaders never cache parsed
//! content; a module evicted from the cache is re-read on the next import.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace};

use super::descriptor::ModuleDescriptor;
use super::finder::JsonFinder;
use super::loader::LoadError;
use super::module::Module;
use super::options::ImportOptions;
use super::registry::{new_shared_registry, register, SharedFinderRegistry};

/// Result type for import operations.
pub type ImportResult<T> = Result<T, ImportError>;

/// Errors surfaced to the code performing an import.
#[derive(Debug)]
pub enum ImportError {
    /// No finder could locate the module.
    NotFound(String),
    /// The module was located but could not be loaded.
    Load { name: String, source: LoadError },
    /// The module has no attribute with the requested name.
    AttributeNotFound { module: String, attr: String },
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::NotFound(name) => write!(f, "No module named '{}'", name),
            ImportError::Load { name, source } => {
                write!(f, "Failed to load module '{}': {}", name, source)
            }
            ImportError::AttributeNotFound { module, attr } => {
                write!(f, "Cannot import name '{}' from '{}'", attr, module)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Load { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Drive a descriptor's loader through create-then-populate.
pub fn realize(descriptor: ModuleDescriptor) -> ImportResult<Module> {
    let name = descriptor.name().to_string();
    let mut loader = descriptor.into_loader();

    if let Err(source) = loader.materialize() {
        return Err(ImportError::Load { name, source });
    }

    let module = loader.create(&name);
    Ok(loader.populate(module))
}

/// Resolves import names to modules through a finder registry.
pub struct Importer {
    /// Finders consulted on a cache miss.
    finders: SharedFinderRegistry,

    /// Import name -> finished module.
    modules: RwLock<HashMap<String, Arc<Module>>>,

    /// Package name -> directories searched for its members.
    package_paths: RwLock<HashMap<String, Vec<PathBuf>>>,

    /// Import options.
    options: ImportOptions,
}

impl Importer {
    /// Create an importer with its own registry holding a `JsonFinder`.
    pub fn new(options: ImportOptions) -> Self {
        let finders = new_shared_registry();
        register(&finders, Arc::new(JsonFinder::new()));
        Self::with_registry(finders, options)
    }

    /// Create an importer over an existing registry (e.g. `registry::global()`).
    pub fn with_registry(finders: SharedFinderRegistry, options: ImportOptions) -> Self {
        Self {
            finders,
            modules: RwLock::new(HashMap::new()),
            package_paths: RwLock::new(HashMap::new()),
            options,
        }
    }

    /// Get import options.
    pub fn options(&self) -> &ImportOptions {
        &self.options
    }

    /// The registry this importer consults.
    pub fn finders(&self) -> &SharedFinderRegistry {
        &self.finders
    }

    /// Declare the directories that make up a package's search path.
    ///
    /// Imports of `package.member` then search these directories instead of
    /// the top-level ones.
    pub fn set_package_path<I, P>(&self, package: &str, dirs: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let dirs: Vec<PathBuf> = dirs.into_iter().map(Into::into).collect();
        self.package_paths.write().insert(package.to_string(), dirs);
    }

    /// Import `name`, searching the package path of its parent if one was
    /// declared, otherwise the configured search paths.
    pub fn import(&self, name: &str) -> ImportResult<Arc<Module>> {
        let package_dirs = name
            .rsplit_once('.')
            .and_then(|(parent, _)| self.package_paths.read().get(parent).cloned());

        match package_dirs {
            Some(dirs) => self.import_with_paths(name, Some(&dirs[..])),
            None => self.import_with_paths(name, self.options.search_paths()),
        }
    }

    /// Import `name`, searching `search_paths` (the current working directory
    /// when `None` or empty).
    pub fn import_with_paths(
        &self,
        name: &str,
        search_paths: Option<&[PathBuf]>,
    ) -> ImportResult<Arc<Module>> {
        if self.options.cache_modules {
            if let Some(module) = self.modules.read().get(name) {
                trace!(module = name, "module cache hit");
                return Ok(Arc::clone(module));
            }
        }

        let descriptor = self
            .finders
            .read()
            .find(name, search_paths)
            .ok_or_else(|| ImportError::NotFound(name.to_string()))?;

        debug!(module = name, loader = %descriptor.loader(), "loading module");
        let module = Arc::new(realize(descriptor)?);

        if self.options.cache_modules {
            self.modules
                .write()
                .insert(name.to_string(), Arc::clone(&module));
        }
        Ok(module)
    }

    /// Fetch one attribute of an imported module (`from module import attr`).
    pub fn import_from(&self, module: &Module, attr: &str) -> ImportResult<Value> {
        module
            .get_attr(attr)
            .cloned()
            .ok_or_else(|| ImportError::AttributeNotFound {
                module: module.name().to_string(),
                attr: attr.to_string(),
            })
    }

    /// Check if a module is in the cache.
    pub fn is_cached(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    /// Get the number of cached modules.
    pub fn cached_count(&self) -> usize {
        self.modules.read().len()
    }

    /// Drop one module from the cache, returning it if it was there.
    pub fn evict(&self, name: &str) -> Option<Arc<Module>> {
        self.modules.write().remove(name)
    }

    /// Drop every cached module.
    pub fn clear_cache(&self) {
        self.modules.write().clear();
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new(ImportOptions::default())
    }
}

impl fmt::Debug for Importer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Importer")
            .field("finders", &self.finders.read().keys())
            .field("cached_modules", &self.cached_count())
            .field("options", &self.options)
            .finish()
    }
}
