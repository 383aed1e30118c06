//! Module Descriptor
//!
//! What a finder hands back on a match: the import name plus the loader
//! bound to the file that was found. The import machinery takes ownership
//! and drives the loader; the finder keeps nothing.

use std::fmt;
use std::path::Path;

use super::loader::Loader;

/// A resolved import name paired with the loader that will realize it.
pub struct ModuleDescriptor {
    /// Full import name as requested.
    name: String,

    /// Loader bound to the located resource.
    loader: Box<dyn Loader>,
}

impl ModuleDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, loader: Box<dyn Loader>) -> Self {
        Self {
            name: name.into(),
            loader,
        }
    }

    /// Get the import name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the resource the loader is bound to.
    pub fn origin(&self) -> &Path {
        self.loader.path()
    }

    /// Borrow the loader.
    pub fn loader(&self) -> &dyn Loader {
        self.loader.as_ref()
    }

    /// Take the loader out, consuming the descriptor.
    pub fn into_loader(self) -> Box<dyn Loader> {
        self.loader
    }
}

impl fmt::Debug for ModuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDescriptor")
            .field("name", &self.name)
            .field("loader", &self.loader.describe())
            .field("state", &self.loader.state())
            .finish()
    }
}
