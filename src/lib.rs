//! Jimp - JSON Modules Library
//!
//! Lets JSON documents be imported by name, the same way source modules are.
//! A file's top-level keys become the module's attributes.
//!
//! # Architecture
//!
//! Resolution is split between two collaborators:
//!
//! 1. **Finder** (`JsonFinder`)
//!    - Takes the last segment of a dotted name (`pkg.sub.users` -> `users`)
//!    - Probes each search directory for `users.json`, first match wins
//!    - Hands back a `ModuleDescriptor` with a loader bound to that file
//!
//! 2. **Loader** (`JsonLoader`)
//!    - `materialize` reads and parses the file (failures are fatal to the import)
//!    - `create` allocates an empty `Module`
//!    - `populate` copies every top-level key onto it
//!
//! Finders live in an ordered `FinderRegistry`; the `Importer` walks it and
//! caches finished modules by import name.
//!
//! # Example
//!
//! ```no_run
//! use jimp::{ImportOptions, Importer};
//!
//! let importer = Importer::new(ImportOptions::with_search_paths(["config"]));
//! let settings = importer.import("settings").unwrap();
//!
//! println!("{:?}", settings.get_attr("name"));
//! ```
//!
//! The process-wide registry is opt-in:
//!
//! ```no_run
//! let handle = jimp::install();
//! let importer = jimp::Importer::with_registry(jimp::global().clone(), Default::default());
//! # let _ = importer.import("data");
//! handle.unregister();
//! ```

pub mod modules;

pub use modules::{
    global, install, realize, Finder, ImportError, ImportOptions, ImportResult, Importer,
    JsonFinder, JsonLoader, LoadError, LoadResult, Loader, LoaderState, Module, ModuleDescriptor,
    Registration,
};
