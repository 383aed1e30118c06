//! Two-Phase JSON Loader
//!
//! Turns one located JSON file into a module in two steps, mirroring the
//! create-then-execute protocol of the import machinery:
//!
//! **Materialize:**
//! - Read the bound file as UTF-8 text
//! - Parse it as a JSON object
//! - Keep the top-level mapping in the loader
//!
//! **Populate:**
//! - Copy every top-level key/value pair onto the module as an attribute
//!
//! # State Machine
//!
//! ```text
//! Constructed --materialize ok--> Materialized --populate--> Populated
//!      |
//!      +------materialize err---> Failed (terminal)
//! ```
//!
//! Populating a loader that never materialized is allowed and yields an
//! empty module.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use super::module::Module;

/// Result type for module loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Deepest container nesting a file may use, counting the top-level object.
///
/// This is serde_json's recursion limit; anything deeper is rejected as
/// `LoadError::Parse` instead of risking the stack.
pub const MAX_NESTING_DEPTH: usize = 127;

/// Errors that can occur while materializing a module.
///
/// Every variant is fatal to the import that triggered it.
#[derive(Debug)]
pub enum LoadError {
    /// File could not be opened or read.
    Io { path: PathBuf, source: io::Error },
    /// File content is not a JSON object.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The loader already failed once and will not retry.
    Poisoned(PathBuf),
}

impl LoadError {
    /// Path of the file that failed to load.
    pub fn path(&self) -> &Path {
        match self {
            LoadError::Io { path, .. } | LoadError::Parse { path, .. } => path,
            LoadError::Poisoned(path) => path,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, .. } => {
                write!(f, "Could not load json file '{}'", path.display())
            }
            LoadError::Parse { path, .. } => {
                write!(f, "Could not parse json file '{}'", path.display())
            }
            LoadError::Poisoned(path) => {
                write!(f, "Loader for '{}' already failed", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
            LoadError::Poisoned(_) => None,
        }
    }
}

/// The state of a loader instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderState {
    /// Bound to a path, nothing read yet.
    Constructed,
    /// File read and parsed; data is ready to copy.
    Materialized,
    /// Data copied onto a module at least once.
    Populated,
    /// Reading or parsing failed.
    Failed,
}

/// A loader that realizes one located resource as a module.
///
/// Finders hand these out inside a `ModuleDescriptor`. Implementations for
/// other data formats plug in here without touching the finder chain.
pub trait Loader: fmt::Display + Send {
    /// Read and parse the bound resource.
    fn materialize(&mut self) -> LoadResult<()>;

    /// Allocate the empty module that `populate` will fill.
    fn create(&self, name: &str) -> Module;

    /// Copy the materialized data onto `module` and hand it back.
    fn populate(&mut self, module: Module) -> Module;

    /// Human-readable identification, for diagnostics only.
    fn describe(&self) -> String {
        self.to_string()
    }

    /// Current state.
    fn state(&self) -> LoaderState;

    /// The resource this loader is bound to.
    fn path(&self) -> &Path;
}

/// Loads a JSON file as a module.
#[derive(Debug)]
pub struct JsonLoader {
    /// Bound file. Never changes after construction.
    path: PathBuf,

    /// Top-level mapping of the parsed file. Filled at most once.
    data: Map<String, Value>,

    /// Current state.
    state: LoaderState,
}

impl JsonLoader {
    /// Create a loader bound to `path`. Nothing is read until `materialize`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            data: Map::new(),
            state: LoaderState::Constructed,
        }
    }

    /// The parsed top-level mapping (empty before `materialize`).
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    fn read_and_parse(path: &Path) -> LoadResult<Map<String, Value>> {
        // The handle is dropped inside read_to_string, before parsing starts
        let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl Loader for JsonLoader {
    fn materialize(&mut self) -> LoadResult<()> {
        match self.state {
            LoaderState::Materialized | LoaderState::Populated => return Ok(()),
            LoaderState::Failed => return Err(LoadError::Poisoned(self.path.clone())),
            LoaderState::Constructed => {}
        }

        trace!(path = %self.path.display(), "materializing json module");
        match Self::read_and_parse(&self.path) {
            Ok(data) => {
                debug!(
                    path = %self.path.display(),
                    keys = data.len(),
                    "json module materialized"
                );
                self.data = data;
                self.state = LoaderState::Materialized;
                Ok(())
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "json module failed to load");
                self.state = LoaderState::Failed;
                Err(e)
            }
        }
    }

    fn create(&self, name: &str) -> Module {
        Module::with_origin(name, self.path.clone())
    }

    fn populate(&mut self, mut module: Module) -> Module {
        for (key, value) in &self.data {
            module.set_attr(key.clone(), value.clone());
        }
        if self.state == LoaderState::Materialized {
            self.state = LoaderState::Populated;
        }
        module
    }

    fn state(&self) -> LoaderState {
        self.state
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for JsonLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JSON File @ {}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::error::Error;

    fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_new_loader_is_constructed() {
        let loader = JsonLoader::new("/data/users.json");
        assert_eq!(loader.state(), LoaderState::Constructed);
        assert_eq!(loader.path(), Path::new("/data/users.json"));
        assert!(loader.data().is_empty());
    }

    #[test]
    fn test_materialize_and_populate() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "data.json",
            r#"{"a": 1, "b": [1, 2, 3], "c": {"d": true}}"#,
        );

        let mut loader = JsonLoader::new(&path);
        loader.materialize().unwrap();
        assert_eq!(loader.state(), LoaderState::Materialized);

        let module = loader.create("data");
        assert_eq!(module.origin(), Some(path.as_path()));
        assert!(module.is_empty());

        let module = loader.populate(module);
        assert_eq!(loader.state(), LoaderState::Populated);
        assert_eq!(module.get_attr("a"), Some(&json!(1)));
        assert_eq!(module.get_attr("b"), Some(&json!([1, 2, 3])));
        assert_eq!(module.get_attr("c"), Some(&json!({"d": true})));
        assert_eq!(module.len(), 3);
    }

    #[test]
    fn test_populate_before_materialize_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "data.json", r#"{"a": 1}"#);

        let mut loader = JsonLoader::new(&path);
        let module = loader.create("data");
        let module = loader.populate(module);

        assert!(module.is_empty());
        assert_eq!(loader.state(), LoaderState::Constructed);
    }

    #[test]
    fn test_empty_object_yields_empty_module() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "empty.json", "{}");

        let mut loader = JsonLoader::new(&path);
        loader.materialize().unwrap();
        let module = loader.create("empty");
        assert!(loader.populate(module).is_empty());
    }

    #[test]
    fn test_materialize_runs_at_most_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "data.json", r#"{"v": 1}"#);

        let mut loader = JsonLoader::new(&path);
        loader.materialize().unwrap();

        // Rewriting the file must not change what this loader holds
        fs::write(&path, r#"{"v": 2}"#).unwrap();
        loader.materialize().unwrap();
        assert_eq!(loader.data().get("v"), Some(&json!(1)));
    }

    #[test]
    fn test_parse_error_is_chained() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "bad.json", r#"{"a": 1,"#);

        let mut loader = JsonLoader::new(&path);
        let err = loader.materialize().unwrap_err();

        assert!(matches!(err, LoadError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
        let cause = err.source().expect("parse error should carry a cause");
        assert!(cause.downcast_ref::<serde_json::Error>().is_some());
        assert_eq!(loader.state(), LoaderState::Failed);
    }

    #[test]
    fn test_trailing_comma_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "trail.json", r#"{"a": 1,}"#);

        let mut loader = JsonLoader::new(&path);
        assert!(matches!(
            loader.materialize(),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_zero_byte_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "blank.json", "");

        let mut loader = JsonLoader::new(&path);
        assert!(matches!(
            loader.materialize(),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_top_level_array_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "list.json", "[1, 2, 3]");

        let mut loader = JsonLoader::new(&path);
        assert!(matches!(
            loader.materialize(),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = JsonLoader::new(dir.path().join("gone.json"));

        let err = loader.materialize().unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        let cause = err.source().expect("io error should carry a cause");
        let io_err = cause.downcast_ref::<io::Error>().unwrap();
        assert_eq!(io_err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_utf8_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin.json");
        fs::write(&path, [0xffu8, 0xfe]).unwrap();

        let mut loader = JsonLoader::new(&path);
        let err = loader.materialize().unwrap_err();
        match &err {
            LoadError::Io { source, .. } => assert_eq!(source.kind(), io::ErrorKind::InvalidData),
            other => panic!("expected an io error, got {:?}", other),
        }
    }

    #[test]
    fn test_directory_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dir.json");
        fs::create_dir(&path).unwrap();

        let mut loader = JsonLoader::new(&path);
        assert!(matches!(loader.materialize(), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_failed_loader_is_poisoned() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "bad.json", "not json");

        let mut loader = JsonLoader::new(&path);
        assert!(loader.materialize().is_err());

        // Fixing the file does not revive the loader
        fs::write(&path, "{}").unwrap();
        let err = loader.materialize().unwrap_err();
        assert!(matches!(err, LoadError::Poisoned(_)));
        assert!(err.source().is_none());
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "dup.json", r#"{"k": 1, "k": 2}"#);

        let mut loader = JsonLoader::new(&path);
        loader.materialize().unwrap();
        let module = loader.create("dup");
        let module = loader.populate(module);
        assert_eq!(module.get_attr("k"), Some(&json!(2)));
        assert_eq!(module.len(), 1);
    }

    #[test]
    fn test_big_integer_kept_exact() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "big.json", r#"{"n": 12345678901234567890123}"#);

        let mut loader = JsonLoader::new(&path);
        loader.materialize().unwrap();
        let module = loader.create("big");
        let module = loader.populate(module);

        let n = module.get_attr("n").unwrap();
        assert!(n.is_number());
        assert!(!n.is_f64());
        assert_eq!(n.to_string(), "12345678901234567890123");
    }

    /// `{"x": [[...]]}` with `depth` containers in total.
    fn nested_document(depth: usize) -> String {
        let inner = depth - 1;
        format!(r#"{{"x": {}{}}}"#, "[".repeat(inner), "]".repeat(inner))
    }

    #[test]
    fn test_nesting_at_limit_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "deep.json", &nested_document(MAX_NESTING_DEPTH));

        let mut loader = JsonLoader::new(&path);
        loader.materialize().unwrap();
        assert!(loader.data().get("x").unwrap().is_array());
    }

    #[test]
    fn test_nesting_past_limit_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            dir.path(),
            "deeper.json",
            &nested_document(MAX_NESTING_DEPTH + 1),
        );

        let mut loader = JsonLoader::new(&path);
        assert!(matches!(
            loader.materialize(),
            Err(LoadError::Parse { .. })
        ));
    }

    #[test]
    fn test_populate_keeps_existing_attrs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(dir.path(), "data.json", r#"{"a": 1}"#);

        let mut loader = JsonLoader::new(&path);
        loader.materialize().unwrap();

        let mut module = loader.create("data");
        module.set_attr("preset", json!("kept"));
        module.set_attr("a", json!("replaced"));

        let module = loader.populate(module);
        assert_eq!(module.get_attr("preset"), Some(&json!("kept")));
        assert_eq!(module.get_attr("a"), Some(&json!(1)));
    }

    #[test]
    fn test_describe() {
        let loader = JsonLoader::new("/data/users.json");
        assert_eq!(loader.describe(), "JSON File @ /data/users.json");
        assert_eq!(loader.to_string(), loader.describe());
    }

    #[test]
    fn test_load_error_display() {
        let err = LoadError::Io {
            path: PathBuf::from("/test.json"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/test.json"));
        assert!(err.to_string().contains("Could not load json file"));

        let err = LoadError::Poisoned(PathBuf::from("/test.json"));
        assert!(err.to_string().contains("already failed"));
    }
}
