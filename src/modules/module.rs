//! Module Object
//!
//! A `Module` is what an import produces: a name, the file it came from, and
//! an attribute namespace. For JSON-backed modules every attribute is one
//! top-level key of the document.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

/// A loaded module with its attribute namespace.
///
/// Attributes keep insertion order, so a module populated from a JSON file
/// lists its attributes in file order.
#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    /// Full import name (e.g., "pkg.settings").
    name: String,

    /// File the module was loaded from, if any.
    origin: Option<PathBuf>,

    /// Module attributes.
    attrs: Map<String, Value>,
}

impl Module {
    /// Create a new empty module.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            origin: None,
            attrs: Map::new(),
        }
    }

    /// Create a new empty module that records where it was loaded from.
    pub fn with_origin(name: impl Into<String>, origin: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            origin: Some(origin.into()),
            attrs: Map::new(),
        }
    }

    /// Get the full import name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the module's name without its package prefix.
    pub fn leaf_name(&self) -> &str {
        super::path::leaf_name(&self.name)
    }

    /// Get the file this module was loaded from.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Get an attribute.
    pub fn get_attr(&self, name: &str) -> Option<&Value> {
        self.attrs.get(name)
    }

    /// Set an attribute, returning the value it replaced.
    pub fn set_attr(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.attrs.insert(name.into(), value)
    }

    /// Check whether an attribute exists.
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Attribute names in insertion order.
    pub fn attr_names(&self) -> impl Iterator<Item = &str> {
        self.attrs.keys().map(String::as_str)
    }

    /// The whole attribute namespace.
    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the module has no attributes.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_module_creation() {
        let module = Module::new("pkg.settings");
        assert_eq!(module.name(), "pkg.settings");
        assert_eq!(module.leaf_name(), "settings");
        assert!(module.origin().is_none());
        assert!(module.is_empty());
    }

    #[test]
    fn test_module_with_origin() {
        let module = Module::with_origin("settings", "/etc/app/settings.json");
        assert_eq!(module.origin(), Some(Path::new("/etc/app/settings.json")));
    }

    #[test]
    fn test_set_and_get_attr() {
        let mut module = Module::new("m");
        assert_eq!(module.set_attr("a", json!(1)), None);
        assert_eq!(module.get_attr("a"), Some(&json!(1)));
        assert!(module.has_attr("a"));
        assert!(!module.has_attr("b"));

        // Overwrite returns the old value
        assert_eq!(module.set_attr("a", json!("x")), Some(json!(1)));
        assert_eq!(module.get_attr("a"), Some(&json!("x")));
        assert_eq!(module.len(), 1);
    }

    #[test]
    fn test_attr_names_keep_insertion_order() {
        let mut module = Module::new("m");
        module.set_attr("zeta", json!(null));
        module.set_attr("alpha", json!(null));
        module.set_attr("mid", json!(null));

        let names: Vec<&str> = module.attr_names().collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }
}
