//! Module Path Resolution
//!
//! Maps dotted import names onto JSON files:
//! - `data` - Looks for `data.json`
//! - `pkg.sub.data` - Only the leaf segment counts, so also `data.json`
//!
//! The directories searched are supplied by the caller. With none supplied,
//! the process's current working directory is searched.

use std::path::{Path, PathBuf};

/// Extension appended to the leaf name when building a candidate file.
pub const JSON_EXTENSION: &str = "json";

/// Extract the leaf segment of a dotted module name.
///
/// # Examples
/// - `"pkg.sub.leaf"` -> `"leaf"`
/// - `"leaf"` -> `"leaf"`
pub fn leaf_name(module_name: &str) -> &str {
    module_name.rsplit('.').next().unwrap_or(module_name)
}

/// Build the candidate file for a module name inside one directory.
///
/// # Arguments
/// - `dir` - The directory being probed
/// - `module_name` - The full dotted import name
///
/// # Returns
/// `dir/<leaf>.json`
pub fn candidate_path(dir: &Path, module_name: &str) -> PathBuf {
    dir.join(format!("{}.{}", leaf_name(module_name), JSON_EXTENSION))
}

/// Directories probed when the caller supplies no search paths.
///
/// Falls back to `.` when the working directory cannot be determined
/// (e.g. it was deleted out from under the process).
pub fn default_search_paths() -> Vec<PathBuf> {
    vec![std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))]
}

/// Pick the directories to probe: the given ones if non-empty, otherwise the defaults.
pub fn effective_search_paths(search_paths: Option<&[PathBuf]>) -> Vec<PathBuf> {
    match search_paths {
        Some(paths) if !paths.is_empty() => paths.to_vec(),
        _ => default_search_paths(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaf_of_bare_name() {
        assert_eq!(leaf_name("config"), "config");
    }

    #[test]
    fn test_leaf_of_dotted_name() {
        assert_eq!(leaf_name("pkg.sub.leaf"), "leaf");
        assert_eq!(leaf_name("pkg.leaf"), "leaf");
    }

    #[test]
    fn test_leaf_of_trailing_dot() {
        // Degenerate, but must not panic
        assert_eq!(leaf_name("pkg."), "");
    }

    #[test]
    fn test_candidate_path() {
        let dir = Path::new("/home/user/project/data");
        assert_eq!(
            candidate_path(dir, "settings"),
            PathBuf::from("/home/user/project/data/settings.json")
        );
    }

    #[test]
    fn test_candidate_path_uses_leaf_only() {
        let dir = Path::new("/srv/pkg");
        assert_eq!(
            candidate_path(dir, "pkg.sub.users"),
            PathBuf::from("/srv/pkg/users.json")
        );
    }

    #[test]
    fn test_effective_paths_given() {
        let paths = vec![PathBuf::from("/a"), PathBuf::from("/b")];
        assert_eq!(effective_search_paths(Some(&paths[..])), paths);
    }

    #[test]
    fn test_effective_paths_empty_falls_back_to_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(effective_search_paths(Some(&[])), vec![cwd.clone()]);
        assert_eq!(effective_search_paths(None), vec![cwd]);
    }
}
