//! Deterministic fixture directory trees for tests and benchmarks.
//!
//! Two kinds of trees are available:
//! - [`create_scenario_workspace`]: a small hand-written project used by the
//!   end-to-end completion tests
//! - [`create_fixture_tree`]: a generated tree of nested directories with a
//!   controlled fan-out, used to measure resolution and listing cost
//!
//! All output is deterministic so benchmarks are reproducible.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Name of the edited file inside the scenario workspace's `files/` directory
pub const SCENARIO_MAIN_FILE: &str = "main.js";

/// Directory whose name contains a single quote
pub const ESCAPED_DIR: &str = "esca'ped_dir";

/// Create the scenario project:
///
/// ```text
/// <root>/
///   esca'ped_dir/
///     inner.js
///     nested/
///   files/
///     main.js
///     sample.js
///     sample.xml
/// ```
pub fn create_scenario_workspace() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory for scenario workspace");
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join(ESCAPED_DIR).join("nested"))
        .expect("Failed to create escaped directory");
    std::fs::write(root.join(ESCAPED_DIR).join("inner.js"), "export default 1;\n")
        .expect("Failed to write inner.js");

    let files = root.join("files");
    std::fs::create_dir_all(&files).expect("Failed to create files directory");
    for (name, content) in [
        (SCENARIO_MAIN_FILE, "import fs from '';\n"),
        ("sample.js", "module.exports = {};\n"),
        ("sample.xml", "<sample/>\n"),
    ] {
        std::fs::write(files.join(name), content)
            .unwrap_or_else(|e| panic!("Failed to write fixture file {}: {}", name, e));
    }

    temp_dir
}

/// Path of the edited file in a scenario workspace
pub fn scenario_main_file(root: &Path) -> PathBuf {
    root.join("files").join(SCENARIO_MAIN_FILE)
}

/// Shape of a generated fixture tree
#[derive(Debug, Clone)]
pub struct FixtureConfig {
    /// Nesting depth of the `dir_<n>` chain
    pub depth: usize,
    /// Subdirectories per level
    pub dirs_per_level: usize,
    /// Files per directory
    pub files_per_dir: usize,
}

impl FixtureConfig {
    /// 3 levels, 3 subdirectories and 10 files per directory
    pub fn small() -> Self {
        Self {
            depth: 3,
            dirs_per_level: 3,
            files_per_dir: 10,
        }
    }

    /// 6 levels, 4 subdirectories and 100 files per directory
    pub fn large() -> Self {
        Self {
            depth: 6,
            dirs_per_level: 4,
            files_per_dir: 100,
        }
    }
}

/// Create a generated tree. Only `dir_0` recurses, so the tree stays linear
/// in `depth` while every level still has the configured fan-out.
pub fn create_fixture_tree(config: &FixtureConfig) -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory for fixture tree");
    write_fixture_tree(temp_dir.path(), config);
    temp_dir
}

/// Write a generated tree into an existing directory
pub fn write_fixture_tree(dir: &Path, config: &FixtureConfig) {
    let mut current = dir.to_path_buf();
    for level in 0..=config.depth {
        for file_i in 0..config.files_per_dir {
            let name = format!("file_{}_{}.js", level, file_i);
            std::fs::write(current.join(&name), "")
                .unwrap_or_else(|e| panic!("Failed to write fixture file {}: {}", name, e));
        }
        if level == config.depth {
            break;
        }
        for dir_i in 0..config.dirs_per_level {
            std::fs::create_dir_all(current.join(format!("dir_{}", dir_i)))
                .unwrap_or_else(|e| panic!("Failed to create fixture dir: {}", e));
        }
        current = current.join("dir_0");
    }
}

/// The deepest directory of a generated tree, as a relative path with a
/// trailing separator (e.g. `./dir_0/dir_0/`)
pub fn deepest_relative_path(config: &FixtureConfig) -> String {
    let mut path = String::from("./");
    for _ in 0..config.depth {
        path.push_str("dir_0/");
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_workspace_layout() {
        let ws = create_scenario_workspace();
        assert!(scenario_main_file(ws.path()).is_file());
        assert!(ws.path().join("files/sample.xml").is_file());
        assert!(ws.path().join(ESCAPED_DIR).join("nested").is_dir());
    }

    #[test]
    fn test_fixture_tree_shape() {
        let config = FixtureConfig {
            depth: 2,
            dirs_per_level: 2,
            files_per_dir: 3,
        };
        let tree = create_fixture_tree(&config);
        let deepest = tree.path().join(deepest_relative_path(&config));
        assert!(deepest.is_dir());
        assert_eq!(std::fs::read_dir(&deepest).unwrap().count(), 3);
        // Top level: 3 files + 2 dirs
        assert_eq!(std::fs::read_dir(tree.path()).unwrap().count(), 5);
        assert!(tree.path().join("dir_1").is_dir());
    }

    #[test]
    fn test_deepest_relative_path() {
        assert_eq!(deepest_relative_path(&FixtureConfig::small()), "./dir_0/dir_0/dir_0/");
    }
}
