//! Shared test utilities for integration and E2E tests.
//!
//! This module provides a fixture with BASE and SOURCE trees inside one
//! temporary directory, plus helpers to run the `merge-wizard` binary against
//! them.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_base_file("a.lua", "local x = 1\n")
//!         .with_source_file("a.lua", "local x = 2\n");
//!     fixture.merge().assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

/// A temporary workspace holding `base/`, `source/` and (optionally)
/// `source2/` trees. The merge output goes to `merged/`.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a fixture with empty `base/` and `source/` trees.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        temp_dir
            .child("base")
            .create_dir_all()
            .expect("Failed to create base");
        temp_dir
            .child("source")
            .create_dir_all()
            .expect("Failed to create source");
        Self { temp_dir }
    }

    /// Add a text file to BASE.
    pub fn with_base_file(self, path: &str, content: &str) -> Self {
        self.write("base", path, content.as_bytes())
    }

    /// Add a text file to SOURCE.
    pub fn with_source_file(self, path: &str, content: &str) -> Self {
        self.write("source", path, content.as_bytes())
    }

    /// Add a text file to a second SOURCE tree.
    #[allow(dead_code)]
    pub fn with_second_source_file(self, path: &str, content: &str) -> Self {
        self.write("source2", path, content.as_bytes())
    }

    /// Add the same text file to BASE and SOURCE.
    #[allow(dead_code)]
    pub fn with_shared_file(self, path: &str, content: &str) -> Self {
        self.with_base_file(path, content)
            .with_source_file(path, content)
    }

    /// Add a binary file to BASE or SOURCE (`tree` is `"base"` or `"source"`).
    #[allow(dead_code)]
    pub fn with_binary_file(self, tree: &str, path: &str, content: &[u8]) -> Self {
        self.write(tree, path, content)
    }

    fn write(self, tree: &str, path: &str, content: &[u8]) -> Self {
        self.temp_dir
            .child(tree)
            .child(path)
            .write_binary(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn base(&self) -> PathBuf {
        self.path().join("base")
    }

    pub fn source(&self) -> PathBuf {
        self.path().join("source")
    }

    #[allow(dead_code)]
    pub fn second_source(&self) -> PathBuf {
        self.path().join("source2")
    }

    pub fn output(&self) -> PathBuf {
        self.path().join("merged")
    }

    /// Default report location for [`Self::output`].
    pub fn report(&self) -> PathBuf {
        self.path().join("merged.merge_report.txt")
    }

    /// Remembered-options file private to this fixture.
    pub fn settings(&self) -> PathBuf {
        self.path().join("settings").join("last-run.json")
    }

    /// Read a file of the merge output as text.
    pub fn read_output(&self, path: &str) -> String {
        std::fs::read_to_string(self.output().join(path)).expect("Failed to read output file")
    }

    /// Read the report file.
    pub fn read_report(&self) -> String {
        std::fs::read_to_string(self.report()).expect("Failed to read report")
    }

    /// Get access to the underlying TempDir for advanced usage.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl TestFixture {
    /// Create a command running in this fixture's directory, isolated from
    /// the user's remembered options and color settings.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("merge-wizard");
        cmd.current_dir(self.path())
            .env("MERGE_WIZARD_SETTINGS", self.settings())
            .env_remove("MERGE_WIZARD_CONFIG")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// `merge base source --output merged` ready for extra flags.
    pub fn merge(&self) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg("merge")
            .arg(self.base())
            .arg(self.source())
            .arg("--output")
            .arg(self.output());
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_creates_trees() {
        let fixture = TestFixture::new();
        assert!(fixture.base().is_dir());
        assert!(fixture.source().is_dir());
        assert!(!fixture.output().exists());
    }

    #[test]
    fn test_fixture_with_files() {
        let fixture = TestFixture::new()
            .with_base_file("dir/a.txt", "a")
            .with_source_file("b.txt", "b");
        assert!(fixture.base().join("dir/a.txt").exists());
        assert!(fixture.source().join("b.txt").exists());
    }
}
