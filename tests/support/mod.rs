//! Test support utilities for dotenv-keyvault integration tests.
//!
//! Provides an isolated project directory and command helpers.

#![allow(dead_code)]

pub mod assertions;
pub mod commands;

#[allow(unused_imports)]
pub use assertions::*;

use tempfile::TempDir;

/// Test environment with an isolated temp directory.
///
/// Child processes use `.current_dir()` and a scrubbed environment, so
/// tests can safely run in parallel.
pub struct Test {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl Test {
    /// Create a new empty test environment.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self { dir }
    }

    /// Create a test environment with a `.env` file.
    pub fn with_env(contents: &str) -> Self {
        let t = Self::new();
        t.write(".env", contents);
        t
    }

    /// Write a file into the project directory.
    pub fn write(&self, name: &str, contents: &str) {
        std::fs::write(self.dir.path().join(name), contents).expect("failed to write file");
    }
}
