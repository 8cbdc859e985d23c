//! Test helper functions and utilities

use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Initialize test logging from `RUST_LOG`.
///
/// Safe to call multiple times - subsequent calls are ignored.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Temporary directory holding config files for one test
#[derive(Debug)]
pub struct ConfigDir {
    temp_dir: tempfile::TempDir,
}

impl ConfigDir {
    /// # Panics
    /// Panics if the temporary directory cannot be created
    pub fn new() -> Self {
        Self {
            temp_dir: tempfile::tempdir().expect("create temp config dir"),
        }
    }

    /// Write `content` as pretty JSON to `name`, returning its path
    ///
    /// # Panics
    /// Panics if the file cannot be written
    pub fn write_json(&self, name: &str, content: &Value) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let body = serde_json::to_string_pretty(content).expect("serialize config");
        std::fs::write(&path, body).expect("write config file");
        path
    }

    /// Write raw text to `name`, returning its path
    ///
    /// # Panics
    /// Panics if the file cannot be written
    pub fn write_raw(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, content).expect("write config file");
        path
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }
}

impl Default for ConfigDir {
    fn default() -> Self {
        Self::new()
    }
}
