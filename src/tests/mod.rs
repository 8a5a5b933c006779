use std::fs;
use std::path::PathBuf;

pub mod fixtures;

pub mod boundary_tests;
pub mod importer_tests;

/// Create a fresh scratch directory for a test. Reruns wipe whatever the
/// previous run left behind.
pub fn scratch_dir(test_name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("gameday_{}_{}", test_name, std::process::id()));
    if dir.exists() {
        fs::remove_dir_all(&dir).unwrap();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}
