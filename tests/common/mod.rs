//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Copy the fixture corpus `tests/<name>` into a fresh temporary directory.
///
/// Returns the guard together with the corpus root inside it.
#[allow(dead_code)]
pub fn setup_corpus(name: &str) -> (TempDir, PathBuf) {
    let tempdir = TempDir::new().unwrap();
    let root = tempdir.path().join(name);
    let source = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join(name);
    copy_dir_recursive(&source, &root).unwrap();
    (tempdir, root)
}

pub fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if !dst.exists() {
        std::fs::create_dir_all(dst)?;
    }

    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Contents of `rel` under `root`.
#[allow(dead_code)]
pub fn read(root: &Path, rel: &str) -> String {
    std::fs::read_to_string(root.join(rel)).unwrap()
}
