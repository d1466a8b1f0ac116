#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Write `content` to `name` under `dir`, creating parent directories.
pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directory");
    }
    fs::write(&path, content).expect("Failed to write test file");
    path
}

pub const CLEAN_DOCUMENT: &str = "Title\n=====\n\nSome text.\n\n.. code-block:: python\n\n    print(\"hello\")\n";

pub const BAD_JSON_DOCUMENT: &str = "Data\n====\n\n.. code-block:: json\n\n    {\n        \"a\": 1\n\nAfter.\n";
