//! Shared test utilities for stackpack-bundler tests

#![allow(dead_code)]

use std::fs;
use std::path::Path;

use tempfile::TempDir;

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dirs");
    }
    fs::write(path, content).expect("write file");
}

/// A stack with a manifest, one script entry, a shared module and a template.
pub fn create_stack(manifest: &str) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    let root = dir.path();

    write_file(root, "package.json", manifest);
    write_file(
        root,
        "lib/math.js",
        r#"
export function add(a, b) {
    return a + b;
}
"#,
    );
    write_file(root, "templates/cart.html", "<div class=\"cart\">`items`</div>");
    write_file(
        root,
        "pages/home.bundle.js",
        r#"
import { add } from '../lib/math.js';
import '../templates/cart.html';

if (process.env.NODE_ENV !== 'production') {
    console.log('dev build');
}

console.log(add(2, 3));
"#,
    );

    dir
}
