//! Tests of the `stackpack` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn stackpack() -> Command {
    let mut cmd = Command::cargo_bin("stackpack").unwrap();
    cmd.env_remove("RUST_LOG")
        .env_remove("STACKPACK_PORT")
        .env_remove("STACKPACK_FORMAT")
        .env("NO_COLOR", "1");
    cmd
}

fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn create_stack() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_file(
        dir.path(),
        "package.json",
        r#"{ "name": "@acme/blog", "dependencies": {} }"#,
    );
    write_file(dir.path(), "lib/greet.js", "export const greet = (n) => `hi ${n}`;\n");
    write_file(
        dir.path(),
        "app.bundle.js",
        "import { greet } from './lib/greet.js';\nconsole.log(greet('stack'));\n",
    );
    dir
}

#[test]
fn help_lists_commands() {
    stackpack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bundle"))
        .stdout(predicate::str::contains("watch"));
}

#[test]
fn bundle_missing_stack_fails() {
    stackpack()
        .args(["bundle", "/definitely/not/a/stack"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Stack not found"));
}

#[test]
fn bundle_writes_build_dir() {
    let stack = create_stack();

    stackpack()
        .args(["bundle", "--analyze"])
        .arg(stack.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("total"))
        .stderr(predicate::str::contains("Bundled 1 entries"));

    let map = fs::read_to_string(stack.path().join("build/blog.map.json")).unwrap();
    assert!(map.contains("/dist/app.bundle.js"), "{map}");
}

#[test]
fn bundle_production_from_config_file() {
    let stack = create_stack();
    write_file(stack.path(), "stackpack.toml", "production = true\n");

    stackpack().arg("bundle").arg(stack.path()).assert().success();

    assert!(stack.path().join("dist/blog.map.json").is_file());
    assert!(!stack.path().join("build").exists());
}

#[test]
fn invalid_config_fails() {
    let stack = create_stack();
    write_file(stack.path(), "stackpack.toml", "port = 0\n");

    stackpack()
        .arg("bundle")
        .arg(stack.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("port"));
}

#[test]
fn unresolved_import_reports_diagnostic() {
    let stack = create_stack();
    write_file(stack.path(), "broken.bundle.js", "import './missing.js';\n");

    stackpack()
        .arg("bundle")
        .arg(stack.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.js"));
}
