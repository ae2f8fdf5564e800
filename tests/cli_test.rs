// tests/cli_test.rs
use std::fs;
use std::process::{Command, Output};

use git2::{Repository, Signature};
use tempfile::TempDir;

fn git_stamp(dir: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_git-stamp"))
        .args(args)
        .current_dir(dir.path())
        .env_remove("PROJECT_VERSION")
        .output()
        .expect("Failed to execute git-stamp")
}

fn git_stamp_with_env(dir: &TempDir, args: &[&str], key: &str, value: &str) -> Output {
    Command::new(env!("CARGO_BIN_EXE_git-stamp"))
        .args(args)
        .current_dir(dir.path())
        .env(key, value)
        .output()
        .expect("Failed to execute git-stamp")
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn tagged_repo(tag: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    let sig = Signature::now("Test User", "test@example.com").unwrap();

    let mut index = repo.index().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let oid = repo
        .commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
        .unwrap();
    repo.tag_lightweight(tag, &repo.find_object(oid, None).unwrap(), false)
        .unwrap();

    dir
}

#[test]
fn test_help() {
    let dir = TempDir::new().unwrap();
    let output = git_stamp(&dir, &["--help"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("git-stamp"));
    assert!(text.contains("Derive a project version"));
}

#[test]
fn test_version_from_release_tag() {
    let dir = tagged_repo("v3.2.1");
    let output = git_stamp(&dir, &["version"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "3.2.1");
}

#[test]
fn test_default_command_is_version() {
    let dir = tagged_repo("v3.2.1");
    let output = git_stamp(&dir, &[]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "3.2.1");
}

#[test]
fn test_override_environment_variable() {
    let dir = tagged_repo("v3.2.1");
    let output = git_stamp_with_env(&dir, &["version"], "PROJECT_VERSION", "0.0.0-local");

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "0.0.0-local");
}

#[test]
fn test_outside_repository_gives_dated_version() {
    let dir = TempDir::new().unwrap();
    let output = git_stamp(&dir, &["--base-version", "7.0", "--strict", "version"]);

    assert!(output.status.success());
    let version = stdout(&output);
    let shape = regex::Regex::new(r"^7\.0-\d{8}T\d{6}-SNAPSHOT$").unwrap();
    assert!(shape.is_match(version.trim()), "{}", version);
}

#[test]
fn test_config_file_tag_pattern() {
    let dir = tagged_repo("release-4.0");
    fs::write(
        dir.path().join("gitstamp.toml"),
        "[version]\ntag_pattern = \"release-{version}\"\n",
    )
    .unwrap();

    let output = git_stamp(&dir, &["version"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "4.0");
}

#[test]
fn test_config_file_found_next_to_repo_flag() {
    let dir = tagged_repo("release-4.0");
    fs::write(
        dir.path().join("gitstamp.toml"),
        "[version]\ntag_pattern = \"release-{version}\"\n",
    )
    .unwrap();

    let elsewhere = TempDir::new().unwrap();
    let repo = dir.path().to_str().unwrap();
    let output = git_stamp(&elsewhere, &["--repo", repo, "version"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "4.0");
}

#[test]
fn test_info_lists_metadata() {
    let dir = tagged_repo("v1.0.0");
    let output = git_stamp(&dir, &["info"]);

    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("tags:    v1.0.0"), "{}", text);
    assert!(text.contains("version: 1.0.0 (from release tag 'v1.0.0')"), "{}", text);
}

#[test]
fn test_strict_mode_reports_broken_git() {
    let dir = tagged_repo("v1.0.0");
    fs::write(
        dir.path().join("gitstamp.toml"),
        "[git]\nbackend = \"process\"\nexecutable = \"git-stamp-no-such-git\"\n",
    )
    .unwrap();

    let strict = git_stamp(&dir, &["--strict", "version"]);
    assert!(!strict.status.success());
    let stderr = String::from_utf8_lossy(&strict.stderr);
    assert!(stderr.contains("not found"), "{}", stderr);

    let lenient = git_stamp(&dir, &["version"]);
    assert!(lenient.status.success());
    assert!(stdout(&lenient).trim().ends_with("-SNAPSHOT"));
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("gitstamp.toml"), "[version\n").unwrap();

    let output = git_stamp(&dir, &["version"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERROR"));
}
