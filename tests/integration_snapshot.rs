// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the snapshot engine.
//!
//! Drives `with_snapshot` against real temporary repositories and checks
//! that the working state is captured on the scratch branch and the
//! repository is handed back untouched.

use repovault::config::GitConfig;
use repovault::git::attributes::collect_snapshot_paths;
use repovault::git::snapshot::{SNAPSHOT_BRANCH, with_snapshot};
use repovault::git::{GitContext, GitRepo};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn test_context() -> GitContext {
    GitContext::new(&GitConfig::default()).expect("git not installed")
}

/// Helper to run git commands in a directory
fn run_git(args: &[&str], cwd: &Path) -> bool {
    Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@test.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@test.com")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Helper to capture the stdout of a git command, trimmed.
fn git_stdout(args: &[&str], cwd: &Path) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to run git");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Create an initialized git repo on branch `main`
fn init_test_repo(dir: &Path) {
    run_git(&["init", "-q", "-b", "main"], dir);
    run_git(&["config", "user.email", "test@test.com"], dir);
    run_git(&["config", "user.name", "Test"], dir);
}

/// Create an initialized git repo with an initial commit (README.md)
fn init_test_repo_with_commit(dir: &Path) {
    init_test_repo(dir);
    let file = dir.join("README.md");
    fs::write(&file, "# Test").unwrap();
    run_git(&["add", "."], dir);
    run_git(&["commit", "-m", "Initial commit"], dir);
}

fn open_repo(context: &GitContext, dir: &Path) -> GitRepo {
    context.open(dir)
}

/// Stages one new file, leaves one modified file unstaged, and drops one
/// untracked file, returning the `git status --porcelain` baseline.
fn dirty_up(dir: &Path) -> String {
    fs::write(dir.join("staged.txt"), "staged content").unwrap();
    run_git(&["add", "staged.txt"], dir);
    fs::write(dir.join("README.md"), "# Modified").unwrap();
    fs::write(dir.join("untracked.txt"), "untracked").unwrap();
    git_stdout(&["status", "--porcelain"], dir)
}

// =============================================================================
// with_snapshot: non-interference
// =============================================================================

#[test]
fn snapshot_leaves_repository_untouched() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path());
    let before_status = dirty_up(temp.path());
    let before_head = git_stdout(&["rev-parse", "HEAD"], temp.path());

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    with_snapshot(&repo, None, || Ok(())).unwrap();

    assert_eq!(git_stdout(&["status", "--porcelain"], temp.path()), before_status);
    assert_eq!(git_stdout(&["rev-parse", "HEAD"], temp.path()), before_head);
    assert_eq!(git_stdout(&["branch", "--show-current"], temp.path()), "main");
    // The scratch branch must be gone afterwards.
    assert_eq!(
        git_stdout(&["branch", "--list", SNAPSHOT_BRANCH], temp.path()),
        ""
    );
}

#[test]
fn snapshot_branch_holds_everything_during_use_phase() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path());
    dirty_up(temp.path());

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    let mut tip_subject = String::new();
    let mut parent_subject = String::new();
    let mut tree = String::new();
    with_snapshot(&repo, None, || {
        tip_subject = git_stdout(
            &["log", "-1", "--format=%s", SNAPSHOT_BRANCH],
            temp.path(),
        );
        parent_subject = git_stdout(
            &["log", "-1", "--format=%s", &format!("{SNAPSHOT_BRANCH}^")],
            temp.path(),
        );
        tree = git_stdout(
            &["ls-tree", "-r", "--name-only", SNAPSHOT_BRANCH],
            temp.path(),
        );
        Ok(())
    })
    .unwrap();

    assert_eq!(tip_subject, "unstaged@main");
    assert_eq!(parent_subject, "staged@main");
    assert!(tree.contains("staged.txt"));
    assert!(tree.contains("untracked.txt"));
    assert!(tree.contains("README.md"));
}

#[test]
fn snapshot_restores_detached_head() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path());
    let head = git_stdout(&["rev-parse", "HEAD"], temp.path());
    run_git(&["checkout", "-q", "--detach"], temp.path());
    fs::write(temp.path().join("README.md"), "# Detached edit").unwrap();

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    let mut tip_subject = String::new();
    with_snapshot(&repo, None, || {
        tip_subject = git_stdout(
            &["log", "-1", "--format=%s", SNAPSHOT_BRANCH],
            temp.path(),
        );
        Ok(())
    })
    .unwrap();

    // Detached origins are recorded as `:<commit>`.
    assert_eq!(tip_subject, format!("unstaged@:{head}"));
    // Still detached at the same commit, edit still in the worktree.
    assert!(!run_git(&["symbolic-ref", "-q", "HEAD"], temp.path()));
    assert_eq!(git_stdout(&["rev-parse", "HEAD"], temp.path()), head);
    assert_eq!(
        fs::read_to_string(temp.path().join("README.md")).unwrap(),
        "# Detached edit"
    );
}

#[test]
fn snapshot_cleans_up_when_use_phase_fails() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path());
    let before_status = dirty_up(temp.path());

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    let result: Result<(), _> = with_snapshot(&repo, None, || {
        Err(repovault::error::bail_out("push exploded"))
    });

    assert!(result.is_err());
    assert_eq!(git_stdout(&["status", "--porcelain"], temp.path()), before_status);
    assert_eq!(
        git_stdout(&["branch", "--list", SNAPSHOT_BRANCH], temp.path()),
        ""
    );
}

// =============================================================================
// with_snapshot: abort preconditions
// =============================================================================

#[test]
fn snapshot_aborts_during_rebase() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path());
    let before_status = dirty_up(temp.path());
    fs::create_dir(temp.path().join(".git/rebase-merge")).unwrap();

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    let error = with_snapshot(&repo, None, || Ok(())).unwrap_err();

    let reason = error.abort_reason().expect("expected an abort");
    assert!(reason.to_string().contains("rebase"), "got: {reason}");
    // Nothing was touched.
    assert_eq!(git_stdout(&["status", "--porcelain"], temp.path()), before_status);
    assert_eq!(
        git_stdout(&["branch", "--list", SNAPSHOT_BRANCH], temp.path()),
        ""
    );
}

#[test]
fn snapshot_aborts_when_scratch_branch_is_checked_out() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path());
    run_git(&["checkout", "-q", "-b", SNAPSHOT_BRANCH], temp.path());

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    let error = with_snapshot(&repo, None, || Ok(())).unwrap_err();

    assert!(error.abort_reason().is_some());
    // The checked-out branch survives.
    assert_eq!(
        git_stdout(&["branch", "--show-current"], temp.path()),
        SNAPSHOT_BRANCH
    );
}

#[test]
fn snapshot_rejects_unknown_attribute_value_before_mutating() {
    let temp = temp_dir();
    init_test_repo_with_commit(temp.path());
    fs::write(temp.path().join(".gitattributes"), "notes.txt repovault-snapshot=bogus\n")
        .unwrap();
    fs::write(temp.path().join("notes.txt"), "hello").unwrap();
    let before_status = git_stdout(&["status", "--porcelain"], temp.path());

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    let error = with_snapshot(&repo, None, || Ok(())).unwrap_err();

    assert!(error.to_string().contains("bogus"), "got: {error}");
    assert_eq!(git_stdout(&["status", "--porcelain"], temp.path()), before_status);
    assert_eq!(
        git_stdout(&["branch", "--list", SNAPSHOT_BRANCH], temp.path()),
        ""
    );
}

// =============================================================================
// force marks
// =============================================================================

#[test]
fn snapshot_includes_force_marked_ignored_files() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    fs::write(temp.path().join(".gitignore"), "secret.env\nnotes.txt\n").unwrap();
    fs::write(
        temp.path().join(".gitattributes"),
        "secret.env repovault-snapshot=force\nnotes.txt repovault-snapshot=only-if-staged\n",
    )
    .unwrap();
    run_git(&["add", "."], temp.path());
    run_git(&["commit", "-m", "Initial commit"], temp.path());
    fs::write(temp.path().join("secret.env"), "TOKEN=1").unwrap();
    fs::write(temp.path().join("notes.txt"), "scratch").unwrap();

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    let mut tree = String::new();
    with_snapshot(&repo, None, || {
        tree = git_stdout(
            &["ls-tree", "-r", "--name-only", SNAPSHOT_BRANCH],
            temp.path(),
        );
        Ok(())
    })
    .unwrap();

    // Force-marked ignored files travel with the snapshot; only-if-staged
    // ones stay out unless the user staged them.
    assert!(tree.contains("secret.env"));
    assert!(!tree.contains("notes.txt"));
    // Afterwards the file is still ignored and untracked.
    assert!(run_git(&["check-ignore", "-q", "secret.env"], temp.path()));
    assert_eq!(
        git_stdout(&["status", "--porcelain"], temp.path()),
        ""
    );
}

#[test]
fn snapshot_batches_large_force_marked_trees() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    fs::write(temp.path().join(".gitignore"), "big/\n").unwrap();
    fs::write(temp.path().join(".gitattributes"), "big/** repovault-snapshot=force\n").unwrap();
    run_git(&["add", "."], temp.path());
    run_git(&["commit", "-m", "Initial commit"], temp.path());
    fs::create_dir(temp.path().join("big")).unwrap();
    // More files than fit in one add invocation.
    for index in 0..40 {
        fs::write(temp.path().join(format!("big/file{index:02}.bin")), "x").unwrap();
    }

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    let mut tree = String::new();
    with_snapshot(&repo, None, || {
        tree = git_stdout(
            &["ls-tree", "-r", "--name-only", SNAPSHOT_BRANCH],
            temp.path(),
        );
        Ok(())
    })
    .unwrap();

    let captured = tree.lines().filter(|line| line.starts_with("big/")).count();
    assert_eq!(captured, 40);
}

// =============================================================================
// collect_snapshot_paths
// =============================================================================

#[test]
fn collect_marks_reports_values() {
    let temp = temp_dir();
    init_test_repo(temp.path());
    fs::write(
        temp.path().join(".gitattributes"),
        "secret.env repovault-snapshot=force\nnotes.txt repovault-snapshot=only-if-staged\n",
    )
    .unwrap();
    fs::write(temp.path().join("secret.env"), "TOKEN=1").unwrap();
    fs::write(temp.path().join("notes.txt"), "scratch").unwrap();
    fs::write(temp.path().join("plain.txt"), "plain").unwrap();

    let context = test_context();
    let repo = open_repo(&context, temp.path());
    let marks = collect_snapshot_paths(&repo, None).unwrap();

    let rendered: Vec<String> = marks
        .iter()
        .map(|(path, behavior)| format!("{path} - {behavior}"))
        .collect();
    assert!(rendered.contains(&"secret.env - force".to_string()), "got: {rendered:?}");
    assert!(
        rendered.contains(&"notes.txt - only-if-staged".to_string()),
        "got: {rendered:?}"
    );
    assert!(!rendered.iter().any(|line| line.contains("plain.txt")));
}
