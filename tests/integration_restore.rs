// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the restore operations.
//!
//! Round-trips real repositories through a backup and checks that the
//! restored working directory matches the original, uncommitted state
//! included.

use repovault::config::GitConfig;
use repovault::git::GitContext;
use repovault::git::snapshot::{RESTORE_REMOTE, SNAPSHOT_BRANCH};
use repovault::ops::backup::{BackupOptions, backup_tree};
use repovault::ops::restore::restore_single;
use repovault::remote::RemoteUrl;
use std::fs;
use std::path::{Path, PathBuf};
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

/// Create an initialized git repo on branch `main` with an initial commit
fn init_test_repo_with_commit(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    run_git(&["init", "-q", "-b", "main"], dir);
    run_git(&["config", "user.email", "test@test.com"], dir);
    run_git(&["config", "user.name", "Test"], dir);
    fs::write(dir.join("README.md"), "# Test").unwrap();
    run_git(&["add", "."], dir);
    run_git(&["commit", "-m", "Initial commit"], dir);
}

/// Backs `repo` up under `remote` and returns the backup location.
fn back_up(context: &GitContext, source_root: &Path, remote: &Path, subpath: &str) -> RemoteUrl {
    let root = RemoteUrl::parse(remote.to_str().unwrap()).unwrap();
    let options = BackupOptions::builder().build();
    backup_tree(context, source_root, &root, &options).unwrap();
    RemoteUrl::parse(remote.join(subpath).to_str().unwrap()).unwrap()
}

/// Restores `backup` into `into`, returning the restored repository path.
fn restore(context: &GitContext, backup: &RemoteUrl, into: &Path, drop_snapshot: bool) -> PathBuf {
    restore_single(context, backup, into, drop_snapshot).unwrap();
    let name = backup.name().unwrap();
    into.join(name)
}

// =============================================================================
// round trip
// =============================================================================

#[test]
fn restore_round_trip_preserves_working_state() {
    let source = temp_dir();
    let repo = source.path().join("app");
    init_test_repo_with_commit(&repo);
    fs::write(repo.join(".gitignore"), "secret.env\n").unwrap();
    fs::write(repo.join(".gitattributes"), "secret.env repovault-snapshot=force\n").unwrap();
    run_git(&["add", "."], &repo);
    run_git(&["commit", "-m", "Add marks"], &repo);
    run_git(&["branch", "feature"], &repo);

    // Uncommitted state: one staged file, one unstaged edit, one untracked
    // file, one ignored-but-marked file.
    fs::write(repo.join("staged.txt"), "staged content").unwrap();
    run_git(&["add", "staged.txt"], &repo);
    fs::write(repo.join("README.md"), "# Modified").unwrap();
    fs::write(repo.join("untracked.txt"), "untracked").unwrap();
    fs::write(repo.join("secret.env"), "TOKEN=1").unwrap();

    let before_status = git_stdout(&["status", "--porcelain"], &repo);
    let before_head = git_stdout(&["rev-parse", "HEAD"], &repo);

    let context = test_context();
    let remote = temp_dir();
    let backup = back_up(&context, source.path(), remote.path(), "app");

    let target = temp_dir();
    let restored = restore(&context, &backup, target.path(), false);

    // Same branch, same commit, same uncommitted state.
    assert_eq!(git_stdout(&["branch", "--show-current"], &restored), "main");
    assert_eq!(git_stdout(&["rev-parse", "HEAD"], &restored), before_head);
    assert_eq!(git_stdout(&["status", "--porcelain"], &restored), before_status);

    // Contents survived, index entries included.
    assert_eq!(fs::read_to_string(restored.join("README.md")).unwrap(), "# Modified");
    assert_eq!(fs::read_to_string(restored.join("untracked.txt")).unwrap(), "untracked");
    assert_eq!(fs::read_to_string(restored.join("secret.env")).unwrap(), "TOKEN=1");
    assert_eq!(
        git_stdout(&["show", ":staged.txt"], &restored),
        "staged content"
    );
    assert!(run_git(&["check-ignore", "-q", "secret.env"], &restored));

    // Other branches exist again; the transport plumbing does not.
    assert!(run_git(&["rev-parse", "--verify", "-q", "refs/heads/feature"], &restored));
    assert_eq!(git_stdout(&["branch", "--list", SNAPSHOT_BRANCH], &restored), "");
    assert_eq!(git_stdout(&["remote"], &restored), "");
}

#[test]
fn restore_round_trip_preserves_detached_head() {
    let source = temp_dir();
    let repo = source.path().join("app");
    init_test_repo_with_commit(&repo);
    let head = git_stdout(&["rev-parse", "HEAD"], &repo);
    run_git(&["checkout", "-q", "--detach"], &repo);
    fs::write(repo.join("README.md"), "# Detached edit").unwrap();

    let context = test_context();
    let remote = temp_dir();
    let backup = back_up(&context, source.path(), remote.path(), "app");

    let target = temp_dir();
    let restored = restore(&context, &backup, target.path(), false);

    assert!(!run_git(&["symbolic-ref", "-q", "HEAD"], &restored));
    assert_eq!(git_stdout(&["rev-parse", "HEAD"], &restored), head);
    assert_eq!(
        fs::read_to_string(restored.join("README.md")).unwrap(),
        "# Detached edit"
    );
}

#[test]
fn restore_survives_backup_deletion() {
    let source = temp_dir();
    let repo = source.path().join("app");
    init_test_repo_with_commit(&repo);

    let context = test_context();
    let remote = temp_dir();
    let backup = back_up(&context, source.path(), remote.path(), "app");

    let target = temp_dir();
    let restored = restore(&context, &backup, target.path(), false);

    // The clone must not share storage with the backup directory.
    drop(remote);
    assert!(run_git(&["fsck", "--no-progress"], &restored));
    assert_eq!(
        fs::read_to_string(restored.join("README.md")).unwrap(),
        "# Test"
    );
}

// =============================================================================
// drop_snapshot
// =============================================================================

#[test]
fn restore_can_keep_snapshot_commits_as_history() {
    let source = temp_dir();
    let repo = source.path().join("app");
    init_test_repo_with_commit(&repo);
    fs::write(repo.join("untracked.txt"), "untracked").unwrap();

    let context = test_context();
    let remote = temp_dir();
    let backup = back_up(&context, source.path(), remote.path(), "app");

    let target = temp_dir();
    let restored = restore(&context, &backup, target.path(), true);

    // The snapshot commits stay checked out as plain history.
    assert_eq!(
        git_stdout(&["branch", "--show-current"], &restored),
        SNAPSHOT_BRANCH
    );
    assert!(git_stdout(&["log", "-1", "--format=%s"], &restored).starts_with("unstaged@"));
    assert_eq!(git_stdout(&["status", "--porcelain"], &restored), "");
    assert_eq!(
        fs::read_to_string(restored.join("untracked.txt")).unwrap(),
        "untracked"
    );
    // Tracking branches were still recreated and the remote removed.
    assert!(run_git(&["rev-parse", "--verify", "-q", "refs/heads/main"], &restored));
    assert_eq!(git_stdout(&["remote"], &restored), "");
}

// =============================================================================
// destination handling
// =============================================================================

#[test]
fn restore_rejects_a_nonempty_destination() {
    let source = temp_dir();
    let repo = source.path().join("app");
    init_test_repo_with_commit(&repo);

    let context = test_context();
    let remote = temp_dir();
    let backup = back_up(&context, source.path(), remote.path(), "app");

    let target = temp_dir();
    let occupied = target.path().join("app");
    fs::create_dir(&occupied).unwrap();
    fs::write(occupied.join("keep.txt"), "do not clobber").unwrap();

    let error = restore_single(&context, &backup, target.path(), false).unwrap_err();
    assert!(error.to_string().contains("already exists"), "got: {error:#}");
    assert_eq!(
        fs::read_to_string(occupied.join("keep.txt")).unwrap(),
        "do not clobber"
    );
}

#[test]
fn restore_accepts_an_empty_destination_directory() {
    let source = temp_dir();
    let repo = source.path().join("app");
    init_test_repo_with_commit(&repo);

    let context = test_context();
    let remote = temp_dir();
    let backup = back_up(&context, source.path(), remote.path(), "app");

    let target = temp_dir();
    fs::create_dir(target.path().join("app")).unwrap();

    restore_single(&context, &backup, target.path(), false).unwrap();
    assert!(target.path().join("app/README.md").is_file());
}

// =============================================================================
// degraded remotes
// =============================================================================

#[test]
fn restore_errors_on_a_tip_that_is_not_a_snapshot() {
    let work = temp_dir();
    init_test_repo_with_commit(work.path());
    let remote = temp_dir();
    run_git(
        &["init", "-q", "--bare", "--initial-branch", SNAPSHOT_BRANCH],
        remote.path(),
    );
    // Push ordinary history onto the snapshot branch name.
    let refspec = format!("main:{SNAPSHOT_BRANCH}");
    assert!(run_git(
        &["push", "-q", remote.path().to_str().unwrap(), &refspec],
        work.path()
    ));

    let context = test_context();
    let backup = RemoteUrl::parse(remote.path().to_str().unwrap()).unwrap();
    let target = temp_dir();
    let error = restore_single(&context, &backup, target.path(), false).unwrap_err();

    assert!(
        error.to_string().contains("not a snapshot marker"),
        "got: {error:#}"
    );
}

#[test]
fn restore_degrades_gracefully_without_a_snapshot_branch() {
    let source = temp_dir();
    let repo = source.path().join("app");
    init_test_repo_with_commit(&repo);
    run_git(&["branch", "feature"], &repo);

    let context = test_context();
    let remote = temp_dir();
    let root = RemoteUrl::parse(remote.path().to_str().unwrap()).unwrap();
    let plain = BackupOptions::builder().snapshot(false).build();
    backup_tree(&context, source.path(), &root, &plain).unwrap();

    let backup = RemoteUrl::parse(remote.path().join("app").to_str().unwrap()).unwrap();
    let target = temp_dir();
    restore_single(&context, &backup, target.path(), false).unwrap();

    // No snapshot to unwind: the clone keeps its branches and loses the
    // transport remote, the checkout is left for the user.
    let restored = target.path().join("app");
    assert!(run_git(&["rev-parse", "--verify", "-q", "refs/heads/main"], &restored));
    assert!(run_git(&["rev-parse", "--verify", "-q", "refs/heads/feature"], &restored));
    assert_eq!(git_stdout(&["remote"], &restored), "");
}

// =============================================================================
// transport cleanup
// =============================================================================

#[test]
fn restore_removes_every_trace_of_the_transport() {
    let source = temp_dir();
    let repo = source.path().join("app");
    init_test_repo_with_commit(&repo);
    fs::write(repo.join("untracked.txt"), "untracked").unwrap();

    let context = test_context();
    let remote = temp_dir();
    let backup = back_up(&context, source.path(), remote.path(), "app");

    let target = temp_dir();
    let restored = restore(&context, &backup, target.path(), false);

    // No remote, no remote-tracking refs, no snapshot branch, and the
    // synthetic commits are unreachable.
    assert_eq!(git_stdout(&["remote"], &restored), "");
    assert_eq!(
        git_stdout(&["for-each-ref", &format!("refs/remotes/{RESTORE_REMOTE}")], &restored),
        ""
    );
    assert_eq!(git_stdout(&["branch", "--list", SNAPSHOT_BRANCH], &restored), "");
    let subjects = git_stdout(&["log", "--all", "--format=%s"], &restored);
    assert!(
        !subjects.contains("unstaged@") && !subjects.contains("staged@"),
        "snapshot commits still reachable: {subjects}"
    );
}
