// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::cli::snapshot::SnapshotCommand;
use crate::cli::{Cli, Command};
use clap::Parser;
use std::path::Path;

#[test]
fn test_parse_version() {
    let cli = Cli::try_parse_from(["repovault", "version"]).unwrap();
    assert!(matches!(cli.command, Some(Command::Version)));
    assert!(cli.global.configs.is_empty());
    assert_eq!(cli.global.log_level, None);
}

#[test]
fn test_parse_global_options() {
    let cli = Cli::try_parse_from([
        "repovault",
        "-l",
        "5",
        "--log-file",
        "/tmp/vault.log",
        "backup",
        "projects",
        "/mnt/backups",
    ])
    .unwrap();
    assert_eq!(cli.global.log_level, Some(5));
    assert_eq!(cli.global.file_log_level, None);
    assert_eq!(cli.global.log_file.as_deref(), Some(Path::new("/tmp/vault.log")));
    assert!(matches!(cli.command, Some(Command::Backup(_))));
}

#[test]
fn test_parse_config_files_repeat() {
    let cli = Cli::try_parse_from(["repovault", "-c", "a.toml", "--config", "b.toml", "version"])
        .unwrap();
    assert_eq!(cli.global.configs.len(), 2);
    assert_eq!(cli.global.configs[0], Path::new("a.toml"));
    assert_eq!(cli.global.configs[1], Path::new("b.toml"));
}

#[test]
fn test_rejects_out_of_range_log_level() {
    assert!(Cli::try_parse_from(["repovault", "-l", "7", "version"]).is_err());
}

#[test]
fn test_parse_backup() {
    let cli = Cli::try_parse_from([
        "repovault",
        "backup",
        "projects",
        "/mnt/backups",
        "--ignore-dir",
        ".*/target",
        "--no-snapshot",
    ])
    .unwrap();
    let Some(Command::Backup(args)) = cli.command else {
        panic!("expected backup command");
    };
    assert_eq!(args.source_directory, Path::new("projects"));
    assert_eq!(args.backup_root, "/mnt/backups");
    assert!(args.no_snapshot);
    let filter = args.ignore_dir.expect("filter parsed");
    assert!(filter.is_ignored(Path::new("sub/target")));
    assert!(!filter.is_ignored(Path::new("sub/src")));
}

#[test]
fn test_parse_backup_requires_both_paths() {
    assert!(Cli::try_parse_from(["repovault", "backup", "projects"]).is_err());
}

#[test]
fn test_rejects_invalid_ignore_dir_regex() {
    let result = Cli::try_parse_from([
        "repovault",
        "backup",
        "projects",
        "/mnt/backups",
        "--ignore-dir",
        "(",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_parse_backup_single() {
    let cli = Cli::try_parse_from([
        "repovault",
        "backup-single",
        "projects/app",
        "ssh://host/backups/app.git",
    ])
    .unwrap();
    let Some(Command::BackupSingle(args)) = cli.command else {
        panic!("expected backup-single command");
    };
    assert_eq!(args.repository, Path::new("projects/app"));
    assert_eq!(args.backup_url, "ssh://host/backups/app.git");
    assert!(!args.no_snapshot);
}

#[test]
fn test_parse_restore_defaults() {
    let cli = Cli::try_parse_from(["repovault", "restore", "/mnt/backups/app"]).unwrap();
    let Some(Command::Restore(args)) = cli.command else {
        panic!("expected restore command");
    };
    assert_eq!(args.backup_path, "/mnt/backups/app");
    assert_eq!(args.restore_to, Path::new("."));
    assert!(!args.drop_snapshot);
}

#[test]
fn test_parse_restore_full() {
    let cli = Cli::try_parse_from([
        "repovault",
        "restore",
        "file:///mnt/backups/app",
        "restored",
        "--drop-snapshot",
    ])
    .unwrap();
    let Some(Command::Restore(args)) = cli.command else {
        panic!("expected restore command");
    };
    assert_eq!(args.restore_to, Path::new("restored"));
    assert!(args.drop_snapshot);
}

#[test]
fn test_parse_snapshot_list() {
    let cli = Cli::try_parse_from(["repovault", "snapshot", "list"]).unwrap();
    let Some(Command::Snapshot(SnapshotCommand::List(args))) = cli.command else {
        panic!("expected snapshot list command");
    };
    assert_eq!(args.source_directory, Path::new("."));
    assert!(args.ignore_dir.is_none());
}

#[test]
fn test_parse_snapshot_list_with_filter() {
    let cli = Cli::try_parse_from([
        "repovault",
        "snapshot",
        "list",
        "projects",
        "--ignore-dir",
        "vendor",
    ])
    .unwrap();
    let Some(Command::Snapshot(SnapshotCommand::List(args))) = cli.command else {
        panic!("expected snapshot list command");
    };
    assert_eq!(args.source_directory, Path::new("projects"));
    assert!(args.ignore_dir.is_some());
}
