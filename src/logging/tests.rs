// repovault: Git Working-State Backup Tool
//
// SPDX-FileCopyrightText: 2026 The repovault authors
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogLevel};

#[test]
fn test_log_level_conversion() {
    let conversions = vec![
        ("from_int(0)", LogLevel::from_int(0)),
        ("from_int(3)", LogLevel::from_int(3)),
        ("from_int(5)", LogLevel::from_int(5)),
        ("from_int(100)", LogLevel::from_int(100)),
    ];
    assert_eq!(conversions[0].1, LogLevel::SILENT);
    assert_eq!(conversions[1].1, LogLevel::INFO);
    assert_eq!(conversions[2].1, LogLevel::TRACE);
    assert_eq!(conversions[3].1, LogLevel::DUMP, "out of range saturates");
}

#[test]
fn test_log_level_bounds() {
    assert!(LogLevel::new(0).is_ok());
    assert!(LogLevel::new(6).is_ok());
    assert!(LogLevel::new(7).is_err());
    assert_eq!(LogLevel::from_u8(7), None);
}

#[test]
fn test_filter_strings() {
    assert_eq!(LogLevel::SILENT.to_filter_string(), "off");
    assert_eq!(LogLevel::WARN.to_filter_string(), "warn");
    assert_eq!(LogLevel::DUMP.to_filter_string(), "trace");
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert!(config.log_file().is_none());
    assert!(!config.show_target());
}

#[test]
fn test_log_level_serde_round_trip() {
    let level = LogLevel::DEBUG;
    let json = serde_json::to_string(&level).expect("serialize");
    assert_eq!(json, "4");
    let back: LogLevel = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, level);

    let invalid: Result<LogLevel, _> = serde_json::from_str("9");
    assert!(invalid.is_err(), "level 9 must not deserialize");
}
