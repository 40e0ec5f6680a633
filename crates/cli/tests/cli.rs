//! Smoke tests of the `soundsmith` binary.
//!
//! None of these need the audio tools installed: every case fails or finishes
//! before a tool would be spawned.

use std::io::Write;
use std::process::{Command, Output};

use tempfile::{NamedTempFile, TempDir};

fn soundsmith(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_soundsmith"))
        .args(args)
        .env_remove("SOUNDSMITH_CONFIG")
        .env("RUST_LOG", "error") // Quiet logs during tests
        .output()
        .expect("Failed to run soundsmith")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn test_help_lists_commands() {
    let output = soundsmith(&["--help"]);
    assert!(output.status.success());
    let text = String::from_utf8_lossy(&output.stdout);
    for command in ["probe", "convert", "preview", "wav-to-mp3", "tags", "artwork"] {
        assert!(text.contains(command), "missing {command} in help");
    }
}

#[test]
fn test_missing_file_exits_with_failure() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.flac");

    let output = soundsmith(&["probe", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("file does not exist"));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_unsupported_extension() {
    let output = soundsmith(&["convert", "notes.txt", "notes.mp3"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("unsupported audio format"));
}

#[test]
fn test_wav_cannot_be_tagged() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("a.wav");
    std::fs::write(&file, b"").unwrap();

    let output = soundsmith(&["tags", "write", file.to_str().unwrap(), "artist=Foo"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("cannot be tagged"));
}

#[test]
fn test_malformed_tag_argument_is_usage_error() {
    let output = soundsmith(&["tags", "write", "a.flac", "novalue"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("FIELD=VALUE"));
}

#[test]
fn test_invalid_config_is_rejected() {
    let mut config = NamedTempFile::new().unwrap();
    writeln!(config, "[process]\nlocale = \"C\"").unwrap();

    let output = soundsmith(&[
        "--config",
        config.path().to_str().unwrap(),
        "probe",
        "a.flac",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("UTF-8"));
}

#[test]
fn test_missing_config_file() {
    let output = soundsmith(&["--config", "/nonexistent/soundsmith.toml", "probe", "a.flac"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to load config"));
}

#[test]
fn test_print_metrics() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.flac");

    let output = soundsmith(&["--print-metrics", "probe", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let text = stderr(&output);
    assert!(text.contains("soundsmith_verifications_total"));
    assert!(text.contains("result=\"missing\""));
}
