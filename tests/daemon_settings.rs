// tests/daemon_settings.rs

use std::path::{Path, PathBuf};

use clap::Parser;

use fileknock::cli::{CliArgs, LogLevel};
use fileknock::config::{DEFAULT_CONFIG_DIRS, Settings, SettingsFile};
use fileknock::errors::FileknockError;
use fileknock::exec::EnvPolicy;

fn args(argv: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("fileknockd").chain(argv.iter().copied()))
        .expect("valid arguments")
}

#[test]
fn defaults_without_flags_or_file() {
    let settings = Settings::merge(&args(&[]), SettingsFile::default());

    let expected: Vec<PathBuf> = DEFAULT_CONFIG_DIRS.iter().map(PathBuf::from).collect();
    assert_eq!(settings.config_dirs, expected);
    assert_eq!(settings.env_policy, EnvPolicy::Isolated);
    assert_eq!(settings.log_level, None);
    assert!(!settings.dry_run);
}

#[test]
fn settings_file_fills_in_missing_flags() {
    let file = SettingsFile::parse(
        Path::new("fileknock.toml"),
        r#"
config_dirs = ["/srv/fileknock.d"]
inherit_env = true
log_level = "debug"
"#,
    )
    .unwrap();

    let settings = Settings::merge(&args(&[]), file);

    assert_eq!(settings.config_dirs, vec![PathBuf::from("/srv/fileknock.d")]);
    assert_eq!(settings.env_policy, EnvPolicy::Inherit);
    assert_eq!(settings.log_level, Some(LogLevel::Debug));
}

#[test]
fn cli_flags_override_the_settings_file() {
    let file = SettingsFile::parse(
        Path::new("fileknock.toml"),
        "config_dirs = [\"/srv/fileknock.d\"]\nlog_level = \"debug\"\n",
    )
    .unwrap();

    let settings = Settings::merge(
        &args(&[
            "--config-dir",
            "/a",
            "--config-dir",
            "/b",
            "--log-level",
            "warn",
            "--dry-run",
        ]),
        file,
    );

    assert_eq!(
        settings.config_dirs,
        vec![PathBuf::from("/a"), PathBuf::from("/b")]
    );
    assert_eq!(settings.log_level, Some(LogLevel::Warn));
    assert!(settings.dry_run);
}

#[test]
fn unknown_settings_key_is_rejected() {
    let err = SettingsFile::parse(Path::new("bad.toml"), "inherit_environment = true\n")
        .unwrap_err();

    match err {
        FileknockError::SettingsError { path, reason } => {
            assert_eq!(path, PathBuf::from("bad.toml"));
            assert!(reason.contains("inherit_environment"), "reason: {reason}");
        }
        other => panic!("Expected SettingsError, got: {:?}", other),
    }
}

#[test]
fn missing_settings_file_is_a_settings_error() {
    let dir = tempfile::tempdir().unwrap();
    let cli = args(&[
        "--settings",
        dir.path().join("absent.toml").to_str().unwrap(),
    ]);

    let err = Settings::resolve(&cli).unwrap_err();

    assert!(matches!(err, FileknockError::SettingsError { .. }));
    assert!(!err.is_recoverable());
}
