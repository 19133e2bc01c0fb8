//! Integration tests for ConfigManager and configuration layering
//!
//! These tests verify:
//! - Loading YAML files in both key spellings
//! - Comma separated and list forms of list options
//! - Environment variables overriding the file
//! - Command line options applied on top of file and environment
//! - Default configuration generation and validation into BuildSettings

use camino::Utf8PathBuf;
use clap::Parser;
use qtbuild::cli::{Cli, Command};
use qtbuild::models::{Binding, ToolKind, ToolSpec};
use qtbuild::{BuildConfig, BuildSettings, ConfigManager};
use std::fs;
use tempfile::TempDir;

fn create_test_config_file(content: &str) -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().join("qtbuild.yaml")).unwrap();
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path)
}

#[test]
fn test_load_kebab_case_file() {
    let (_temp_dir, config_path) = create_test_config_file(
        r#"
packages: [myapp, plugins]
languages: cs, de
languages-dir: i18n
bindings: PySide6
replacement-bindings: qtpy
filename-ui: "{name}_ui.py"
tool-timeout: 30
"#,
    );

    let config = ConfigManager::new(&config_path)
        .without_environment()
        .load()
        .unwrap();

    assert_eq!(config.packages, vec!["myapp", "plugins"]);
    assert_eq!(config.languages, vec!["cs", "de"]);
    assert_eq!(config.languages_dir, "i18n");
    assert_eq!(config.bindings, "PySide6");
    assert_eq!(config.replacement_bindings, "qtpy");
    assert_eq!(config.filename_ui, "{name}_ui.py");
    assert_eq!(config.tool_timeout, Some(30));

    // Untouched options keep their defaults
    assert_eq!(config.filename_qrc, "qrc_{name}.py");
    assert_eq!(config.pyrcc, ToolSpec::Preset);
}

#[test]
fn test_load_snake_case_file() {
    let (_temp_dir, config_path) = create_test_config_file(
        r#"
packages: "myapp"
languages_dir: translations
replacement_bindings: Qt
filename_ts: "{lang}/{package}.ts"
"#,
    );

    let config = ConfigManager::new(&config_path)
        .without_environment()
        .load()
        .unwrap();

    assert_eq!(config.packages, vec!["myapp"]);
    assert_eq!(config.languages_dir, "translations");
    assert_eq!(config.replacement_bindings, "Qt");
    assert_eq!(config.filename_ts, "{lang}/{package}.ts");
}

#[test]
fn test_tool_options_from_file() {
    let (_temp_dir, config_path) = create_test_config_file(
        r#"
packages: myapp
pyrcc: ""
pyuic: /opt/qt/bin/pyuic5
"#,
    );

    let config = ConfigManager::new(&config_path)
        .without_environment()
        .load()
        .unwrap();
    assert_eq!(config.pyrcc, ToolSpec::Disabled);
    assert_eq!(config.pyuic, ToolSpec::Program("/opt/qt/bin/pyuic5".into()));

    let settings = BuildSettings::from_config(&config).unwrap();
    assert!(settings.tool(ToolKind::ResourceCompiler).is_none());
    assert_eq!(
        settings.tool(ToolKind::UiCompiler).unwrap().program,
        "/opt/qt/bin/pyuic5"
    );
    assert_eq!(
        settings.tool(ToolKind::TranslationUpdater).unwrap().program,
        "pylupdate5"
    );
}

#[test]
fn test_malformed_file_is_an_error() {
    let (_temp_dir, config_path) = create_test_config_file("packages: [unclosed\n");

    let err = ConfigManager::new(&config_path)
        .without_environment()
        .load()
        .unwrap_err();

    assert!(format!("{:#}", err).contains("qtbuild.yaml"));
}

#[test]
fn test_environment_overrides_file() {
    let (_temp_dir, config_path) = create_test_config_file(
        r#"
packages: myapp
languages: [cs]
replacement-bindings: qtpy
"#,
    );

    // A prefix of its own keeps this test independent from the others
    // SAFETY: no other test reads or writes QTBUILD_ENVTEST_* variables
    unsafe {
        std::env::set_var("QTBUILD_ENVTEST_LANGUAGES", "de, fr");
        std::env::set_var("QTBUILD_ENVTEST_REPLACEMENT_BINDINGS", "Qt");
    }

    let config = ConfigManager::new(&config_path)
        .with_env_prefix("QTBUILD_ENVTEST")
        .load();

    unsafe {
        std::env::remove_var("QTBUILD_ENVTEST_LANGUAGES");
        std::env::remove_var("QTBUILD_ENVTEST_REPLACEMENT_BINDINGS");
    }

    let config = config.unwrap();
    assert_eq!(config.packages, vec!["myapp"]);
    assert_eq!(config.languages, vec!["de", "fr"]);
    assert_eq!(config.replacement_bindings, "Qt");
}

#[test]
fn test_environment_replaces_snake_case_file_keys() {
    let (_temp_dir, config_path) = create_test_config_file(
        r#"
packages: myapp
languages_dir: i18n
filename-ts: "{package}-{lang}.ts"
tool_timeout: 10
"#,
    );

    // SAFETY: no other test reads or writes QTBUILD_SPELLTEST_* variables
    unsafe {
        std::env::set_var("QTBUILD_SPELLTEST_LANGUAGES_DIR", "translations");
        std::env::set_var("QTBUILD_SPELLTEST_FILENAME_TS", "{lang}/{package}.ts");
        std::env::set_var("QTBUILD_SPELLTEST_TOOL_TIMEOUT", "45");
    }

    let config = ConfigManager::new(&config_path)
        .with_env_prefix("QTBUILD_SPELLTEST")
        .load();

    unsafe {
        std::env::remove_var("QTBUILD_SPELLTEST_LANGUAGES_DIR");
        std::env::remove_var("QTBUILD_SPELLTEST_FILENAME_TS");
        std::env::remove_var("QTBUILD_SPELLTEST_TOOL_TIMEOUT");
    }

    let config = config.unwrap();
    assert_eq!(config.packages, vec!["myapp"]);
    assert_eq!(config.languages_dir, "translations");
    assert_eq!(config.filename_ts, "{lang}/{package}.ts");
    assert_eq!(config.tool_timeout, Some(45));
}

#[test]
fn test_options_before_subcommand_reach_the_config() {
    let (_temp_dir, config_path) = create_test_config_file("languages: cs\n");

    let cli = Cli::parse_from([
        "qtbuild",
        "--packages",
        "app",
        "--config",
        config_path.as_str(),
        "build",
    ]);
    assert!(matches!(cli.resolved_command(), Command::Build));

    let mut config = ConfigManager::new(&cli.config)
        .without_environment()
        .load()
        .unwrap();
    cli.build.apply(&mut config);

    assert_eq!(config.packages, vec!["app"]);
    assert_eq!(config.languages, vec!["cs"]);
}

#[test]
fn test_command_line_wins_over_file() {
    let (_temp_dir, config_path) = create_test_config_file(
        r#"
packages: myapp
languages: cs, de
bindings: PyQt5
"#,
    );

    let cli = Cli::parse_from([
        "qtbuild",
        "--config",
        config_path.as_str(),
        "--languages",
        "",
        "--bindings",
        "PyQt6",
    ]);
    assert!(matches!(cli.resolved_command(), Command::Build));

    let mut config = ConfigManager::new(&cli.config)
        .without_environment()
        .load()
        .unwrap();
    cli.build.apply(&mut config);

    assert_eq!(config.packages, vec!["myapp"]);
    assert!(config.languages.is_empty());

    let settings = BuildSettings::from_config(&config).unwrap();
    assert_eq!(settings.binding(), Some(&Binding::PyQt6));
    assert_eq!(
        settings.tool(ToolKind::ResourceCompiler).unwrap().program,
        "rcc"
    );
}

#[test]
fn test_default_file_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = Utf8PathBuf::try_from(temp_dir.path().join("qtbuild.yaml")).unwrap();
    let manager = ConfigManager::new(&config_path).without_environment();

    manager.write_default(false).unwrap();

    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("filename-ui:"));
    assert!(!content.contains("pyrcc"));

    assert_eq!(manager.load().unwrap(), BuildConfig::default());
    assert!(BuildSettings::from_config(&BuildConfig::default()).is_ok());
}

#[test]
fn test_invalid_template_is_rejected_on_validation() {
    let (_temp_dir, config_path) = create_test_config_file(
        r#"
packages: myapp
filename-qrc: "qrc_{nmae}.py"
"#,
    );

    // Loading only reads values, validation catches the typo
    let config = ConfigManager::new(&config_path)
        .without_environment()
        .load()
        .unwrap();

    let err = BuildSettings::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("filename-qrc"));
}
