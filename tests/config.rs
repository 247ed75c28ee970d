//! Configuration loading and validation.

use std::io::Write;

use tasklane::config::Config;
use tasklane::sync::hierarchy::IndentPlacement;

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn defaults_are_usable() {
    let config = Config::default();

    assert_eq!(config.sync.page_size, 100);
    assert!(!config.sync.delete_stale_on_sync);
    assert_eq!(config.sync.indent_placement(), IndentPlacement::End);
    assert_eq!(config.storage.database_path, None);
    assert!(!config.logging.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn partial_file_fills_in_defaults() {
    let file = write_config(
        r#"
[sync]
page_size = 25
"#,
    );

    let config = Config::load_from(file.path()).unwrap();

    assert_eq!(config.sync.page_size, 25);
    assert!(!config.sync.delete_stale_on_sync);
    assert_eq!(config.sync.indent_placement(), IndentPlacement::End);
}

#[test]
fn full_file_parses() {
    let file = write_config(
        r#"
[sync]
page_size = 50
delete_stale_on_sync = true
indent_placement = "start"

[storage]
database_path = "/tmp/tasklane-test.sqlite"

[logging]
enabled = true
level = "debug"
"#,
    );

    let config = Config::load_from(file.path()).unwrap();

    assert_eq!(config.sync.page_size, 50);
    assert!(config.sync.delete_stale_on_sync);
    assert_eq!(config.sync.indent_placement(), IndentPlacement::Start);
    assert_eq!(
        config.storage.database_path.as_deref(),
        Some(std::path::Path::new("/tmp/tasklane-test.sqlite"))
    );
    assert!(config.logging.enabled);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn zero_page_size_is_rejected() {
    let file = write_config(
        r#"
[sync]
page_size = 0
"#,
    );

    assert!(Config::load_from(file.path()).is_err());
}

#[test]
fn unknown_indent_placement_is_rejected() {
    let file = write_config(
        r#"
[sync]
indent_placement = "middle"
"#,
    );

    assert!(Config::load_from(file.path()).is_err());
}

#[test]
fn malformed_toml_is_an_error() {
    let file = write_config("sync = not toml");

    assert!(Config::load_from(file.path()).is_err());
}
