/// Provider-config preparation
use std::fs;

use mcp_subfinder_server::config::*;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

#[test]
fn test_missing_config_is_created_empty() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join(PROVIDER_CONFIG_FILE);

    assert_ok!(ensure_provider_config(&path));

    assert!(path.exists());
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[test]
fn test_existing_config_is_left_alone() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join(PROVIDER_CONFIG_FILE);
    fs::write(&path, "crtsh: []\n").unwrap();

    assert_ok!(ensure_provider_config(&path));

    assert_eq!(fs::read_to_string(&path).unwrap(), "crtsh: []\n");
}

#[test]
fn test_unwritable_location_is_an_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    // A regular file cannot act as a parent directory
    assert_err!(ensure_provider_config(&blocker.join(PROVIDER_CONFIG_FILE)));
}

#[test]
fn test_default_path_uses_config_file_name() {
    let path = default_provider_config_path();

    assert_eq!(
        path.file_name().and_then(|name| name.to_str()),
        Some(PROVIDER_CONFIG_FILE)
    );
}
