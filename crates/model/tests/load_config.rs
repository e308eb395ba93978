use std::fs;

use model::{get_config_path, load_config, ConvertConfig, CIRCUIT_TRACKS};
use tempfile::tempdir;

#[test]
fn test_load_config_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("circuit-pack.toml");
    fs::write(&path, "name = \"Live Set\"\ncolor = \"#20a0ff\"\nflavor = \"Circuit Tracks\"\n")
        .expect("Failed to write config");

    let config = load_config(&path).expect("Config loading failed");
    assert_eq!(config.name, "Live Set");
    assert_eq!(config.color, "#20a0ff");
    assert_eq!(config.target_flavor(), Some(&CIRCUIT_TRACKS));
}

#[test]
fn test_missing_keys_use_defaults() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("partial.toml");
    fs::write(&path, "color = \"red\"\n").expect("Failed to write config");

    let config = load_config(&path).expect("Config loading failed");
    assert_eq!(config.name, ConvertConfig::default().name);
    assert_eq!(config.color, "red");
    assert_eq!(config.target_flavor(), Some(ConvertConfig::default_flavor()));
}

#[test]
fn test_unknown_flavor_rejected() {
    let dir = tempdir().expect("Failed to create temp directory");
    let path = dir.path().join("bad.toml");
    fs::write(&path, "flavor = \"launchpad\"\n").expect("Failed to write config");

    assert!(load_config(&path).is_err());
}

#[test]
fn test_missing_file() {
    let dir = tempdir().expect("Failed to create temp directory");
    assert!(load_config(dir.path().join("nope.toml")).is_err());
}

#[test]
fn resolves_local_or_user_path() {
    let path = get_config_path();
    assert!(path.ends_with("circuit-pack.toml") || path.ends_with("config.toml"));
}
