//! Config file resolution through `PEDIGREE_CONFIG`.

use pigeon_pedigree::config::PedigreeConfig;
use pigeon_pedigree::constants::CONFIG_PATH_ENV;
use serial_test::serial;
use std::path::PathBuf;
use tempfile::TempDir;

/// Sets `PEDIGREE_CONFIG` for the lifetime of the guard.
struct EnvGuard;

impl EnvGuard {
    fn set(value: &std::path::Path) -> Self {
        unsafe { std::env::set_var(CONFIG_PATH_ENV, value) };
        Self
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe { std::env::remove_var(CONFIG_PATH_ENV) };
    }
}

#[tokio::test]
#[serial]
async fn test_env_path_is_used_when_no_flag_given() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("from-env.toml");
    std::fs::write(&path, "[pedigree]\ngenerations = 6\nannotation_levels = 0\n").unwrap();
    let _guard = EnvGuard::set(&path);

    assert_eq!(PedigreeConfig::resolve_path(None).unwrap(), path);

    let config = PedigreeConfig::load().await.unwrap();
    assert_eq!(config.pedigree.generations, 6);
    assert_eq!(config.pedigree.annotation_levels, 0);
}

#[tokio::test]
#[serial]
async fn test_explicit_path_beats_env() {
    let temp = TempDir::new().unwrap();
    let env_path = temp.path().join("env.toml");
    let explicit = temp.path().join("explicit.toml");
    std::fs::write(&explicit, "[pedigree]\ngenerations = 2\n").unwrap();
    let _guard = EnvGuard::set(&env_path);

    assert_eq!(PedigreeConfig::resolve_path(Some(explicit.clone())).unwrap(), explicit);

    let config = PedigreeConfig::load_with_optional(Some(explicit)).await.unwrap();
    assert_eq!(config.pedigree.generations, 2);
}

#[tokio::test]
#[serial]
async fn test_missing_env_file_falls_back_to_defaults() {
    let temp = TempDir::new().unwrap();
    let _guard = EnvGuard::set(&temp.path().join("nowhere.toml"));

    let config = PedigreeConfig::load().await.unwrap();
    assert_eq!(config, PedigreeConfig::default());
}

#[tokio::test]
#[serial]
async fn test_invalid_env_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.toml");
    std::fs::write(&path, "[lookup]\ntimeout_secs = 0\n").unwrap();
    let _guard = EnvGuard::set(&path);

    let err = PedigreeConfig::load().await.unwrap_err();
    assert!(format!("{err:#}").contains("timeout_secs"));
}

#[test]
#[serial]
fn test_empty_env_value_is_ignored() {
    let _guard = EnvGuard::set(&PathBuf::new());

    let resolved = PedigreeConfig::resolve_path(None).unwrap();
    assert_eq!(resolved, PedigreeConfig::default_path().unwrap());
}
