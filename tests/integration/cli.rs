//! The `pedigree` binary, end to end.

use assert_cmd::Command;
use pigeon_pedigree::models::{BirdRef, CompetitionResult};
use pigeon_pedigree::test_utils::fixtures;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use super::http_lookup::{Backend, TOKEN, spawn_backend};

/// Command isolated from the user's home, config and terminal.
fn pedigree(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pedigree").unwrap();
    cmd.env("HOME", home)
        .env("PEDIGREE_CONFIG", home.join("absent-config.toml"))
        .env("PEDIGREE_NO_PROGRESS", "1")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn write_registry(dir: &Path) -> PathBuf {
    let path = dir.join("loft.json");
    fs::write(&path, fixtures::registry_json()).unwrap();
    path
}

#[test]
fn test_tree_text_from_registry() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(temp.path());

    let output = pedigree(temp.path())
        .args(["tree", "nl-2021-1001", "--format", "text", "--registry"])
        .arg(&registry)
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines[0], "NL-2021-1001 \"Blue Lightning\" (male)");
    assert_eq!(lines[1], "  - Barcelona 2024-07-05 1092.5 km #14");
    assert_eq!(lines[2], "  sire NL-2018-2001 \"Old Warrior\" (male)");
    assert_eq!(lines[3], "    sire NL-2018-2001 \"Old Warrior\" (male) (repeats an ancestor)");
    assert_eq!(lines[4], "  dam NL-2019-3001 \"Silver Queen\" (female)");
    assert_eq!(lines[5], "    sire NL-2015-4001 (male)");
    assert_eq!(lines.len(), 6);
}

#[test]
fn test_show_missing_renders_placeholders() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(temp.path());

    pedigree(temp.path())
        .args(["tree", "NL-2021-1001", "-f", "text", "--show-missing", "-r"])
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("      dam BE-2010-9999 (not in records)"));
}

#[test]
fn test_tree_format_draws_connectors_and_summary() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(temp.path());

    pedigree(temp.path())
        .args(["tree", "NL-2021-1001", "-r"])
        .arg(&registry)
        .assert()
        .success()
        .stdout(predicate::str::contains("├── sire: NL-2018-2001"))
        .stdout(predicate::str::contains("└── dam: NL-2019-3001"))
        .stdout(predicate::str::contains("5 birds across 2 generations"));
}

#[test]
fn test_json_export() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(temp.path());

    let output = pedigree(temp.path())
        .args(["tree", "NL-2021-1001", "--three-generation", "--format", "json", "--registry"])
        .arg(&registry)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["subject"], "NL-2021-1001");
    assert_eq!(json["generations"], 3);
    assert_eq!(json["stats"]["nodes"], 5);
    assert_eq!(json["stats"]["cycle_leaves"], 1);
    assert_eq!(json["tree"]["father"]["father"]["leaf"], "cycle");
    assert_eq!(json["tree"]["mother"]["father"]["unresolved_mother"], "BE-2010-9999");
    assert!(json["tree"]["bird"].get("father").is_none());
}

#[test]
fn test_generations_limit() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(temp.path());

    let output = pedigree(temp.path())
        .args(["tree", "NL-2021-1001", "-g", "1", "-f", "json", "-r"])
        .arg(&registry)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(json["stats"]["depth"], 1);
    assert_eq!(json["stats"]["truncated_leaves"], 2);
}

#[test]
fn test_unknown_bird_fails_with_suggestion() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(temp.path());

    // Only a prefix of a real ring number
    pedigree(temp.path())
        .args(["tree", "NL-2021-100", "-r"])
        .arg(&registry)
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found in records"))
        .stderr(predicate::str::contains("suggestion"));
}

#[test]
fn test_invalid_format_is_rejected() {
    let temp = TempDir::new().unwrap();
    let registry = write_registry(temp.path());

    pedigree(temp.path())
        .args(["tree", "NL-2021-1001", "--format", "yaml", "-r"])
        .arg(&registry)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid format"));
}

#[test]
fn test_broken_registry_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    pedigree(temp.path())
        .args(["tree", "NL-1", "-r"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid bird registry"));
}

#[test]
fn test_without_lookup_service_or_registry() {
    let temp = TempDir::new().unwrap();

    pedigree(temp.path())
        .args(["tree", "NL-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base_url"));
}

#[test]
fn test_config_init_show_path() {
    let temp = TempDir::new().unwrap();
    let config = temp.path().join("conf").join("config.toml");

    pedigree(temp.path())
        .args(["config", "path", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    pedigree(temp.path())
        .args(["config", "init", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config"));
    assert!(config.exists());

    pedigree(temp.path())
        .args(["config", "show", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("base_url"))
        .stdout(predicate::str::contains("***"))
        .stdout(predicate::str::contains("YOUR_TOKEN").not());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_tree_against_lookup_service() {
    let backend = Backend::new(vec![
        BirdRef::new("BE-7").with_father("BE-8"),
        BirdRef::new("BE-8").with_mother("BE-9"),
        BirdRef::new("BE-9"),
    ])
    .with_competitions("BE-7", vec![CompetitionResult::new("Narbonne").with_placement(1)]);
    let base = spawn_backend(backend).await;

    let temp = TempDir::new().unwrap();
    let config = temp.path().join("config.toml");
    fs::write(
        &config,
        format!("[lookup]\nbase_url = \"{base}\"\ntoken = \"{TOKEN}\"\nretries = 0\n"),
    )
    .unwrap();

    let home = temp.path().to_path_buf();
    let output = tokio::task::spawn_blocking(move || {
        pedigree(&home).args(["tree", "be-7", "-f", "text", "--config"]).arg(&config).output().unwrap()
    })
    .await
    .unwrap();

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("BE-7 (unknown)"));
    assert!(stdout.contains("  - Narbonne #1"));
    assert!(stdout.contains("  sire BE-8 (unknown)"));
    assert!(stdout.contains("    dam BE-9 (unknown)"));
}
