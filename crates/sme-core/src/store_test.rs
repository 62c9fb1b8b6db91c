use super::*;
use crate::manifest::{Metric, NodeRelation, SemanticModel};
use tempfile::TempDir;

fn sample_manifest() -> Manifest {
    let mut manifest = Manifest::new();
    let mut model = SemanticModel::new("orders", NodeRelation::new("orders", "main", "shop"));
    model.editor.id = Some(Uuid::new_v4());
    manifest.semantic_models.push(model);
    manifest.metrics.push(Metric::simple("revenue", "orders.revenue"));
    manifest
}

#[test]
fn test_validate_version_name() {
    assert!(validate_version_name("draft-2024_01").is_ok());
    assert!(validate_version_name("").is_err());
    assert!(validate_version_name("../escape").is_err());
    assert!(validate_version_name("with space").is_err());
}

#[test]
fn test_save_and_load() {
    let dir = TempDir::new().unwrap();
    let store = FileVersionStore::new(dir.path().join("versions"));

    let saved = store.save("baseline", &sample_manifest()).unwrap();
    assert_eq!(saved.name, "baseline");
    assert!(dir.path().join("versions/baseline.json").exists());

    let loaded = store.load("baseline").unwrap();
    assert_eq!(loaded, saved);
    assert!(loaded.manifest.semantic_models[0].editor.is_empty());
}

#[test]
fn test_save_replaces_existing() {
    let dir = TempDir::new().unwrap();
    let store = FileVersionStore::new(dir.path());

    let first = store.save("draft", &sample_manifest()).unwrap();
    let mut changed = sample_manifest();
    changed.metrics.clear();
    let second = store.save("draft", &changed).unwrap();

    assert_ne!(first.id, second.id);
    assert!(store.load("draft").unwrap().manifest.metrics.is_empty());
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_list_sorted_by_name() {
    let dir = TempDir::new().unwrap();
    let store = FileVersionStore::new(dir.path());
    store.save("zeta", &sample_manifest()).unwrap();
    store.save("alpha", &Manifest::new()).unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let list = store.list().unwrap();
    let names: Vec<&str> = list.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names, vec!["alpha", "zeta"]);
    assert_eq!(list[1].semantic_models, 1);
    assert_eq!(list[1].metrics, 1);
}

#[test]
fn test_list_missing_dir_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileVersionStore::new(dir.path().join("never-created"));
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_load_and_delete_missing() {
    let dir = TempDir::new().unwrap();
    let store = FileVersionStore::new(dir.path());
    assert!(matches!(
        store.load("ghost"),
        Err(CoreError::VersionNotFound { .. })
    ));
    assert!(matches!(
        store.delete("ghost"),
        Err(CoreError::VersionNotFound { .. })
    ));
}

#[test]
fn test_delete() {
    let dir = TempDir::new().unwrap();
    let store = FileVersionStore::new(dir.path());
    store.save("old", &sample_manifest()).unwrap();
    store.delete("old").unwrap();
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_invalid_name_rejected_before_io() {
    let dir = TempDir::new().unwrap();
    let store = FileVersionStore::new(dir.path().join("versions"));
    assert!(matches!(
        store.save("a/b", &sample_manifest()),
        Err(CoreError::InvalidVersionName { .. })
    ));
    assert!(!dir.path().join("versions").exists());
}

#[test]
fn test_write_failure_reports_path() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("versions");
    std::fs::write(&blocker, "not a directory").unwrap();
    let store = FileVersionStore::new(&blocker);

    let err = store.save("draft", &sample_manifest()).unwrap_err();
    assert!(matches!(err, CoreError::IoWithPath { .. }));
    let message = err.to_string();
    assert!(message.starts_with("[E016] I/O error on"));
    assert!(message.contains("versions"));
}
