use super::*;
use tempfile::TempDir;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: bls_catalog").unwrap();
    assert_eq!(config.name, "bls_catalog");
    assert_eq!(config.database.db_type, DbType::DuckDb);
    assert!(config.is_in_memory_database());
    assert_eq!(config.validation.database_timeout_ms, 5000);
    assert_eq!(config.validation_options(), ValidationOptions::default());
    assert_eq!(config.export_defaults(), ExportDefaults::default());

    let root = PathBuf::from("/tmp/project");
    assert_eq!(
        config.versions_path_absolute(&root),
        root.join(".sme/versions")
    );
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: bls_catalog
database:
  type: duckdb
  path: ./bls_data.duckdb
validation:
  database_timeout_ms: 250
  max_suggestions: 5
  max_edit_distance: 2
export:
  time_spine_location: analytics.time_spine
  time_spine_column: ds
  time_spine_grain: month
versions_path: snapshots
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.database.path, "./bls_data.duckdb");
    assert!(!config.is_in_memory_database());
    assert_eq!(config.database_timeout(), Duration::from_millis(250));
    assert_eq!(config.validation_options().max_suggestions, 5);
    assert_eq!(config.validation_options().max_edit_distance, 2);

    let defaults = config.export_defaults();
    assert_eq!(defaults.time_spine_location, "analytics.time_spine");
    assert_eq!(defaults.time_spine_column, "ds");
    assert_eq!(defaults.time_spine_grain, TimeGranularity::Month);
    assert_eq!(config.versions_path, "snapshots");
}

#[test]
fn test_unknown_key_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: x\nmodel_paths: [models]");
    assert!(result.is_err());

    let nested: Result<Config, _> =
        serde_yaml::from_str("name: x\nvalidation:\n  max_sugestions: 2");
    assert!(nested.is_err());
}

#[test]
fn test_invalid_grain_rejected() {
    let result: Result<Config, _> =
        serde_yaml::from_str("name: x\nexport:\n  time_spine_grain: hour");
    let err = result.unwrap_err().to_string();
    assert!(err.contains("unknown time granularity 'hour'"));
}

#[test]
fn test_load_from_dir() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("sme.yml"), "name: from_dir\n").unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "from_dir");
}

#[test]
fn test_load_from_dir_yaml_extension() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("sme.yaml"), "name: yaml_ext\n").unwrap();

    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "yaml_ext");
}

#[test]
fn test_load_malformed_yaml_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sme.yml");
    std::fs::write(&path, "name: [unclosed\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::YamlParse(_)));
    assert!(err.to_string().starts_with("[E015]"));
}

#[test]
fn test_load_from_dir_missing() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
}

#[test]
fn test_load_or_default_without_file() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_or_default(dir.path()).unwrap();
    assert_eq!(config.name, "semantic_manifest");
    assert_eq!(config.versions_path, ".sme/versions");
}

#[test]
fn test_empty_name_invalid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sme.yml");
    std::fs::write(&path, "name: \"\"\n").unwrap();

    let err = Config::load(&path).unwrap_err();
    assert!(err.to_string().contains("[E003]"));
}

#[test]
fn test_zero_timeout_invalid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("sme.yml");
    std::fs::write(&path, "name: x\nvalidation:\n  database_timeout_ms: 0\n").unwrap();

    assert!(matches!(
        Config::load(&path),
        Err(CoreError::ConfigInvalid { .. })
    ));
}
