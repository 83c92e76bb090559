use cricdata::config::{AppConfig, ConfigManager};
use cricdata::{CompressionFormat, SourceKind, DEFAULT_TEAMS};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");

    // No source until one is configured or passed on the command line
    assert!(config.source.path.is_none());
    assert!(config.source_kind().is_none());
    assert!(config.source_compression().is_none());

    assert_eq!(config.selection.default_teams, DEFAULT_TEAMS);
    assert!(config.selection.start_season.is_none());

    assert_eq!(config.export.delimiter, b',');
    assert!(config.export.include_header);

    assert_eq!(config.chart.width, 900);
    assert_eq!(config.chart.height, 650);
    assert_eq!(config.watch.interval_secs, 60);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_generate_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let template = config_manager.generate_default_config();

    assert!(template.contains("[source]"));
    assert!(template.contains("[selection]"));
    assert!(template.contains("[export]"));
    assert!(template.contains("[chart]"));
    assert!(template.contains("[watch]"));
    assert!(template.contains("[logging]"));
    assert!(template.contains("version = \"0.1\""));
}

#[test]
fn test_write_default_config() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let path = config_manager.write_default_config(false).unwrap();
    assert!(path.exists());
    assert_eq!(path, config_manager.config_path("config.toml"));

    // Second write without force fails and leaves the file alone
    fs::write(&path, "version = \"0.1\"\n").unwrap();
    let err = config_manager.write_default_config(false).unwrap_err();
    assert!(err.to_string().contains("--force"));
    assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"0.1\"\n");

    config_manager.write_default_config(true).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("[selection]"));
}

#[test]
fn test_load_from_file() {
    let (temp_dir, _config_manager) = setup_test_config_dir();
    let path = temp_dir.path().join("cricdata.toml");
    fs::write(
        &path,
        r#"
[source]
path = "data/ODI_Half_Ball.csv.zst"
kind = "csv"
compression = "zstd"

[selection]
default_teams = ["India", "Australia"]
start_season = "2014-2015"

[chart]
width = 1200

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from(&path).unwrap();
    assert_eq!(
        config.source.path.as_deref(),
        Some("data/ODI_Half_Ball.csv.zst")
    );
    assert_eq!(config.source_kind(), Some(SourceKind::Csv));
    assert_eq!(config.source_compression(), Some(CompressionFormat::Zstd));
    assert_eq!(config.selection.default_teams, vec!["India", "Australia"]);
    assert_eq!(config.selection.start_season.as_deref(), Some("2014-2015"));
    // Unset values keep their defaults
    assert_eq!(config.chart.width, 1200);
    assert_eq!(config.chart.height, 650);
    assert_eq!(config.export.delimiter, b',');
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_load_from_missing_file_is_an_error() {
    let (temp_dir, _config_manager) = setup_test_config_dir();
    let err = AppConfig::load_from(&temp_dir.path().join("nope.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn test_config_merge() {
    let mut base = AppConfig::default();
    let mut other = AppConfig::default();
    other.export.delimiter = b';';
    other.export.include_header = false;
    other.source.sheet = Some("2".to_string());
    other.watch.interval_secs = 5;

    base.merge(other);

    assert_eq!(base.export.delimiter, b';');
    assert!(!base.export.include_header);
    assert_eq!(base.source.sheet.as_deref(), Some("2"));
    assert_eq!(base.watch.interval_secs, 5);
    // Untouched sections keep defaults
    assert_eq!(base.chart.width, 900);
    assert_eq!(base.selection.default_teams.len(), DEFAULT_TEAMS.len());
}

#[test]
fn test_config_validation() {
    assert!(AppConfig::default().validate().is_ok());

    let mut config = AppConfig::default();
    config.version = "2.0".to_string();
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.source.kind = Some("parquet".to_string());
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.source.compression = Some("rar".to_string());
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.chart.height = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.watch.interval_secs = 0;
    assert!(config.validate().is_err());

    let mut config = AppConfig::default();
    config.logging.level = "chatty".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_invalid_toml_is_reported_with_path() {
    let (temp_dir, _config_manager) = setup_test_config_dir();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "[chart\nwidth = ").unwrap();
    let err = AppConfig::load_from(&path).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("Failed to parse config file"));
    assert!(msg.contains("broken.toml"));
}
