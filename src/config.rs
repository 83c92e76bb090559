use color_eyre::eyre::eyre;
use color_eyre::Result;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::selection::DEFAULT_TEAMS;
use crate::source::{CompressionFormat, SourceKind};

/// Manages config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    pub(crate) config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    /// Create a new ConfigManager for the given app name
    pub fn new(app_name: &str) -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| eyre!("Could not determine config directory"))?
            .join(app_name);

        Ok(Self { config_dir })
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get path to a specific config file
    pub fn config_path(&self, path: &str) -> PathBuf {
        self.config_dir.join(path)
    }

    /// Ensure the config directory exists
    pub fn ensure_config_dir(&self) -> Result<()> {
        if !self.config_dir.exists() {
            std::fs::create_dir_all(&self.config_dir)?;
        }
        Ok(())
    }

    /// Generate default configuration template as a string
    pub fn generate_default_config(&self) -> String {
        DEFAULT_CONFIG_TEMPLATE.to_string()
    }

    /// Write default configuration to config file
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf> {
        let config_path = self.config_path("config.toml");

        if config_path.exists() && !force {
            return Err(eyre!(
                "Config file already exists at {}. Use --force to overwrite.",
                config_path.display()
            ));
        }

        self.ensure_config_dir()?;
        std::fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)?;

        Ok(config_path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (for future compatibility)
    pub version: String,
    pub source: SourceConfig,
    pub selection: SelectionConfig,
    pub export: ExportConfig,
    pub chart: ChartConfig,
    pub watch: WatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SourceConfig {
    pub path: Option<String>,
    pub kind: Option<String>,
    pub sheet: Option<String>,
    pub delimiter: Option<u8>,
    pub compression: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub default_teams: Vec<String>,
    pub start_season: Option<String>,
    pub end_season: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter: u8,
    pub include_header: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

// Default implementations
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            source: SourceConfig::default(),
            selection: SelectionConfig::default(),
            export: ExportConfig::default(),
            chart: ChartConfig::default(),
            watch: WatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            default_teams: DEFAULT_TEAMS.iter().map(|t| t.to_string()).collect(),
            start_season: None,
            end_season: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 900,
            height: 650,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// Configuration loading and merging
impl AppConfig {
    /// Load configuration from all layers (default → user)
    pub fn load(app_name: &str) -> Result<Self> {
        let mut config = AppConfig::default();

        if let Ok(user_config) = Self::load_user_config(app_name) {
            config.merge(user_config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load defaults merged with an explicit config file. Unlike [`AppConfig::load`], a missing
    /// or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = AppConfig::default();
        config.merge(Self::read_file(path)?);
        config.validate()?;
        Ok(config)
    }

    /// Load user configuration from ~/.config/cricdata/config.toml
    fn load_user_config(app_name: &str) -> Result<AppConfig> {
        let config_manager = ConfigManager::new(app_name)?;
        let config_path = config_manager.config_path("config.toml");

        if !config_path.exists() {
            return Ok(AppConfig::default());
        }
        Self::read_file(&config_path)
    }

    fn read_file(config_path: &Path) -> Result<AppConfig> {
        let content = std::fs::read_to_string(config_path).map_err(|e| {
            eyre!(
                "Failed to read config file at {}: {}",
                config_path.display(),
                e
            )
        })?;

        toml::from_str(&content).map_err(|e| {
            eyre!(
                "Failed to parse config file at {}: {}",
                config_path.display(),
                e
            )
        })
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.version != AppConfig::default().version {
            self.version = other.version;
        }

        self.source.merge(other.source);
        self.selection.merge(other.selection);
        self.export.merge(other.export);
        self.chart.merge(other.chart);
        self.watch.merge(other.watch);
        self.logging.merge(other.logging);
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if !self.version.starts_with("0.1") {
            return Err(eyre!(
                "Unsupported config version: {}. Expected 0.1.x",
                self.version
            ));
        }

        if let Some(kind) = &self.source.kind {
            if SourceKind::from_name(kind).is_none() {
                return Err(eyre!(
                    "Invalid source kind: {}. Must be 'csv', 'excel', or 'sheet'",
                    kind
                ));
            }
        }

        if let Some(compression) = &self.source.compression {
            if CompressionFormat::from_name(compression).is_none() {
                return Err(eyre!(
                    "Invalid compression: {}. Must be 'gzip', 'zstd', 'bzip2', or 'xz'",
                    compression
                ));
            }
        }

        if self.chart.width == 0 || self.chart.height == 0 {
            return Err(eyre!("chart width and height must be greater than 0"));
        }

        if self.watch.interval_secs == 0 {
            return Err(eyre!("interval_secs must be greater than 0"));
        }

        self.logging.level_filter()?;

        Ok(())
    }

    /// Source kind named in the config, if any.
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.source.kind.as_deref().and_then(SourceKind::from_name)
    }

    pub fn source_compression(&self) -> Option<CompressionFormat> {
        self.source
            .compression
            .as_deref()
            .and_then(CompressionFormat::from_name)
    }
}

// Merge implementations for each config section
impl SourceConfig {
    pub fn merge(&mut self, other: Self) {
        if other.path.is_some() {
            self.path = other.path;
        }
        if other.kind.is_some() {
            self.kind = other.kind;
        }
        if other.sheet.is_some() {
            self.sheet = other.sheet;
        }
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.compression.is_some() {
            self.compression = other.compression;
        }
    }
}

impl SelectionConfig {
    pub fn merge(&mut self, other: Self) {
        let default = SelectionConfig::default();
        if other.default_teams != default.default_teams {
            self.default_teams = other.default_teams;
        }
        if other.start_season.is_some() {
            self.start_season = other.start_season;
        }
        if other.end_season.is_some() {
            self.end_season = other.end_season;
        }
    }
}

impl ExportConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ExportConfig::default();
        if other.delimiter != default.delimiter {
            self.delimiter = other.delimiter;
        }
        if other.include_header != default.include_header {
            self.include_header = other.include_header;
        }
    }
}

impl ChartConfig {
    pub fn merge(&mut self, other: Self) {
        let default = ChartConfig::default();
        if other.width != default.width {
            self.width = other.width;
        }
        if other.height != default.height {
            self.height = other.height;
        }
    }
}

impl WatchConfig {
    pub fn merge(&mut self, other: Self) {
        if other.interval_secs != WatchConfig::default().interval_secs {
            self.interval_secs = other.interval_secs;
        }
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.level != LoggingConfig::default().level {
            self.level = other.level;
        }
    }

    pub fn level_filter(&self) -> Result<LevelFilter> {
        LevelFilter::from_str(self.level.trim()).map_err(|_| {
            eyre!(
                "Invalid logging level: {}. Must be one of off, error, warn, info, debug, trace",
                self.level
            )
        })
    }
}

const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("../config/default.toml");
