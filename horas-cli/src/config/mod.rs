//! Configuration loading
//!
//! Settings come from an optional TOML file, then environment variables,
//! then command line flags (highest precedence).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::attendance::{ExportOptions, Storage};

const APP_DIR: &str = "horas";
const CONFIG_FILE: &str = "config.toml";

pub const CONFIG_ENV: &str = "HORAS_CONFIG";
pub const STORAGE_DIR_ENV: &str = "HORAS_STORAGE_DIR";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Where inputs are staged and the result workbook is kept
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// File name of the result workbook
    #[serde(default = "default_output_file")]
    pub output_file: String,

    #[serde(default)]
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,

    #[serde(default = "default_max_column_width")]
    pub max_column_width: f64,

    #[serde(default = "default_column_padding")]
    pub column_padding: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_dir: default_storage_dir(),
            output_file: default_output_file(),
            export: ExportConfig::default(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            max_column_width: default_max_column_width(),
            column_padding: default_column_padding(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("media"))
}

fn default_output_file() -> String {
    "horas_por_cpf.xlsx".to_string()
}

fn default_sheet_name() -> String {
    "Resultado".to_string()
}

fn default_max_column_width() -> f64 {
    40.0
}

fn default_column_padding() -> f64 {
    2.0
}

/// Default config file location, `<config dir>/horas/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Load configuration and apply overrides
    ///
    /// An explicit `path` (flag or `HORAS_CONFIG`) must exist; the default
    /// location is only used when present.
    pub fn load(path: Option<&Path>, storage_dir: Option<&Path>) -> Result<Self> {
        let env_path = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        let explicit = path.map(Path::to_path_buf).or(env_path);

        let mut config = match explicit {
            Some(path) => Config::from_file(&path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Config::from_file(&path)?,
                _ => Config::default(),
            },
        };

        if let Some(dir) = std::env::var_os(STORAGE_DIR_ENV) {
            config.storage_dir = PathBuf::from(dir);
        }
        if let Some(dir) = storage_dir {
            config.storage_dir = dir.to_path_buf();
        }

        config.validate()?;
        log::debug!("Loaded config: {:?}", config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.output_file.trim().is_empty() {
            anyhow::bail!("output_file must not be empty");
        }
        let output = Path::new(&self.output_file);
        if output.components().count() != 1 || output.file_name() != Some(output.as_os_str()) {
            anyhow::bail!("output_file must be a plain file name: {}", self.output_file);
        }
        if self.export.sheet_name.trim().is_empty() {
            anyhow::bail!("export.sheet_name must not be empty");
        }
        if self.export.max_column_width <= 0.0 {
            anyhow::bail!("export.max_column_width must be positive");
        }
        Ok(())
    }

    pub fn storage(&self) -> Storage {
        Storage::new(&self.storage_dir, &self.output_file)
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            sheet_name: self.export.sheet_name.clone(),
            max_column_width: self.export.max_column_width,
            column_padding: self.export.column_padding,
        }
    }
}
