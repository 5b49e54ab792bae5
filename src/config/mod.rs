use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATABASE_PATH: &str = "vinCache.db";
const DEFAULT_DECODER_BASE_URL: &str = "https://vpic.nhtsa.dot.gov/api/vehicles";
const DEFAULT_EXPORT_DIRECTORY: &str = "./data/export";
const DEFAULT_EXPORT_FILE_STEM: &str = "vinCache";

/// Environment variable prefix, e.g. `VIN_CACHE__WEB__PORT=9000`
pub const ENV_PREFIX: &str = "VIN_CACHE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub export: ExportConfig,
}

/// How the cache table is initialised at start-up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Drop and recreate the table on every start; nothing survives a restart
    #[default]
    Ephemeral,
    /// Keep the table across restarts
    Persistent,
}

impl std::str::FromStr for CacheMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ephemeral" => Ok(Self::Ephemeral),
            "persistent" => Ok(Self::Persistent),
            other => Err(format!(
                "unknown cache mode '{other}', expected 'ephemeral' or 'persistent'"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub mode: CacheMode,
    /// Delete the SQLite file once the pool has closed at shutdown
    #[serde(default)]
    pub remove_on_shutdown: bool,
    pub max_connections: Option<u32>,
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoderConfig {
    #[serde(default = "default_decoder_base_url")]
    pub base_url: String,
    /// Total request timeout; the transport default applies when unset
    pub timeout_secs: Option<u64>,
}

/// Serialization used for `GET /export`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Parquet,
    Csv,
    Jsonl,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Parquet => "parq",
            Self::Csv => "csv",
            Self::Jsonl => "jsonl",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Parquet => "application/vnd.apache.parquet",
            Self::Csv => "text/csv",
            Self::Jsonl => "application/x-ndjson",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_export_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_export_file_stem")]
    pub file_stem: String,
    #[serde(default)]
    pub format: ExportFormat,
}

impl ExportConfig {
    /// Download file name, e.g. `vinCache.csv`
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, self.format.extension())
    }

    pub fn file_path(&self) -> PathBuf {
        self.directory.join(self.file_name())
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn default_busy_timeout_secs() -> u64 {
    5
}

fn default_decoder_base_url() -> String {
    DEFAULT_DECODER_BASE_URL.to_string()
}

fn default_export_directory() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_DIRECTORY)
}

fn default_export_file_stem() -> String {
    DEFAULT_EXPORT_FILE_STEM.to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
            mode: CacheMode::default(),
            remove_on_shutdown: false,
            max_connections: Some(5),
            busy_timeout_secs: default_busy_timeout_secs(),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            base_url: default_decoder_base_url(),
            timeout_secs: None,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            directory: default_export_directory(),
            file_stem: default_export_file_stem(),
            format: ExportFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file, layered under the environment
    ///
    /// A missing file is created with the defaults so operators have
    /// something to edit.
    pub fn load_from_file<P: AsRef<Path>>(config_file: P) -> Result<Self> {
        let config_file = config_file.as_ref();

        if !config_file.exists() {
            let contents = toml::to_string_pretty(&Self::default())?;
            std::fs::write(config_file, contents)?;
        }

        let settings = ::config::Config::builder()
            .add_source(::config::File::from(config_file).required(false))
            .add_source(
                ::config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
