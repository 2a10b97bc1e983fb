//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "JEONSE_ROOT_FOLDER";

/// Configuration file name, looked up inside the root folder
pub const CONFIG_FILE_NAME: &str = "jeonse-analyzer.toml";

/// Database file name, created inside the root folder
pub const DATABASE_FILE_NAME: &str = "jeonse.db";

/// Default bind address for the HTTP surface
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5730";

/// Fallback district when a region string cannot be resolved (종로구)
pub const DEFAULT_DISTRICT_CODE: &str = "11110";

/// TOML configuration file contents
///
/// Every key is optional; absent keys fall back to compiled defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder override (lowest priority after the OS default)
    pub root_folder: Option<String>,
    /// Address the HTTP server binds to
    pub bind_address: Option<String>,
    /// Sale registry credential
    pub molit_api_key: Option<String>,
    /// Rent registry credential (falls back to the sale credential)
    pub molit_rent_api_key: Option<String>,
    /// District code used when resolution fails
    pub default_district_code: Option<String>,
    /// Registry connection settings
    #[serde(default)]
    pub registry: RegistrySection,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingSection,
}

/// `[registry]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    pub sale_url: String,
    pub rent_url: String,
    pub timeout_secs: u64,
    pub page_size: u32,
    pub max_concurrent_fetches: usize,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            sale_url: "http://apis.data.go.kr/1613000/RTMSDataSvcAptTradeDev/getRTMSDataSvcAptTradeDev"
                .to_string(),
            rent_url: "https://apis.data.go.kr/1613000/RTMSDataSvcAptRent/getRTMSDataSvcAptRent"
                .to_string(),
            timeout_secs: 8,
            page_size: 100,
            max_concurrent_fetches: 6,
        }
    }
}

/// `[logging]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl TomlConfig {
    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }

    pub fn default_district_code(&self) -> &str {
        self.default_district_code
            .as_deref()
            .filter(|code| !code.trim().is_empty())
            .unwrap_or(DEFAULT_DISTRICT_CODE)
    }
}

/// Load the TOML config file, returning defaults when the file is absent
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Write config atomically (temp file + rename)
pub fn write_toml_config(config: &TomlConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Serialize TOML failed: {}", e)))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("toml.tmp");
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Root folder resolution in priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. `root_folder` key in the user config file
/// 4. OS-dependent default (fallback)
pub struct RootFolderResolver {
    app_name: String,
    cli_arg: Option<String>,
}

impl RootFolderResolver {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            cli_arg: None,
        }
    }

    pub fn with_cli_arg(mut self, cli_arg: Option<String>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            info!("Root folder from command line: {}", path);
            return PathBuf::from(path);
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                info!("Root folder from {}: {}", ROOT_FOLDER_ENV, path);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = self.user_config_path() {
            match load_toml_config(&path) {
                Ok(config) => {
                    if let Some(root) = config.root_folder {
                        info!("Root folder from {}: {}", path.display(), root);
                        return PathBuf::from(root);
                    }
                }
                Err(e) => warn!("Ignoring unreadable user config {}: {}", path.display(), e),
            }
        }

        self.default_root_folder()
    }

    /// `~/.config/<app>/jeonse-analyzer.toml` (platform equivalent elsewhere)
    fn user_config_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(&self.app_name).join(CONFIG_FILE_NAME))
    }

    fn default_root_folder(&self) -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join(&self.app_name))
            .unwrap_or_else(|| PathBuf::from(format!("./{}_data", self.app_name)))
    }
}

/// Creates the root folder and derives file locations inside it
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn config_path(&self) -> PathBuf {
        self.root_folder.join(CONFIG_FILE_NAME)
    }
}
