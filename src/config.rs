use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory name used for user/project configuration
pub const CONFIG_DIR: &str = ".cloudmcp";

/// Default file written by the classifier
pub const DEFAULT_REPORT_FILE: &str = "oci_sdk_method_classification.txt";

/// Configuration handed to client constructors
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SdkConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_config_file")]
    pub config_file: String,
}

fn default_profile() -> String {
    "DEFAULT".to_string()
}

fn default_config_file() -> String {
    "~/.oci/config".to_string()
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            region: None,
            config_file: default_config_file(),
        }
    }
}

impl SdkConfig {
    /// Config file path with a leading `~` expanded
    pub fn config_file_path(&self) -> PathBuf {
        match self.config_file.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.config_file)),
            None => PathBuf::from(&self.config_file),
        }
    }
}

/// Dispatcher behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DispatchConfig {
    /// Hard cap on pages drained per call (unlimited when unset)
    #[serde(default)]
    pub max_pages: Option<usize>,
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,
}

fn default_request_id_header() -> String {
    "opc-request-id".to_string()
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            max_pages: None,
            request_id_header: default_request_id_header(),
        }
    }
}

/// Allow/deny rules for operations (`Client.operation` patterns)
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct PolicyConfig {
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default)]
    pub deny: Vec<String>,
}

/// Offline classifier settings
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub sdk_root: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl ClassifierConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_FILE))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub sdk: SdkConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from default paths
    /// Priority: local (.cloudmcp/config.local.toml) > project (.cloudmcp/config.toml) > user (~/.cloudmcp/config.toml)
    pub fn load() -> Result<Self> {
        let mut layers = Vec::new();
        if let Some(home) = dirs::home_dir() {
            layers.push(home.join(CONFIG_DIR).join("config.toml"));
        }
        layers.push(Path::new(CONFIG_DIR).join("config.toml"));
        // Should be gitignored
        layers.push(Path::new(CONFIG_DIR).join("config.local.toml"));

        Self::load_layers(&layers)
    }

    /// Merge the files that exist among `layers`, lowest priority first
    pub fn load_layers(layers: &[PathBuf]) -> Result<Self> {
        let mut config = Self::default();
        for path in layers.iter().filter(|p| p.exists()) {
            config.merge(Self::load_from(path)?);
        }
        Ok(config)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Merge another config into this one (other takes priority).
    /// Policy lists are concatenated; scalars override only when set or
    /// when they differ from their default.
    pub fn merge(&mut self, other: Config) {
        if other.sdk.profile != default_profile() {
            self.sdk.profile = other.sdk.profile;
        }
        if other.sdk.region.is_some() {
            self.sdk.region = other.sdk.region;
        }
        if other.sdk.config_file != default_config_file() {
            self.sdk.config_file = other.sdk.config_file;
        }

        if other.dispatch.max_pages.is_some() {
            self.dispatch.max_pages = other.dispatch.max_pages;
        }
        if other.dispatch.request_id_header != default_request_id_header() {
            self.dispatch.request_id_header = other.dispatch.request_id_header;
        }

        self.policy.allow.extend(other.policy.allow);
        self.policy.deny.extend(other.policy.deny);

        if other.classifier.sdk_root.is_some() {
            self.classifier.sdk_root = other.classifier.sdk_root;
        }
        if other.classifier.output.is_some() {
            self.classifier.output = other.classifier.output;
        }

        if other.logging.level != default_level() {
            self.logging.level = other.logging.level;
        }
    }
}
