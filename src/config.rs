use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use toml::Value;
use log::{debug, info};

/// Section holding root-level keys
pub const BASE_SECTION: &str = "base";

/// Key holding the run directive
pub const RUN_KEY: &str = "run";

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "BOOTCORE_CONFIG";

/// Configuration storage - section_name -> key -> value
pub type Configuration = HashMap<String, HashMap<String, String>>;

/// Configuration manager
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: Configuration,
    config_file_path: Option<PathBuf>,
    selected_section: Option<String>,
}

impl ConfigManager {
    /// Create a new ConfigManager from a Configuration (primarily for testing)
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config,
            config_file_path: None,
            selected_section: None,
        }
    }

    /// Load configuration using the discovery hierarchy rooted at `root`
    pub fn load(root: &Path) -> Result<Self> {
        debug!("Starting configuration discovery");

        for path in discover_config_files(root) {
            debug!("Attempting to load config from: {}", path.display());
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        info!("No configuration file found, using empty configuration");
        Ok(Self::from_config(Configuration::new()))
    }

    /// Load configuration from explicit file path
    pub fn load_from_file(path: PathBuf) -> Result<Self> {
        debug!("Loading configuration from file: {}", path.display());

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config = parse_toml_config(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from: {}", path.display());
        Ok(Self {
            config,
            config_file_path: Some(path),
            selected_section: None,
        })
    }

    /// Path the configuration was loaded from, if any
    pub fn config_file_path(&self) -> Option<&Path> {
        self.config_file_path.as_deref()
    }

    /// Get value from configuration with section fallback
    pub fn get_value(&self, section: &str, key: &str) -> Option<&String> {
        // Priority: selected_section -> specified section -> base
        if let Some(selected) = &self.selected_section {
            if let Some(value) = self.config.get(selected).and_then(|s| s.get(key)) {
                return Some(value);
            }
        }

        if let Some(value) = self.config.get(section).and_then(|s| s.get(key)) {
            return Some(value);
        }

        self.config.get(BASE_SECTION).and_then(|s| s.get(key))
    }

    /// Get a root-level value
    pub fn get_value_root(&self, key: &str) -> Option<&String> {
        self.get_value(BASE_SECTION, key)
    }

    /// The run directive, if configured
    pub fn run_directive(&self) -> Option<&str> {
        self.get_value_root(RUN_KEY).map(String::as_str)
    }

    /// Select configuration section for --config-name
    pub fn select_section(&mut self, section: String) {
        debug!("Selecting configuration section: {}", section);
        self.selected_section = Some(section);
    }

    /// Get path value with type conversion
    pub fn get_path(&self, section: &str, key: &str) -> Option<PathBuf> {
        self.get_value(section, key).map(PathBuf::from)
    }
}

/// Configuration file candidates in order of precedence
pub fn discover_config_files(root: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    // 1. Environment variable $BOOTCORE_CONFIG
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        paths.push(PathBuf::from(env_path));
    }

    // 2. Application layout under the root directory
    paths.push(root.join("data").join("config").join("core.toml"));

    // 3. XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("bootcore").join("config.toml"));
    }

    // 4. Home directory
    if let Some(home_dir) = dirs::home_dir() {
        paths.push(home_dir.join(".bootcore.toml"));
    }

    // 5. Project local
    paths.push(PathBuf::from("./.bootcore.toml"));

    debug!("Config discovery paths: {:?}", paths);
    paths
}

/// Parse TOML content to string-based configuration
pub fn parse_toml_config(content: &str) -> Result<Configuration> {
    let toml_value: Value = content.parse()
        .context("Failed to parse TOML content")?;

    let mut config = Configuration::new();

    if let Value::Table(table) = toml_value {
        flatten_toml_table(&table, String::new(), &mut config);
    }

    debug!("Parsed configuration: {:?}", config);
    Ok(config)
}

/// Recursively flatten TOML tables into section.subsection format
fn flatten_toml_table(table: &toml::Table, prefix: String, config: &mut Configuration) {
    for (key, value) in table {
        match value {
            Value::Table(subtable) => {
                let section_name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                config.entry(section_name.clone()).or_default();
                flatten_toml_table(subtable, section_name, config);
            }
            _ => {
                // Scalars outside any table belong to the base section
                let section_name = if prefix.is_empty() {
                    BASE_SECTION.to_string()
                } else {
                    prefix.clone()
                };
                config
                    .entry(section_name)
                    .or_default()
                    .insert(key.clone(), toml_value_to_string(value));
            }
        }
    }
}

/// Convert TOML Value to string representation
fn toml_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(_) | Value::Table(_) => value.to_string(),
    }
}
