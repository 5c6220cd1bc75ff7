// Configuration management

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Seconds between monitoring cycles
    #[serde(default = "default_cycle_secs")]
    pub cycle_secs: u64,

    /// Root of the proc filesystem; overridable for testing
    #[serde(default = "default_proc_root")]
    pub proc_root: PathBuf,

    /// URL the `alert` action POSTs events to; without it, alerts log
    #[serde(default)]
    pub alert_webhook: Option<String>,

    /// Rules and parameters for the local machine
    #[serde(default)]
    pub host: EntityConfig,

    /// Services to watch
    #[serde(default)]
    pub services: Vec<ServiceConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityConfig {
    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub parameters: HashMap<String, String>,

    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,

    #[serde(default)]
    pub owner: Option<String>,

    #[serde(default)]
    pub parameters: HashMap<String, String>,

    #[serde(default)]
    pub rules: Vec<RuleConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Metric family, e.g. "memory", "cpu", "load"
    pub metric: String,

    /// Metric name within the family, e.g. "rss"; empty for the family default
    #[serde(default)]
    pub field: String,

    /// Comparison operator: ">" or "<"
    pub op: String,

    pub threshold: f64,

    /// Consecutive breaching cycles before the rule trips
    #[serde(default = "default_rule_cycles")]
    pub cycles: u32,

    /// Action names to trigger, in order: "log", "alert"
    #[serde(default)]
    pub actions: Vec<String>,
}

fn default_cycle_secs() -> u64 {
    15
}

fn default_proc_root() -> PathBuf {
    PathBuf::from("/proc")
}

fn default_rule_cycles() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cycle_secs: default_cycle_secs(),
            proc_root: default_proc_root(),
            alert_webhook: None,
            host: EntityConfig::default(),
            services: Vec::new(),
        }
    }
}

impl Config {
    /// Get default config path: ~/.config/procwatch/config.yaml
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("procwatch").join("config.yaml"))
    }

    /// Load config from path, falling back to defaults if not found
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = path.unwrap_or_else(|| Self::default_path().unwrap_or_default());

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_yaml::from_str(&contents)?;
            Ok(config)
        } else {
            // Return defaults if no config file exists
            Ok(Self::default())
        }
    }

    /// Save config to path
    pub fn save(&self, path: PathBuf) -> Result<()> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}
