use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Top-level config (signerd.toml + SIGNERD_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SignerdConfig {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Zones this daemon signs. Each advances through the pipeline on its
    /// own clock.
    #[serde(default)]
    pub zones: Vec<ZoneConfig>,
}

/// Scheduler engine tuning, the `[scheduler]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Blocking workers executing due tasks concurrently.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Engine poll cadence, seconds.
    #[serde(default = "default_tick_interval")]
    pub tick_interval_secs: u64,
    /// Serialize every store-touching callback through the shared work
    /// lock. The store cannot tell an empty result from an error under
    /// concurrent access; keep this on until that is fixed.
    #[serde(default = "bool_true")]
    pub serialize_store: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            tick_interval_secs: default_tick_interval(),
            serialize_store: true,
        }
    }
}

/// One `[[zones]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneConfig {
    /// Zone name, e.g. "example.com".
    pub name: String,
    /// Seconds between full signing passes.
    #[serde(default = "default_resign_interval")]
    pub resign_interval_secs: u64,
}

fn default_workers() -> usize {
    4
}
fn default_tick_interval() -> u64 {
    1
}
fn default_resign_interval() -> u64 {
    120
}
fn bool_true() -> bool {
    true
}

impl SignerdConfig {
    /// Load config from a TOML file with SIGNERD_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.signerd/signerd.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: SignerdConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("SIGNERD_").split("_"))
            .extract()
            .map_err(|e| crate::error::SignerdError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.signerd/signerd.toml", home)
}
