use serde::Deserialize;

/// Main configuration structure for Linkstat
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub prober: ProberConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Which document backend holds the task collections
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// One JSON file per collection in a directory
    #[default]
    Json,
    /// A single SQLite database file
    Sqlite,
    /// Process memory only; nothing survives a restart
    Memory,
}

/// Persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Data directory (json) or database file (sqlite); ignored for memory
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: default_storage_path(),
        }
    }
}

/// Link probing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ProberConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of redirects followed before a probe fails
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent with every probe
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

/// Task engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// How long shutdown waits for recovery work to drain (seconds)
    #[serde(
        rename = "recovery-timeout-secs",
        default = "default_recovery_timeout_secs"
    )]
    pub recovery_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            recovery_timeout_secs: default_recovery_timeout_secs(),
        }
    }
}

fn default_storage_path() -> String {
    "./linkstat-data".to_string()
}

fn default_timeout_secs() -> u64 {
    3
}

fn default_max_redirects() -> usize {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; linkstat/0.1)".to_string()
}

fn default_recovery_timeout_secs() -> u64 {
    30
}
