//! Configuration for custodia paths and policy.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (CUSTODIA_HOME, CUSTODIA_LEDGER)
//! 2. Config file (.custodia/config.yaml)
//! 3. Defaults (~/.custodia, ~/.custodia/evidence.log)
//!
//! Config file discovery:
//! - Searches current directory and parents for .custodia/config.yaml
//! - Paths in the config file are relative to the config file's parent

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub policy: Option<PolicyConfig>,
    #[serde(default)]
    pub capture: Option<CaptureConfig>,
    #[serde(default)]
    pub tools: Option<ToolsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// State directory (relative to config file)
    pub home: Option<String>,
    /// Evidence log path (relative to config file)
    pub ledger: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    pub allow_empty_input: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    pub default_duration_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    pub pdfinfo: Option<String>,
    pub tshark: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Absolute path to the custodia home directory
    pub home: PathBuf,
    /// Absolute path to the evidence log
    pub ledger: PathBuf,
    /// Path to the config file (if found)
    pub config_file: Option<PathBuf>,
    /// Evidence-handling policy
    pub policy: PolicySettings,
    /// Capture defaults
    pub capture: CaptureSettings,
    /// External tool binaries
    pub tools: ToolSettings,
}

#[derive(Debug, Clone)]
pub struct PolicySettings {
    /// Whether a zero-length input may be digested and recorded
    pub allow_empty_input: bool,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            allow_empty_input: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub default_duration_seconds: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            default_duration_seconds: 50,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub pdfinfo: String,
    pub tshark: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            pdfinfo: "pdfinfo".to_string(),
            tshark: "tshark".to_string(),
        }
    }
}

/// Find config file by searching current directory and parents
fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".custodia").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the config file's parent
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
            .canonicalize()
            .unwrap_or_else(|_| base.join(path_str))
    }
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let default_home = dirs::home_dir()
        .context("Failed to determine home directory")?
        .join(".custodia");

    let config_file = find_config_file();

    let (home, ledger, policy, capture, tools) = if let Some(ref config_path) = config_file {
        let config = load_config_file(config_path)?;

        // Paths are relative to the .custodia/ directory
        let custodia_dir = config_path.parent().unwrap_or(Path::new("."));

        let home = if let Ok(env_home) = std::env::var("CUSTODIA_HOME") {
            PathBuf::from(env_home)
        } else if let Some(ref home_path) = config.paths.home {
            resolve_path(custodia_dir, home_path)
        } else {
            default_home.clone()
        };

        let ledger = if let Ok(env_ledger) = std::env::var("CUSTODIA_LEDGER") {
            PathBuf::from(env_ledger)
        } else if let Some(ref ledger_path) = config.paths.ledger {
            resolve_path(custodia_dir, ledger_path)
        } else {
            home.join("evidence.log")
        };

        let policy = PolicySettings {
            allow_empty_input: config
                .policy
                .as_ref()
                .and_then(|p| p.allow_empty_input)
                .unwrap_or(true),
        };

        let capture = CaptureSettings {
            default_duration_seconds: config
                .capture
                .as_ref()
                .and_then(|c| c.default_duration_seconds)
                .unwrap_or_else(|| CaptureSettings::default().default_duration_seconds),
        };

        let tools = ToolSettings {
            pdfinfo: config
                .tools
                .as_ref()
                .and_then(|t| t.pdfinfo.clone())
                .unwrap_or_else(|| "pdfinfo".to_string()),
            tshark: config
                .tools
                .as_ref()
                .and_then(|t| t.tshark.clone())
                .unwrap_or_else(|| "tshark".to_string()),
        };

        (home, ledger, policy, capture, tools)
    } else {
        // No config file - use env vars or defaults
        let home = std::env::var("CUSTODIA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_home.clone());

        let ledger = std::env::var("CUSTODIA_LEDGER")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("evidence.log"));

        (
            home,
            ledger,
            PolicySettings::default(),
            CaptureSettings::default(),
            ToolSettings::default(),
        )
    };

    Ok(ResolvedConfig {
        home,
        ledger,
        config_file,
        policy,
        capture,
        tools,
    })
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}

/// Get the custodia home directory
pub fn custodia_home() -> Result<PathBuf> {
    Ok(config()?.home.clone())
}

/// Get the evidence log path
pub fn ledger_path() -> Result<PathBuf> {
    Ok(config()?.ledger.clone())
}
