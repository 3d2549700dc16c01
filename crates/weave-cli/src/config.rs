//! Configuration vault – reads/writes `~/.weave/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Persisted user configuration stored in `~/.weave/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the OpenAI-compatible model server (e.g. Ollama).
    #[serde(default = "default_oracle_url")]
    pub oracle_url: String,

    /// Model used for enrichment and synthesis (the semantic oracle).
    #[serde(default = "default_model")]
    pub oracle_model: String,

    /// Model used for the conversational reply path.
    #[serde(default = "default_model")]
    pub chat_model: String,

    /// Attempt insight synthesis every this many conversation turns.
    #[serde(default = "default_synthesis_interval")]
    pub synthesis_interval: u64,

    /// How many records to retrieve as context for each reply.
    #[serde(default = "default_top_k")]
    pub retrieval_top_k: usize,

    /// Bearer token for hosted OpenAI-compatible endpoints; empty for local
    /// Ollama. Stored as plain text – users should restrict permissions on
    /// `~/.weave/config.toml` (the vault writes it 0600 on Unix).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_key: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("oracle_url", &self.oracle_url)
            .field("oracle_model", &self.oracle_model)
            .field("chat_model", &self.chat_model)
            .field("synthesis_interval", &self.synthesis_interval)
            .field("retrieval_top_k", &self.retrieval_top_k)
            .field(
                "api_key",
                if self.api_key.is_empty() { &"<not set>" } else { &"<redacted>" },
            )
            .finish()
    }
}

fn default_oracle_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_model() -> String {
    "llama3".to_string()
}
fn default_synthesis_interval() -> u64 {
    3
}
fn default_top_k() -> usize {
    2
}

impl Default for Config {
    fn default() -> Self {
        Self {
            oracle_url: default_oracle_url(),
            oracle_model: default_model(),
            chat_model: default_model(),
            synthesis_interval: default_synthesis_interval(),
            retrieval_top_k: default_top_k(),
            api_key: String::new(),
        }
    }
}

/// Return the path to `~/.weave/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".weave").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| format!("Failed to parse config: {}", e))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `WEAVE_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `WEAVE_ORACLE_URL` | `oracle_url` |
/// | `WEAVE_ORACLE_MODEL` | `oracle_model` |
/// | `WEAVE_CHAT_MODEL` | `chat_model` |
/// | `WEAVE_SYNTHESIS_INTERVAL` | `synthesis_interval` |
/// | `WEAVE_TOP_K` | `retrieval_top_k` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("WEAVE_ORACLE_URL") {
        cfg.oracle_url = v;
    }
    if let Ok(v) = std::env::var("WEAVE_ORACLE_MODEL") {
        cfg.oracle_model = v;
    }
    if let Ok(v) = std::env::var("WEAVE_CHAT_MODEL") {
        cfg.chat_model = v;
    }
    if let Ok(v) = std::env::var("WEAVE_SYNTHESIS_INTERVAL")
        && let Ok(n) = v.parse::<u64>() {
            cfg.synthesis_interval = n;
        }
    if let Ok(v) = std::env::var("WEAVE_TOP_K")
        && let Ok(n) = v.parse::<usize>() {
            cfg.retrieval_top_k = n;
        }
}

/// Save the config to disk, creating `~/.weave/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Restrict the config directory to the owner only (rwx------) on Unix.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;
    // Write the file with owner-only read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}
