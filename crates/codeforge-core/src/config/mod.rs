//! Configuration module for codeforge.
//!
//! Loads typed configuration from `~/.codeforge/config.json`. All fields use
//! `serde` for zero-boilerplate deserialization. API keys left empty in the
//! file are filled from the environment (`OPENAI_API_KEY`, `MISTRAL_API_KEY`,
//! `HUGGINGFACE_API_KEY`), so an env-only deployment needs no config file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Root configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub providers: ProvidersConfig,
    pub server: ServerConfig,
    pub workspace: WorkspaceConfig,
}

impl Config {
    /// Load configuration from the default path, apply env fallbacks.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            Config::default()
        };
        config.providers.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path, apply env fallbacks.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_json::from_str(&content)?;
        config.providers.apply_env();
        Ok(config)
    }

    /// Get the default config file path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".codeforge")
            .join("config.json")
    }

    /// Get the resolved workspace root directory.
    pub fn workspace_path(&self) -> PathBuf {
        let raw = &self.workspace.root;
        if raw.starts_with("~/") || raw.starts_with("~\\") {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(&raw[2..])
        } else {
            PathBuf::from(raw)
        }
    }

    /// Write the default config template to disk.
    pub fn write_default_template() -> anyhow::Result<PathBuf> {
        let path = Self::default_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template = serde_json::json!({
            "providers": {
                "openai": { "apiKey": "sk-YOUR_KEY_HERE" },
                "mistral": { "apiKey": "" },
                "huggingface": { "apiKey": "" }
            },
            "server": {
                "host": "0.0.0.0",
                "port": 8000
            }
        });

        std::fs::write(&path, serde_json::to_string_pretty(&template)?)?;
        Ok(path)
    }
}

// ── Provider Configuration ──────────────────────────────────────────

/// Credentials and optional base-URL override for one provider family.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProviderEntry {
    pub api_key: String,
    pub api_base: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub openai: Option<ProviderEntry>,
    pub mistral: Option<ProviderEntry>,
    pub huggingface: Option<ProviderEntry>,
}

impl ProvidersConfig {
    /// Fill empty API keys from the environment.
    ///
    /// A family absent from the config file is materialized here when its
    /// env var is set; a family with no key anywhere stays disabled.
    pub fn apply_env(&mut self) {
        Self::fill(&mut self.openai, "OPENAI_API_KEY");
        Self::fill(&mut self.mistral, "MISTRAL_API_KEY");
        Self::fill(&mut self.huggingface, "HUGGINGFACE_API_KEY");
    }

    fn fill(slot: &mut Option<ProviderEntry>, env_var: &str) {
        let needs_key = slot.as_ref().map_or(true, |e| e.api_key.is_empty());
        if !needs_key {
            return;
        }
        if let Ok(key) = std::env::var(env_var) {
            if !key.is_empty() {
                slot.get_or_insert_with(ProviderEntry::default).api_key = key;
            }
        }
    }

    /// Names of families that have a usable credential.
    pub fn configured(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.openai.as_ref().is_some_and(|e| !e.api_key.is_empty()) {
            names.push("openai");
        }
        if self.mistral.as_ref().is_some_and(|e| !e.api_key.is_empty()) {
            names.push("mistral");
        }
        if self
            .huggingface
            .as_ref()
            .is_some_and(|e| !e.api_key.is_empty())
        {
            names.push("huggingface");
        }
        names
    }
}

// ── Server Configuration ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8000,
        }
    }
}

// ── Workspace Configuration ─────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub root: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            root: "~/.codeforge/workspace".into(),
        }
    }
}
