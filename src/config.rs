//! Configuration management for critic
//!
//! Stores settings in the platform config dir (config.json). The API key can
//! come from the environment or the config file; presence is modeled as an
//! explicit `Credential` variant so callers match on it instead of checking
//! a nullable field ad hoc.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable consulted before the config file
const ENV_API_KEY: &str = "OPENROUTER_API_KEY";

/// An upstream credential, present or not
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Configured(String),
    Unconfigured,
}

impl Credential {
    pub fn is_configured(&self) -> bool {
        matches!(self, Credential::Configured(_))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub api_key: Option<String>,
}

impl Config {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("critic"))
    }

    fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        if let Some(path) = Self::config_path() {
            if let Ok(content) = fs::read_to_string(&path) {
                match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(err) => {
                        preserve_corrupt_config(&path, &content);
                        eprintln!(
                            "  Warning: Config file was corrupted ({}). A backup was saved and defaults were loaded.",
                            err
                        );
                    }
                }
            }
        }
        Self::default()
    }

    /// Save config to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir().context("Could not determine config directory")?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = dir.join("config.json");
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    /// Resolve the upstream credential: environment first, then config file
    pub fn credential(&self) -> Credential {
        resolve_credential(std::env::var(ENV_API_KEY).ok(), self.api_key.as_deref())
    }

    /// Set and save the API key
    pub fn set_api_key(&mut self, key: &str) -> Result<()> {
        self.api_key = Some(key.to_string());
        self.save()
    }

    /// Validate API key format (OpenRouter keys start with sk-)
    pub fn validate_api_key_format(key: &str) -> bool {
        key.starts_with("sk-")
    }

    /// Get the config file location for display
    pub fn config_location() -> String {
        Self::config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.config/critic/config.json".to_string())
    }
}

fn resolve_credential(env_key: Option<String>, stored_key: Option<&str>) -> Credential {
    if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
        return Credential::Configured(key);
    }
    match stored_key {
        Some(key) if !key.trim().is_empty() => Credential::Configured(key.to_string()),
        _ => Credential::Unconfigured,
    }
}

fn preserve_corrupt_config(path: &std::path::Path, content: &str) {
    let corrupt_path = path.with_extension("json.corrupt");
    if fs::rename(path, &corrupt_path).is_err() {
        let _ = fs::write(&corrupt_path, content);
    }
}

/// Interactive prompt to set up the API key
pub fn setup_interactive() -> Result<()> {
    use std::io::{self, Write};

    println!();
    println!("  critic uses OpenRouter for AI-powered reviews.");
    println!();
    println!("  1. Get an API key at: https://openrouter.ai/keys");
    println!("  2. Paste it below (saved to {})", Config::config_location());
    println!();
    print!("  API Key: ");
    io::stdout().flush()?;

    let mut key = String::new();
    io::stdin().read_line(&mut key)?;
    let key = key.trim().to_string();

    if key.is_empty() {
        anyhow::bail!("No API key provided");
    }

    if !Config::validate_api_key_format(&key) {
        println!();
        println!("  Warning: Key doesn't look like an OpenRouter key (should start with sk-)");
        println!("     Saving anyway...");
    }

    let mut config = Config::load();
    config.set_api_key(&key)?;

    println!();
    println!("  + API key saved to {}", Config::config_location());
    println!();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_env_key_takes_precedence() {
        let credential = resolve_credential(Some("sk-env".to_string()), Some("sk-stored"));
        assert_eq!(credential, Credential::Configured("sk-env".to_string()));
    }

    #[test]
    fn test_stored_key_used_without_env() {
        let credential = resolve_credential(None, Some("sk-stored"));
        assert_eq!(credential, Credential::Configured("sk-stored".to_string()));
    }

    #[test]
    fn test_blank_keys_are_unconfigured() {
        assert_eq!(resolve_credential(Some("  ".to_string()), None), Credential::Unconfigured);
        assert_eq!(resolve_credential(None, Some("")), Credential::Unconfigured);
        assert_eq!(resolve_credential(None, None), Credential::Unconfigured);
    }

    #[test]
    fn test_key_format_validation() {
        assert!(Config::validate_api_key_format("sk-or-v1-abc"));
        assert!(!Config::validate_api_key_format("abc"));
    }
}
