// src/environment.rs
use crate::core::llm_client::{normalize_base_url, DEFAULT_OLLAMA_URL};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_CONFIG_FILE: &str = "cover_letter.yaml";
pub const LOG_FILE_VAR: &str = "COVER_LETTER_LOG_FILE";

/// Load `.env` into the process environment. Returns the file used, if any.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context("Failed to parse .env file"),
    }
}

/// The JSON log file path, read before logging is set up.
pub fn log_file_from_env() -> Option<PathBuf> {
    std::env::var(LOG_FILE_VAR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

/// Optional defaults read from `cover_letter.yaml`. Every field may be left out.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileDefaults {
    pub model: Option<String>,
    pub ollama_url: Option<String>,
    pub cv_path: Option<PathBuf>,
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub bin_dir: Option<PathBuf>,
    pub urls_file: Option<PathBuf>,
    pub delay_secs: Option<f64>,
    pub fetch_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Process-level settings: `.env`, environment variables and the optional
/// YAML file, merged once at startup.
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub default_model: Option<String>,
    pub ollama_url: String,
    pub log_file: Option<PathBuf>,
    pub file: FileDefaults,
}

impl EnvironmentConfig {
    /// Read the process environment; call `load_dotenv` first.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let file = match get("COVER_LETTER_CONFIG") {
            Some(path) => Self::load_file(Path::new(&path))?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load_file(default_path)?
                } else {
                    FileDefaults::default()
                }
            }
        };

        let default_model = get("COVER_LETTER_MODEL")
            .or_else(|| get("OLLAMA_MODEL"))
            .or_else(|| file.model.clone());

        let ollama_url = get("OLLAMA_HOST")
            .or_else(|| file.ollama_url.clone())
            .map(|raw| normalize_base_url(&raw))
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let log_file = get(LOG_FILE_VAR).map(PathBuf::from);

        Ok(Self {
            default_model,
            ollama_url,
            log_file,
            file,
        })
    }

    fn load_file(path: &Path) -> Result<FileDefaults> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let defaults: FileDefaults = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        info!("Loaded defaults from {}", path.display());
        Ok(defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn model_env_takes_precedence_over_ollama_model() {
        let env = EnvironmentConfig::from_lookup(lookup_from(&[
            ("COVER_LETTER_MODEL", "mistral"),
            ("OLLAMA_MODEL", "llama3"),
            ("OLLAMA_HOST", "127.0.0.1:11500"),
            ("COVER_LETTER_CONFIG", "/definitely/not/here.yaml"),
        ]));
        // explicit config path that does not exist is an error
        assert!(env.is_err());

        let env = EnvironmentConfig::from_lookup(lookup_from(&[
            ("COVER_LETTER_MODEL", "mistral"),
            ("OLLAMA_MODEL", "llama3"),
            ("OLLAMA_HOST", "127.0.0.1:11500"),
        ]))
        .unwrap();
        assert_eq!(env.default_model.as_deref(), Some("mistral"));
        assert_eq!(env.ollama_url, "http://127.0.0.1:11500");
    }

    #[test]
    fn yaml_file_supplies_defaults_below_env() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(
            &path,
            "model: qwen2.5\nollama_url: http://gpu:11434\ndelay_secs: 2.5\nbin_dir: archive\n",
        )
        .unwrap();
        let path_str = path.to_str().unwrap().to_string();

        let env =
            EnvironmentConfig::from_lookup(lookup_from(&[("COVER_LETTER_CONFIG", &path_str)]))
                .unwrap();
        assert_eq!(env.default_model.as_deref(), Some("qwen2.5"));
        assert_eq!(env.ollama_url, "http://gpu:11434");
        assert_eq!(env.file.delay_secs, Some(2.5));
        assert_eq!(env.file.bin_dir, Some(PathBuf::from("archive")));

        let env = EnvironmentConfig::from_lookup(lookup_from(&[
            ("COVER_LETTER_CONFIG", &path_str),
            ("OLLAMA_MODEL", "llama3"),
        ]))
        .unwrap();
        assert_eq!(env.default_model.as_deref(), Some("llama3"));
    }

    #[test]
    fn blank_values_are_ignored() {
        let env = EnvironmentConfig::from_lookup(lookup_from(&[
            ("COVER_LETTER_MODEL", "  "),
            ("OLLAMA_HOST", ""),
            ("COVER_LETTER_CONFIG", ""),
        ]))
        .unwrap();
        assert_eq!(env.default_model, None);
        assert_eq!(env.ollama_url, DEFAULT_OLLAMA_URL);
    }
}
