// Configuration: everything comes from the environment, optionally seeded
// from a local, untracked `.env` file.

use std::path::PathBuf;

use crate::error::{Error, Result};

pub const API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const MODEL_VAR: &str = "GEMINI_MODEL";
pub const API_BASE_VAR: &str = "GEMINI_API_BASE";
pub const STATS_FILE_VAR: &str = "PERSONA_STATS_FILE";

pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_STATS_FILE: &str = "persona_stats.json";

/// Settings for one run of either binary.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub stats_file: PathBuf,
}

impl Config {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => log::debug!("No .env file found"),
            Err(e) => log::warn!("Could not read .env file: {}", e),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. Blank values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(API_KEY_VAR)
            .ok_or_else(|| Error::Config(format!("{} not found in environment", API_KEY_VAR)))?;

        Ok(Config {
            api_key,
            model: get(MODEL_VAR).unwrap_or_else(|| DEFAULT_MODEL.into()),
            api_base: get(API_BASE_VAR)
                .map(|b| b.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_BASE.into()),
            stats_file: get(STATS_FILE_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATS_FILE)),
        })
    }
}
