use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::artifacts::{ArtifactPaths, UnknownCategoryPolicy};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub rust_log: String,
    pub artifact_dir: Option<PathBuf>,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub encoders_path: PathBuf,
    pub feature_names_path: PathBuf,
    /// Start serving even when some artifacts fail to load.
    pub allow_degraded_start: bool,
    /// Code substituted for categorical values the encoders never saw.
    pub unknown_category_code: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "5000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG", "info"),
            artifact_dir: lookup("ARTIFACT_DIR").map(PathBuf::from),
            model_path: PathBuf::from(var("MODEL_PATH", "housingModel.json")),
            scaler_path: PathBuf::from(var("SCALER_PATH", "scaler.json")),
            encoders_path: PathBuf::from(var("ENCODERS_PATH", "encoders.json")),
            feature_names_path: PathBuf::from(var("FEATURE_NAMES_PATH", "feature_names.json")),
            allow_degraded_start: parse_bool(&var("ALLOW_DEGRADED_START", "false"))
                .context("ALLOW_DEGRADED_START must be true or false")?,
            unknown_category_code: var("UNKNOWN_CATEGORY_CODE", "0")
                .parse::<u32>()
                .context("UNKNOWN_CATEGORY_CODE must be a non-negative integer")?,
        })
    }

    /// Artifact locations, with relative paths resolved against `artifact_dir`.
    pub fn artifact_paths(&self) -> ArtifactPaths {
        let resolve = |path: &Path| match &self.artifact_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        ArtifactPaths {
            model: resolve(&self.model_path),
            scaler: resolve(&self.scaler_path),
            encoders: resolve(&self.encoders_path),
            feature_names: resolve(&self.feature_names_path),
        }
    }

    pub fn unknown_category_policy(&self) -> UnknownCategoryPolicy {
        UnknownCategoryPolicy::DefaultCode(self.unknown_category_code)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
