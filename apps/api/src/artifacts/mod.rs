//! Model artifacts: the four fitted objects the service needs for inference.
//!
//! Artifacts are loaded once at startup into an immutable [`ModelArtifacts`]
//! and shared read-only with every request through `AppState`.

pub mod encoder;
pub mod model;
pub mod scaler;

use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::info;

use crate::prediction::features::Predictor;

pub use encoder::{Encoders, LabelEncoder, UnknownCategoryPolicy};
pub use model::RegressionModel;
pub use scaler::FeatureScaler;

/// One of the four persisted artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Model,
    Scaler,
    Encoders,
    FeatureNames,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Model => "model",
            Component::Scaler => "scaler",
            Component::Encoders => "encoders",
            Component::FeatureNames => "feature names",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read {component} from {}: {source}", .path.display())]
    Io {
        component: Component,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {component} from {}: {source}", .path.display())]
    Parse {
        component: Component,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("inconsistent artifacts: {0}")]
    Inconsistent(String),
}

/// File locations of the four artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub scaler: PathBuf,
    pub encoders: PathBuf,
    pub feature_names: PathBuf,
}

/// Which components are present. Reported verbatim by `GET /health`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactStatus {
    pub model_loaded: bool,
    pub scaler_loaded: bool,
    pub encoders_loaded: bool,
    pub feature_names_loaded: bool,
}

impl ArtifactStatus {
    pub fn all_loaded(&self) -> bool {
        self.model_loaded && self.scaler_loaded && self.encoders_loaded && self.feature_names_loaded
    }
}

/// Immutable, process-wide inference context.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    model: Option<RegressionModel>,
    scaler: Option<FeatureScaler>,
    encoders: Option<Encoders>,
    feature_names: Option<Vec<String>>,
    unknown_category_policy: UnknownCategoryPolicy,
}

impl ModelArtifacts {
    /// Builds a complete context from already-parsed components.
    pub fn from_parts(
        model: RegressionModel,
        scaler: FeatureScaler,
        encoders: Encoders,
        feature_names: Vec<String>,
    ) -> Result<Self, ArtifactError> {
        model.validate()?;
        scaler.validate()?;
        let artifacts = Self {
            model: Some(model),
            scaler: Some(scaler),
            encoders: Some(encoders),
            feature_names: Some(feature_names),
            unknown_category_policy: UnknownCategoryPolicy::default(),
        };
        artifacts.check_consistency()?;
        Ok(artifacts)
    }

    /// Loads all four artifacts. Any failure is returned; nothing is partial.
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        let model = load_model(&paths.model)?;
        let scaler = load_scaler(&paths.scaler)?;
        let encoders = load_json::<Encoders>(Component::Encoders, &paths.encoders)?;
        info!("Encoders loaded ({} columns)", encoders.len());
        let feature_names = load_json::<Vec<String>>(Component::FeatureNames, &paths.feature_names)?;
        info!("Feature names loaded ({} features)", feature_names.len());

        let artifacts = Self {
            model: Some(model),
            scaler: Some(scaler),
            encoders: Some(encoders),
            feature_names: Some(feature_names),
            unknown_category_policy: UnknownCategoryPolicy::default(),
        };
        artifacts.check_consistency()?;
        Ok(artifacts)
    }

    /// Loads whatever components are readable and returns the failures for
    /// the rest. Components that did load must still agree with each other;
    /// a consistency failure is returned as an error.
    pub fn load_partial(paths: &ArtifactPaths) -> Result<(Self, Vec<ArtifactError>), ArtifactError> {
        let mut failures = Vec::new();
        let model = keep_loaded(load_model(&paths.model), &mut failures);
        let scaler = keep_loaded(load_scaler(&paths.scaler), &mut failures);
        let encoders = keep_loaded(
            load_json::<Encoders>(Component::Encoders, &paths.encoders),
            &mut failures,
        );
        let feature_names = keep_loaded(
            load_json::<Vec<String>>(Component::FeatureNames, &paths.feature_names),
            &mut failures,
        );

        let artifacts = Self {
            model,
            scaler,
            encoders,
            feature_names,
            unknown_category_policy: UnknownCategoryPolicy::default(),
        };
        artifacts.check_consistency()?;
        Ok((artifacts, failures))
    }

    /// A context with nothing loaded.
    pub fn empty() -> Self {
        Self {
            model: None,
            scaler: None,
            encoders: None,
            feature_names: None,
            unknown_category_policy: UnknownCategoryPolicy::default(),
        }
    }

    pub fn with_unknown_category_policy(mut self, policy: UnknownCategoryPolicy) -> Self {
        self.unknown_category_policy = policy;
        self
    }

    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            model_loaded: self.model.is_some(),
            scaler_loaded: self.scaler.is_some(),
            encoders_loaded: self.encoders.is_some(),
            feature_names_loaded: self.feature_names.is_some(),
        }
    }

    /// The inference view, available only when every component is loaded.
    pub fn predictor(&self) -> Option<Predictor<'_>> {
        Some(Predictor::new(
            self.model.as_ref()?,
            self.scaler.as_ref()?,
            self.encoders.as_ref()?,
            self.feature_names.as_deref()?,
            self.unknown_category_policy,
        ))
    }

    /// Cross-checks whichever components are present.
    fn check_consistency(&self) -> Result<(), ArtifactError> {
        let Some(names) = &self.feature_names else {
            return Ok(());
        };

        if names.is_empty() {
            return Err(ArtifactError::Inconsistent("feature name list is empty".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = names.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(ArtifactError::Inconsistent(format!("duplicate feature name '{dup}'")));
        }

        if let Some(model) = &self.model {
            if model.n_features() != names.len() {
                return Err(ArtifactError::Inconsistent(format!(
                    "model expects {} features, feature names list {}",
                    model.n_features(),
                    names.len()
                )));
            }
        }
        if let Some(width) = self.scaler.as_ref().and_then(FeatureScaler::n_features) {
            if width != names.len() {
                return Err(ArtifactError::Inconsistent(format!(
                    "scaler was fitted on {width} features, feature names list {}",
                    names.len()
                )));
            }
        }
        if let Some(encoders) = &self.encoders {
            if let Some(col) = encoders.columns().find(|c| !seen.contains(c)) {
                return Err(ArtifactError::Inconsistent(format!(
                    "encoder column '{col}' is not a feature"
                )));
            }
        }
        Ok(())
    }
}

fn keep_loaded<T>(result: Result<T, ArtifactError>, failures: &mut Vec<ArtifactError>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            failures.push(e);
            None
        }
    }
}

fn load_model(path: &Path) -> Result<RegressionModel, ArtifactError> {
    let model = load_json::<RegressionModel>(Component::Model, path)?;
    model.validate()?;
    info!("Model loaded ({}, {} features)", model.type_name(), model.n_features());
    Ok(model)
}

fn load_scaler(path: &Path) -> Result<FeatureScaler, ArtifactError> {
    let scaler = load_json::<FeatureScaler>(Component::Scaler, path)?;
    scaler.validate()?;
    info!("Scaler loaded ({})", scaler.type_name());
    Ok(scaler)
}

fn load_json<T: DeserializeOwned>(component: Component, path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        component,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        component,
        path: path.to_path_buf(),
        source,
    })
}
