//! Shared fixtures for unit tests: a small linear housing model whose
//! predictions are easy to compute by hand.
//!
//! Scaling only touches `area` ((area - 1000) / 500), so the price is
//! `2_000_000 + 100_000 * scaled_area + Σ coef * raw_value`.

use std::path::Path;
use std::sync::Arc;

use crate::artifacts::model::LinearModel;
use crate::artifacts::{
    ArtifactPaths, Encoders, FeatureScaler, LabelEncoder, ModelArtifacts, RegressionModel,
};
use crate::state::AppState;

pub const FEATURES: [&str; 12] = [
    "area",
    "bedrooms",
    "bathrooms",
    "stories",
    "mainroad",
    "guestroom",
    "basement",
    "hotwaterheating",
    "airconditioning",
    "parking",
    "prefarea",
    "furnishingstatus",
];

/// Price of the documented simple-endpoint defaults.
pub const DEFAULTS_PRICE: f64 = 2_330_000.0;

pub fn feature_names() -> Vec<String> {
    FEATURES.iter().map(|f| f.to_string()).collect()
}

pub fn model() -> RegressionModel {
    RegressionModel::LinearRegression(LinearModel {
        coef: vec![
            100_000.0, // area (scaled)
            50_000.0,  // bedrooms
            80_000.0,  // bathrooms
            20_000.0,  // stories
            10_000.0,  // mainroad
            5_000.0,   // guestroom
            5_000.0,   // basement
            3_000.0,   // hotwaterheating
            30_000.0,  // airconditioning
            10_000.0,  // parking
            40_000.0,  // prefarea
            -10_000.0, // furnishingstatus
        ],
        intercept: 2_000_000.0,
    })
}

pub fn scaler() -> FeatureScaler {
    let mut mean = vec![0.0; FEATURES.len()];
    let mut scale = vec![1.0; FEATURES.len()];
    mean[0] = 1000.0;
    scale[0] = 500.0;
    FeatureScaler::StandardScaler { mean, scale }
}

pub fn encoders() -> Encoders {
    let yes_no = || LabelEncoder::new(vec!["no".to_string(), "yes".to_string()]);
    let mut columns: Vec<(String, LabelEncoder)> = [
        "mainroad",
        "guestroom",
        "basement",
        "hotwaterheating",
        "airconditioning",
        "prefarea",
    ]
    .iter()
    .map(|c| (c.to_string(), yes_no()))
    .collect();
    columns.push((
        "furnishingstatus".to_string(),
        LabelEncoder::new(vec![
            "furnished".to_string(),
            "semi-furnished".to_string(),
            "unfurnished".to_string(),
        ]),
    ));
    columns.into_iter().collect()
}

pub fn artifacts() -> ModelArtifacts {
    ModelArtifacts::from_parts(model(), scaler(), encoders(), feature_names())
        .expect("fixture artifacts are consistent")
}

pub fn state() -> AppState {
    AppState::new(Arc::new(artifacts()))
}

/// Writes the fixture artifacts as JSON files under `dir`.
pub fn write_artifacts(dir: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths {
        model: dir.join("housingModel.json"),
        scaler: dir.join("scaler.json"),
        encoders: dir.join("encoders.json"),
        feature_names: dir.join("feature_names.json"),
    };
    let write = |path: &Path, json: String| std::fs::write(path, json).unwrap();
    write(&paths.model, serde_json::to_string(&model()).unwrap());
    write(&paths.scaler, serde_json::to_string(&scaler()).unwrap());
    write(&paths.encoders, serde_json::to_string(&encoders()).unwrap());
    write(
        &paths.feature_names,
        serde_json::to_string(&feature_names()).unwrap(),
    );
    paths
}
