//! Feature preparation and inference.
//!
//! Turns a [`PropertyRecord`] into the model's input row:
//! 1. encode categorical columns (unseen values follow the
//!    [`UnknownCategoryPolicy`]),
//! 2. fill features the record lacks with `0.0`,
//! 3. lay values out in canonical feature-name order,
//! 4. apply the scaler.

use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::artifacts::encoder::Encoded;
use crate::artifacts::{Encoders, FeatureScaler, RegressionModel, UnknownCategoryPolicy};
use crate::prediction::record::{value_to_category, value_to_f64, PropertyRecord};

const MISSING_FEATURE_VALUE: f64 = 0.0;

#[derive(Debug, Error)]
pub enum FeatureError {
    #[error("could not convert value for feature '{feature}' to float: {value}")]
    NotNumeric { feature: String, value: String },

    #[error("model produced a non-finite prediction")]
    NonFiniteOutput,
}

/// Borrowed view over a fully loaded artifact set.
#[derive(Debug, Clone, Copy)]
pub struct Predictor<'a> {
    model: &'a RegressionModel,
    scaler: &'a FeatureScaler,
    encoders: &'a Encoders,
    feature_names: &'a [String],
    policy: UnknownCategoryPolicy,
}

impl<'a> Predictor<'a> {
    pub(crate) fn new(
        model: &'a RegressionModel,
        scaler: &'a FeatureScaler,
        encoders: &'a Encoders,
        feature_names: &'a [String],
        policy: UnknownCategoryPolicy,
    ) -> Self {
        Self {
            model,
            scaler,
            encoders,
            feature_names,
            policy,
        }
    }

    pub fn model_type(&self) -> &'static str {
        self.model.type_name()
    }

    pub fn scaler_type(&self) -> &'static str {
        self.scaler.type_name()
    }

    pub fn feature_names(&self) -> &'a [String] {
        self.feature_names
    }

    pub fn categorical_features(&self) -> Vec<String> {
        self.encoders.columns().map(str::to_string).collect()
    }

    /// Builds the scaled feature vector. Its length always equals
    /// `feature_names().len()`.
    pub fn prepare_features(&self, record: &PropertyRecord) -> Result<Vec<f64>, FeatureError> {
        let mut row = Vec::with_capacity(self.feature_names.len());

        for feature in self.feature_names {
            let value = match (record.get(feature), self.encoders.get(feature)) {
                (None, _) => MISSING_FEATURE_VALUE,
                (Some(raw), Some(encoder)) => {
                    let category = value_to_category(raw);
                    match encoder.transform_or(&category, self.policy) {
                        Encoded::Known(code) => code,
                        Encoded::Substituted(code) => {
                            warn!(column = %feature, value = %category, "Unknown category, using default encoding");
                            code
                        }
                    }
                }
                (Some(raw), None) => numeric(feature, raw)?,
            };
            row.push(value);
        }

        self.scaler.transform(&mut row);
        Ok(row)
    }

    pub fn predict(&self, record: &PropertyRecord) -> Result<f64, FeatureError> {
        let row = self.prepare_features(record)?;
        let prediction = self.model.predict(&row);
        if !prediction.is_finite() {
            return Err(FeatureError::NonFiniteOutput);
        }
        Ok(prediction)
    }
}

fn numeric(feature: &str, raw: &Value) -> Result<f64, FeatureError> {
    value_to_f64(raw).ok_or_else(|| FeatureError::NotNumeric {
        feature: feature.to_string(),
        value: value_to_category(raw),
    })
}
