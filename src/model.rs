//! The exported predictive pipeline: a standardization step plus a logistic
//! classifier, loaded once at startup from a JSON artifact.
//!
//! The artifact carries exactly what the request pipeline needs from the
//! trained model: per-feature `mean`/`scale` statistics (in the published
//! column order) and the classifier weights. Loading validates shape and
//! statistics, so downstream code never has to re-check them — in
//! particular, a zero or non-finite `scale` entry is rejected here instead
//! of surfacing as a division blow-up during explanation.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{FeatureVector, FEATURE_COUNT};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model artifact: {reason}")]
    Invalid { reason: String },
}

/// Fitted per-feature statistics of the pipeline's scaling step, ordered
/// identically to [`crate::features::FEATURE_NAMES`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerStats {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl ScalerStats {
    /// Standardize a feature row against the fitted statistics.
    pub fn z_scores(&self, features: &FeatureVector) -> [f64; FEATURE_COUNT] {
        let mut z = [0.0; FEATURE_COUNT];
        for (i, value) in features.values().iter().enumerate() {
            z[i] = (value - self.mean[i]) / self.scale[i];
        }
        z
    }
}

/// Weights of the binary logistic classifier, in the published column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticWeights {
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// Anything that can turn a feature row into a two-class probability
/// distribution. Index 1 is the high-risk class.
pub trait ProbabilityModel: Send + Sync {
    fn predict_proba(&self, features: &FeatureVector) -> [f64; 2];
}

/// The deployed scaler + logistic-regression pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmePipeline {
    scaler: ScalerStats,
    classifier: LogisticWeights,
}

impl TmePipeline {
    pub fn new(scaler: ScalerStats, classifier: LogisticWeights) -> Result<Self, ModelError> {
        let pipeline = Self { scaler, classifier };
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Load and validate the pipeline artifact.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        let pipeline: Self = serde_json::from_str(&raw)?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    pub fn scaler(&self) -> &ScalerStats {
        &self.scaler
    }

    fn validate(&self) -> Result<(), ModelError> {
        check_len("scaler.mean", self.scaler.mean.len())?;
        check_len("scaler.scale", self.scaler.scale.len())?;
        check_len("classifier.coefficients", self.classifier.coefficients.len())?;

        for (i, value) in self.scaler.mean.iter().enumerate() {
            if !value.is_finite() {
                return Err(invalid(format!("scaler.mean[{i}] is not finite")));
            }
        }
        for (i, value) in self.scaler.scale.iter().enumerate() {
            if !value.is_finite() || *value <= 0.0 {
                return Err(invalid(format!(
                    "scaler.scale[{i}] must be finite and positive"
                )));
            }
        }
        for (i, value) in self.classifier.coefficients.iter().enumerate() {
            if !value.is_finite() {
                return Err(invalid(format!("classifier.coefficients[{i}] is not finite")));
            }
        }
        if !self.classifier.intercept.is_finite() {
            return Err(invalid("classifier.intercept is not finite".to_string()));
        }
        Ok(())
    }
}

fn check_len(field: &str, len: usize) -> Result<(), ModelError> {
    if len == FEATURE_COUNT {
        Ok(())
    } else {
        Err(invalid(format!(
            "{field} has length {len}, expected {FEATURE_COUNT}"
        )))
    }
}

fn invalid(reason: String) -> ModelError {
    ModelError::Invalid { reason }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl ProbabilityModel for TmePipeline {
    fn predict_proba(&self, features: &FeatureVector) -> [f64; 2] {
        let z = self.scaler.z_scores(features);
        let linear: f64 = z
            .iter()
            .zip(&self.classifier.coefficients)
            .map(|(z, c)| z * c)
            .sum::<f64>()
            + self.classifier.intercept;
        let high_risk = sigmoid(linear);
        [1.0 - high_risk, high_risk]
    }
}
