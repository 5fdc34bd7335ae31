use crate::features::FieldType;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub const SUPPORTED_SCHEMA_VERSION: u32 = 1;

/// Serialized form of the fitted classifier.
///
/// The training side exports the fitted estimator as a JSON document: the
/// feature schema it was fitted on, calibrated per-value contributions, and
/// the decision threshold tuned during evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema_version: u32,
    pub features: Vec<FeatureSpec>,
    pub intercept: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Class labels; the positive (fraud) class sits at index 1.
    #[serde(default = "default_classes")]
    pub classes: [i64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Log-odds contribution per observed value; categorical features only.
    #[serde(default)]
    pub weights: HashMap<String, f64>,
    /// Multiplier applied to the raw value; numeric features only.
    #[serde(default)]
    pub coefficient: f64,
}

impl ModelArtifact {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let artifact: Self = serde_json::from_slice(bytes)
            .map_err(|e| Error::artifact(format!("malformed artifact: {e}")))?;
        artifact.validate()?;
        Ok(artifact)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SUPPORTED_SCHEMA_VERSION {
            return Err(Error::artifact(format!(
                "unsupported schema version {} (expected {})",
                self.schema_version, SUPPORTED_SCHEMA_VERSION
            )));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::artifact(format!(
                "threshold {} outside [0, 1]",
                self.threshold
            )));
        }
        if !self.intercept.is_finite() {
            return Err(Error::artifact("intercept is not finite"));
        }
        let mut seen = HashSet::new();
        for feature in &self.features {
            if !seen.insert(feature.name.as_str()) {
                return Err(Error::artifact(format!(
                    "duplicate feature name: {}",
                    feature.name
                )));
            }
        }
        Ok(())
    }

    /// Declared type per feature name; drives normalization.
    pub fn feature_types(&self) -> HashMap<String, FieldType> {
        self.features
            .iter()
            .map(|f| (f.name.clone(), f.field_type))
            .collect()
    }
}

fn default_threshold() -> f64 {
    0.5
}

fn default_classes() -> [i64; 2] {
    [0, 1]
}
