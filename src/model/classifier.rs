use super::ModelArtifact;
use crate::features::{FieldType, Record};
use crate::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;

/// A fitted binary classifier over normalized tabular records.
///
/// Implementations are read-only after construction; concurrent prediction
/// calls are safe without further locking.
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Class label per record, index-aligned with the input.
    fn predict(&self, batch: &[Record]) -> Result<Vec<i64>>;

    /// `[negative, positive]` probability pair per record.
    fn predict_proba(&self, batch: &[Record]) -> Result<Vec<[f64; 2]>>;

    /// Declared type of every feature the model was fitted on.
    fn feature_types(&self) -> &HashMap<String, FieldType>;
}

/// Artifact-backed classifier: a calibrated additive scorer over the fitted
/// feature schema, squashed through a sigmoid.
#[derive(Debug)]
pub struct FittedClassifier {
    artifact: ModelArtifact,
    feature_types: HashMap<String, FieldType>,
}

impl FittedClassifier {
    pub fn new(artifact: ModelArtifact) -> Self {
        let feature_types = artifact.feature_types();
        Self {
            artifact,
            feature_types,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.artifact.threshold
    }

    /// Positive-class probability for one record.
    ///
    /// Fields absent from the record and category values unseen in training
    /// contribute nothing. A value contradicting the declared feature type is
    /// a prediction error.
    fn positive_proba(&self, record: &Record) -> Result<f64> {
        let mut z = self.artifact.intercept;
        for feature in &self.artifact.features {
            let Some(value) = record.get(&feature.name) else {
                continue;
            };
            match feature.field_type {
                FieldType::Numeric => match value {
                    Value::Number(n) => {
                        z += feature.coefficient * n.as_f64().unwrap_or(0.0);
                    }
                    Value::Null => {}
                    other => {
                        return Err(Error::prediction(format!(
                            "field '{}' expected a number, got {}",
                            feature.name,
                            value_kind(other)
                        )));
                    }
                },
                FieldType::Categorical => match value {
                    Value::String(s) => {
                        z += feature.weights.get(s).copied().unwrap_or(0.0);
                    }
                    Value::Null => {}
                    other => {
                        return Err(Error::prediction(format!(
                            "field '{}' expected a string, got {}",
                            feature.name,
                            value_kind(other)
                        )));
                    }
                },
            }
        }
        Ok(sigmoid(z))
    }
}

impl Classifier for FittedClassifier {
    fn predict(&self, batch: &[Record]) -> Result<Vec<i64>> {
        batch
            .iter()
            .map(|record| {
                let proba = self.positive_proba(record)?;
                Ok(if proba >= self.artifact.threshold {
                    self.artifact.classes[1]
                } else {
                    self.artifact.classes[0]
                })
            })
            .collect()
    }

    fn predict_proba(&self, batch: &[Record]) -> Result<Vec<[f64; 2]>> {
        batch
            .iter()
            .map(|record| {
                let proba = self.positive_proba(record)?;
                Ok([1.0 - proba, proba])
            })
            .collect()
    }

    fn feature_types(&self) -> &HashMap<String, FieldType> {
        &self.feature_types
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
