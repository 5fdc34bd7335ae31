use crate::features::{self, Record};
use crate::model::ModelProvider;
use crate::{Error, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// Index-aligned prediction labels and positive-class probabilities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutput {
    pub predictions: Vec<i64>,
    pub probabilities: Vec<f64>,
}

impl PredictionOutput {
    pub fn empty() -> Self {
        Self {
            predictions: Vec::new(),
            probabilities: Vec::new(),
        }
    }
}

/// Normalize, predict, and shape the result for one batch of raw records.
pub struct PredictionPipeline {
    provider: Arc<ModelProvider>,
}

impl PredictionPipeline {
    pub fn new(provider: Arc<ModelProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<ModelProvider> {
        &self.provider
    }

    /// Runs the batch through normalization and the model.
    ///
    /// Output vectors always have the batch's length, in the batch's order.
    /// An empty batch yields empty outputs without touching the model loader.
    pub async fn predict_batch(&self, batch: &[Record]) -> Result<PredictionOutput> {
        if batch.is_empty() {
            return Ok(PredictionOutput::empty());
        }

        let model = self.provider.ensure_loaded().await?;
        let normalized = features::normalize(batch, model.feature_types());
        debug!("Normalized {} records", normalized.len());

        let predictions = model.predict(&normalized)?;
        let proba = model.predict_proba(&normalized)?;
        if predictions.len() != batch.len() || proba.len() != batch.len() {
            return Err(Error::prediction(format!(
                "model returned {} labels and {} probability pairs for {} records",
                predictions.len(),
                proba.len(),
                batch.len()
            )));
        }

        let probabilities = proba.iter().map(|pair| pair[1]).collect();
        Ok(PredictionOutput {
            predictions,
            probabilities,
        })
    }
}
