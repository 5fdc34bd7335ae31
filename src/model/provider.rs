use super::{Classifier, FittedClassifier, ModelArtifact};
use crate::{Error, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

/// Source of a fitted classifier. The production implementation reads an
/// artifact file; tests substitute counting or failing doubles.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Classifier>>;
}

/// Loads and validates a JSON artifact from the filesystem.
pub struct ArtifactLoader {
    path: PathBuf,
}

impl ArtifactLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ModelLoader for ArtifactLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            Error::model_load(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let artifact = ModelArtifact::from_slice(&bytes)?;

        info!(
            "Model loaded from {} ({} features, threshold {})",
            self.path.display(),
            artifact.features.len(),
            artifact.threshold
        );

        Ok(Arc::new(FittedClassifier::new(artifact)))
    }
}

/// Lazily-initialized model handle shared across request handlers.
///
/// The once-cell serializes the load only: concurrent first callers trigger a
/// single load and all wait on it, while prediction calls on the loaded model
/// run in parallel. A failed load leaves the cell empty, so the next call
/// retries instead of serving a poisoned handle forever.
pub struct ModelProvider {
    loader: Box<dyn ModelLoader>,
    model: OnceCell<Arc<dyn Classifier>>,
}

impl ModelProvider {
    pub fn new(loader: Box<dyn ModelLoader>) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(ArtifactLoader::new(path)))
    }

    /// Returns the loaded model, loading it on first use.
    pub async fn ensure_loaded(&self) -> Result<Arc<dyn Classifier>> {
        self.model
            .get_or_try_init(|| self.loader.load())
            .await
            .cloned()
    }

    /// Whether a load has already succeeded. Never triggers a load.
    pub fn is_loaded(&self) -> bool {
        self.model.initialized()
    }
}
