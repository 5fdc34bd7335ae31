use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tabpfn_serve::features::{FieldType, Record};
use tabpfn_serve::model::{Classifier, ModelLoader};
use tabpfn_serve::{Error, Result};

/// Stub classifier emitting preset positive-class probabilities by record
/// index, with a 0.5 threshold. Captures every batch it is asked to score so
/// tests can assert on what normalization produced.
#[derive(Debug)]
pub struct StubClassifier {
    probabilities: Vec<f64>,
    feature_types: HashMap<String, FieldType>,
    seen: Mutex<Vec<Vec<Record>>>,
}

impl StubClassifier {
    pub fn fixed(probabilities: Vec<f64>) -> Self {
        assert!(!probabilities.is_empty());
        Self {
            probabilities,
            feature_types: HashMap::new(),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Batches observed by `predict`, in call order.
    pub fn seen_batches(&self) -> Vec<Vec<Record>> {
        self.seen.lock().unwrap().clone()
    }

    fn proba_at(&self, index: usize) -> f64 {
        self.probabilities[index % self.probabilities.len()]
    }
}

impl Classifier for StubClassifier {
    fn predict(&self, batch: &[Record]) -> Result<Vec<i64>> {
        self.seen.lock().unwrap().push(batch.to_vec());
        Ok((0..batch.len())
            .map(|i| i64::from(self.proba_at(i) >= 0.5))
            .collect())
    }

    fn predict_proba(&self, batch: &[Record]) -> Result<Vec<[f64; 2]>> {
        Ok((0..batch.len())
            .map(|i| {
                let p = self.proba_at(i);
                [1.0 - p, p]
            })
            .collect())
    }

    fn feature_types(&self) -> &HashMap<String, FieldType> {
        &self.feature_types
    }
}

/// Loader double: counts load attempts, optionally fails the first N of them,
/// optionally sleeps to widen the first-load race window.
pub struct CountingLoader {
    classifier: Arc<StubClassifier>,
    loads: Arc<AtomicUsize>,
    remaining_failures: Arc<AtomicUsize>,
    delay: Duration,
}

impl CountingLoader {
    pub fn new(classifier: Arc<StubClassifier>) -> Self {
        Self {
            classifier,
            loads: Arc::new(AtomicUsize::new(0)),
            remaining_failures: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
        }
    }

    pub fn failing_first(self, failures: usize) -> Self {
        self.remaining_failures.store(failures, Ordering::SeqCst);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Shared handle to the load-attempt counter; survives boxing the loader.
    pub fn load_counter(&self) -> Arc<AtomicUsize> {
        self.loads.clone()
    }
}

#[async_trait]
impl ModelLoader for CountingLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.loads.fetch_add(1, Ordering::SeqCst);

        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok();
        if failed {
            return Err(Error::model_load("artifact missing"));
        }

        let classifier: Arc<dyn Classifier> = self.classifier.clone();
        Ok(classifier)
    }
}
