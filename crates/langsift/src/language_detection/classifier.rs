//! Shared language classifier.
//!
//! [`LanguageClassifier`] owns a [`LanguageModel`] behind a mutex and exposes a
//! single operation, [`LanguageClassifier::classify`], which runs detect and reset
//! as one critical section. The raw detect/reset pair is never reachable from
//! outside, so no caller can forget the reset.
//!
//! [`ClassifierSlot`] holds the process-wide handle: the first worker to start up
//! loads the model, every later worker gets the same `Arc`.

use super::{Detection, LanguageModel, names};
use crate::Result;
use once_cell::sync::OnceCell;
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Language of one document as reported to the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageClassification {
    pub code: String,
    /// Table name for `code`, or `code` itself when the table has no entry
    pub display_name: String,
    pub confidence: Option<f64>,
}

impl From<Detection> for LanguageClassification {
    fn from(detection: Detection) -> Self {
        Self {
            display_name: names::display_name(&detection.code),
            code: detection.code,
            confidence: detection.confidence,
        }
    }
}

/// Resets the model when dropped, including on unwind.
struct ResetGuard<'a> {
    model: MutexGuard<'a, Box<dyn LanguageModel>>,
}

impl Drop for ResetGuard<'_> {
    fn drop(&mut self) {
        self.model.reset();
    }
}

/// Thread-safe adapter around a loaded [`LanguageModel`].
///
/// # Example
///
/// ```rust
/// use langsift::core::config::LanguageDetectionConfig;
/// use langsift::language_detection::{LanguageClassifier, WhatlangModel};
///
/// # fn main() -> langsift::Result<()> {
/// let model = WhatlangModel::load(&LanguageDetectionConfig::default())?;
/// let classifier = LanguageClassifier::new(Box::new(model));
///
/// let text = "Le comité a examiné le rapport annuel et a décidé que l'inventaire \
///     de l'entrepôt devait être recompté avant la fin du mois.";
/// let result = classifier.classify(text)?;
/// assert_eq!(result.code, "fr");
/// assert_eq!(result.display_name, "French");
/// # Ok(())
/// # }
/// ```
pub struct LanguageClassifier {
    model_name: String,
    model: Mutex<Box<dyn LanguageModel>>,
}

impl LanguageClassifier {
    pub fn new(model: Box<dyn LanguageModel>) -> Self {
        Self {
            model_name: model.name().to_string(),
            model: Mutex::new(model),
        }
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Detect the language of `text` and reset the model before releasing it.
    ///
    /// The reset happens whether detection succeeds, fails, or panics.
    pub fn classify(&self, text: &str) -> Result<LanguageClassification> {
        let mut guard = ResetGuard {
            model: self.model.lock(),
        };
        let detection = guard.model.detect(text)?;
        drop(guard);

        tracing::debug!(
            model = %self.model_name,
            code = %detection.code,
            confidence = ?detection.confidence,
            "Classified text"
        );

        Ok(detection.into())
    }
}

impl std::fmt::Debug for LanguageClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageClassifier")
            .field("model_name", &self.model_name)
            .finish_non_exhaustive()
    }
}

/// Loads a fresh model. Called at most once per successful [`ClassifierSlot`] load.
pub type ModelLoader = Box<dyn Fn() -> Result<Box<dyn LanguageModel>> + Send + Sync>;

/// Once-initialised home of the shared [`LanguageClassifier`].
///
/// A failed load leaves the slot empty, so the next start-up tries again.
pub struct ClassifierSlot {
    cell: OnceCell<Arc<LanguageClassifier>>,
    loader: ModelLoader,
    loads: AtomicUsize,
}

impl ClassifierSlot {
    pub fn new(loader: ModelLoader) -> Self {
        Self {
            cell: OnceCell::new(),
            loader,
            loads: AtomicUsize::new(0),
        }
    }

    /// Slot that loads the whatlang model described by `config`.
    pub fn whatlang(config: crate::core::config::LanguageDetectionConfig) -> Self {
        Self::new(Box::new(move || {
            let model = super::WhatlangModel::load(&config)?;
            Ok(Box::new(model) as Box<dyn LanguageModel>)
        }))
    }

    /// Return the shared classifier, loading the model on first use.
    ///
    /// Concurrent callers block until the first load finishes; only one of them
    /// runs the loader.
    pub fn get_or_load(&self) -> Result<Arc<LanguageClassifier>> {
        self.cell
            .get_or_try_init(|| {
                let model = (self.loader)()?;
                self.loads.fetch_add(1, Ordering::AcqRel);
                tracing::info!(model = model.name(), "Language model loaded");
                Ok(Arc::new(LanguageClassifier::new(model)))
            })
            .cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Number of successful model loads (0 or 1).
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Acquire)
    }
}

impl std::fmt::Debug for ClassifierSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierSlot")
            .field("loaded", &self.is_loaded())
            .field("loads", &self.load_count())
            .finish()
    }
}
