//! Module factory: owns the shared services and creates workers.

use crate::core::config::LangsiftConfig;
use crate::extraction::{OfficeTextExtractor, TextExtractor};
use crate::ingest::{FileIngestModule, IngestModuleFactory};
use crate::jobs::{JobLifecycleCoordinator, JobStatsRegistry};
use crate::language_detection::ClassifierSlot;
use crate::sinks::{ArtifactSink, NotificationSink, TracingNotifier};
use crate::Result;
use crate::worker::FileClassificationWorker;
use std::sync::Arc;

pub const MODULE_NAME: &str = "Language Detector";

pub const MODULE_DESCRIPTION: &str =
    "Extracts text from Office and PDF documents and records the natural language each one is written in.";

/// Factory shared by every worker of one module instance.
///
/// All workers it creates share one [`JobStatsRegistry`], one language model and
/// the same sinks.
///
/// # Example
///
/// ```rust
/// use langsift::LangsiftConfig;
/// use langsift::factory::LanguageDetectorFactory;
/// use langsift::ingest::{FileIngestModule, IngestModuleFactory, JobHandle};
/// use langsift::sinks::MemoryArtifactSink;
/// use std::sync::Arc;
///
/// # fn main() -> langsift::Result<()> {
/// let factory = LanguageDetectorFactory::new(LangsiftConfig::default(), Arc::new(MemoryArtifactSink::new()))?;
///
/// let mut worker = factory.create_file_module();
/// worker.start_up(Arc::new(JobHandle::new(1)))?;
/// worker.shut_down()?;
/// # Ok(())
/// # }
/// ```
pub struct LanguageDetectorFactory {
    config: Arc<LangsiftConfig>,
    coordinator: Arc<JobLifecycleCoordinator>,
    extractor: Arc<dyn TextExtractor>,
    artifacts: Arc<dyn ArtifactSink>,
}

impl LanguageDetectorFactory {
    /// Factory with the whatlang model, the Office extractor and a tracing notifier.
    ///
    /// # Errors
    ///
    /// `Validation` if `config` is invalid.
    pub fn new(config: LangsiftConfig, artifacts: Arc<dyn ArtifactSink>) -> Result<Self> {
        Self::builder(config, artifacts).build()
    }

    pub fn builder(config: LangsiftConfig, artifacts: Arc<dyn ArtifactSink>) -> LanguageDetectorFactoryBuilder {
        LanguageDetectorFactoryBuilder {
            config,
            artifacts,
            registry: None,
            classifier: None,
            extractor: None,
            notifier: None,
        }
    }

    pub fn registry(&self) -> &Arc<JobStatsRegistry> {
        self.coordinator.registry()
    }

    pub fn config(&self) -> &LangsiftConfig {
        &self.config
    }

    /// Create a concrete worker (as opposed to the boxed trait object of
    /// [`IngestModuleFactory::create_file_module`]).
    pub fn create_worker(&self) -> FileClassificationWorker {
        FileClassificationWorker::new(
            self.coordinator.clone(),
            self.config.clone(),
            self.extractor.clone(),
            self.artifacts.clone(),
        )
    }
}

impl IngestModuleFactory for LanguageDetectorFactory {
    fn module_name(&self) -> &str {
        MODULE_NAME
    }

    fn module_description(&self) -> &str {
        MODULE_DESCRIPTION
    }

    fn module_version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn create_file_module(&self) -> Box<dyn FileIngestModule> {
        Box::new(self.create_worker())
    }
}

/// Builder for factories with injected collaborators.
///
/// Unset parts fall back to the defaults used by [`LanguageDetectorFactory::new`].
pub struct LanguageDetectorFactoryBuilder {
    config: LangsiftConfig,
    artifacts: Arc<dyn ArtifactSink>,
    registry: Option<Arc<JobStatsRegistry>>,
    classifier: Option<Arc<ClassifierSlot>>,
    extractor: Option<Arc<dyn TextExtractor>>,
    notifier: Option<Arc<dyn NotificationSink>>,
}

impl LanguageDetectorFactoryBuilder {
    pub fn registry(mut self, registry: Arc<JobStatsRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn classifier(mut self, classifier: Arc<ClassifierSlot>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn TextExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn build(self) -> Result<LanguageDetectorFactory> {
        self.config.validate()?;

        let classifier = self
            .classifier
            .unwrap_or_else(|| Arc::new(ClassifierSlot::whatlang(self.config.language_detection.clone())));
        let extractor = self
            .extractor
            .unwrap_or_else(|| {
                Arc::new(OfficeTextExtractor::new(self.config.libreoffice_timeout_secs)) as Arc<dyn TextExtractor>
            });
        let coordinator = Arc::new(JobLifecycleCoordinator::new(
            MODULE_NAME,
            self.registry.unwrap_or_default(),
            classifier,
            self.notifier
                .unwrap_or_else(|| Arc::new(TracingNotifier) as Arc<dyn NotificationSink>),
        ));

        Ok(LanguageDetectorFactory {
            config: Arc::new(self.config),
            coordinator,
            extractor,
            artifacts: self.artifacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::JobHandle;
    use crate::sinks::{MemoryArtifactSink, MemoryNotifier};

    #[test]
    fn test_module_identity() {
        let factory = LanguageDetectorFactory::new(LangsiftConfig::default(), Arc::new(MemoryArtifactSink::new())).unwrap();
        assert_eq!(factory.module_name(), "Language Detector");
        assert!(!factory.module_description().is_empty());
        assert_eq!(factory.module_version(), env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = LangsiftConfig {
            supported_extensions: vec![],
            ..Default::default()
        };
        assert!(LanguageDetectorFactory::new(config, Arc::new(MemoryArtifactSink::new())).is_err());
    }

    #[test]
    fn test_workers_share_registry_and_notifier() {
        let notifier = Arc::new(MemoryNotifier::new());
        let registry = Arc::new(JobStatsRegistry::new());
        let factory = LanguageDetectorFactory::builder(LangsiftConfig::default(), Arc::new(MemoryArtifactSink::new()))
            .registry(registry.clone())
            .notifier(notifier.clone())
            .build()
            .unwrap();

        let mut first = factory.create_file_module();
        let mut second = factory.create_file_module();
        first.start_up(Arc::new(JobHandle::new(9))).unwrap();
        second.start_up(Arc::new(JobHandle::new(9))).unwrap();
        assert_eq!(registry.snapshot(9).unwrap().active_workers, 2);

        first.shut_down().unwrap();
        second.shut_down().unwrap();
        assert_eq!(notifier.summaries().len(), 1);
        assert!(factory.registry().is_finalized(9));
    }
}
