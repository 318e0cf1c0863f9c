//! Shared fixtures for langsift integration tests.

#![allow(dead_code)]

use langsift::extraction::TextExtractor;
use langsift::ingest::{FileKind, IngestFile, KnownStatus};
use langsift::jobs::JobStatsRegistry;
use langsift::language_detection::{ClassifierSlot, Detection, LanguageModel};
use langsift::sinks::{MemoryArtifactSink, MemoryNotifier};
use langsift::{LangsiftConfig, LangsiftError, LanguageDetectorFactory, Result};
use std::io::{Cursor, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

pub const ENGLISH: &str = "The committee reviewed the annual statement and agreed that the warehouse \
    inventory should be counted again before the end of the month. Several managers asked for a \
    detailed schedule of the remaining deliveries.";

pub const FRENCH: &str = "Le comité a examiné le rapport annuel et a décidé que l'inventaire \
    de l'entrepôt devait être recompté avant la fin du mois.";

pub const RUSSIAN: &str = "Комитет рассмотрел годовой отчёт и решил, что складские запасы \
    необходимо пересчитать до конца месяца. Несколько руководителей попросили подробный график \
    оставшихся поставок.";

/// In-memory file whose bytes are its text.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    pub id: u64,
    pub name: String,
    pub extension: String,
    pub kind: FileKind,
    pub known: KnownStatus,
    pub content: Vec<u8>,
}

impl MemoryFile {
    pub fn new(id: u64, name: &str, content: impl Into<Vec<u8>>) -> Self {
        let extension = name.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("").to_string();
        Self {
            id,
            name: name.to_string(),
            extension,
            kind: FileKind::Regular,
            known: KnownStatus::Unknown,
            content: content.into(),
        }
    }

    pub fn known(mut self) -> Self {
        self.known = KnownStatus::Known;
        self
    }
}

impl IngestFile for MemoryFile {
    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn extension(&self) -> &str {
        &self.extension
    }

    fn kind(&self) -> FileKind {
        self.kind
    }

    fn known_status(&self) -> KnownStatus {
        self.known
    }

    fn open(&self) -> std::io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(Cursor::new(self.content.clone())))
    }
}

/// Treats file bytes as UTF-8 text regardless of extension, counting calls.
#[derive(Debug, Default)]
pub struct Utf8Extractor {
    pub calls: AtomicUsize,
}

impl Utf8Extractor {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl TextExtractor for Utf8Extractor {
    fn extract(&self, bytes: &[u8], _extension: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        String::from_utf8(bytes.to_vec()).map_err(|e| LangsiftError::parsing_with_source("not UTF-8", e))
    }
}

/// Model that always reports the same code.
pub struct FixedModel(pub &'static str);

impl LanguageModel for FixedModel {
    fn name(&self) -> &str {
        "fixed"
    }

    fn detect(&mut self, _text: &str) -> Result<Detection> {
        Ok(Detection {
            code: self.0.to_string(),
            confidence: Some(1.0),
        })
    }

    fn reset(&mut self) {}
}

/// A factory wired to in-memory sinks and a UTF-8 extractor.
pub struct Harness {
    pub factory: LanguageDetectorFactory,
    pub registry: Arc<JobStatsRegistry>,
    pub artifacts: Arc<MemoryArtifactSink>,
    pub notifier: Arc<MemoryNotifier>,
    pub extractor: Arc<Utf8Extractor>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_classifier(Arc::new(ClassifierSlot::whatlang(Default::default())))
    }

    pub fn with_classifier(classifier: Arc<ClassifierSlot>) -> Self {
        let registry = Arc::new(JobStatsRegistry::new());
        let artifacts = Arc::new(MemoryArtifactSink::new());
        let notifier = Arc::new(MemoryNotifier::new());
        let extractor = Arc::new(Utf8Extractor::default());

        let factory = LanguageDetectorFactory::builder(LangsiftConfig::default(), artifacts.clone())
            .registry(registry.clone())
            .classifier(classifier)
            .extractor(extractor.clone())
            .notifier(notifier.clone())
            .build()
            .expect("default config is valid");

        Self {
            factory,
            registry,
            artifacts,
            notifier,
            extractor,
        }
    }
}

/// Minimal PPTX package with one slide per entry of `slides`.
pub fn pptx_bytes(slides: &[&str]) -> Vec<u8> {
    use std::io::Write;
    use zip::write::{SimpleFileOptions, ZipWriter};

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        for (i, text) in slides.iter().enumerate() {
            zip.start_file(format!("ppt/slides/slide{}.xml", i + 1), options)
                .unwrap();
            write!(
                zip,
                r#"<?xml version="1.0" encoding="UTF-8"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"
       xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld>
</p:sld>"#,
                text
            )
            .unwrap();
        }
        zip.finish().unwrap();
    }
    buffer
}
