//! Job lifecycle behaviour across workers: start-up, per-file processing,
//! cancellation and the one-time job summary.

mod helpers;

use helpers::{ENGLISH, FRENCH, FixedModel, Harness, MemoryFile, RUSSIAN};
use langsift::ingest::{FileKind, IngestModuleFactory, JobHandle};
use langsift::language_detection::{ClassifierSlot, LanguageModel};
use langsift::types::{FileOutcome, ProcessResult, SkipReason};
use langsift::{LangsiftError, LanguageDetectionConfig};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_two_workers_one_job_single_summary() {
    let harness = Harness::new();
    let job = JobHandle::new(42);

    let docx = MemoryFile::new(1, "memo.docx", ENGLISH);
    let pdf = MemoryFile::new(2, "contract.pdf", RUSSIAN);

    let mut worker_a = harness.factory.create_file_module();
    let mut worker_b = harness.factory.create_file_module();
    worker_a.start_up(Arc::new(job.clone())).unwrap();
    worker_b.start_up(Arc::new(job.clone())).unwrap();

    let snapshot = harness.registry.snapshot(42).unwrap();
    assert_eq!(snapshot.active_workers, 2);
    assert_eq!(snapshot.files_processed, 0);

    let (outcome_a, outcome_b) = std::thread::scope(|scope| {
        let outcome_a = scope.spawn(|| worker_a.process(&docx)).join().unwrap().unwrap();
        let snapshot = harness.registry.snapshot(42).unwrap();
        assert_eq!(snapshot.files_processed, 1);
        assert_eq!(snapshot.processing_time, outcome_a.record().unwrap().elapsed);

        let outcome_b = scope.spawn(|| worker_b.process(&pdf)).join().unwrap().unwrap();
        assert_eq!(harness.registry.snapshot(42).unwrap().files_processed, 2);
        (outcome_a, outcome_b)
    });

    let english = outcome_a.record().unwrap().clone();
    let russian = outcome_b.record().unwrap().clone();
    assert_eq!(english.language_name, "English");
    assert_eq!(russian.language_name, "Russian");

    worker_a.shut_down().unwrap();
    let snapshot = harness.registry.snapshot(42).unwrap();
    assert_eq!(snapshot.active_workers, 1);
    assert_eq!(snapshot.files_processed, 2);
    assert!(harness.notifier.summaries().is_empty());
    worker_b.shut_down().unwrap();

    let summaries = harness.notifier.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].job_id, 42);
    assert_eq!(summaries[0].files_processed, 2);
    assert_eq!(summaries[0].processing_time, english.elapsed + russian.elapsed);
    assert!(harness.registry.snapshot(42).is_none());

    let names: Vec<String> = harness
        .artifacts
        .records()
        .into_iter()
        .map(|record| record.language_name)
        .collect();
    assert_eq!(names.len(), 2);
    assert!(names.contains(&"English".to_string()));
    assert!(names.contains(&"Russian".to_string()));
}

#[test]
fn test_reset_between_files_on_shared_classifier() {
    let harness = Harness::new();
    let mut worker = harness.factory.create_file_module();
    worker.start_up(Arc::new(JobHandle::new(1))).unwrap();

    let first = worker
        .process(&MemoryFile::new(1, "a.docx", ENGLISH.repeat(4)))
        .unwrap();
    let second = worker.process(&MemoryFile::new(2, "b.docx", FRENCH)).unwrap();

    assert_eq!(first.record().unwrap().language_code, "en");
    assert_eq!(second.record().unwrap().language_code, "fr");
    assert_eq!(second.record().unwrap().language_name, "French");
}

#[test]
fn test_unsupported_extension_bypasses_pipeline() {
    let harness = Harness::new();
    let mut worker = harness.factory.create_file_module();
    worker.start_up(Arc::new(JobHandle::new(7))).unwrap();

    let result = worker.process(&MemoryFile::new(1, "readme.txt", ENGLISH));
    assert_eq!(ProcessResult::from(&result), ProcessResult::Ok);
    assert_eq!(result.unwrap(), FileOutcome::Skipped(SkipReason::UnsupportedExtension));

    assert_eq!(harness.extractor.calls(), 0);
    assert_eq!(harness.registry.snapshot(7).unwrap().files_processed, 0);
    assert_eq!(harness.registry.snapshot(7).unwrap().processing_time, Duration::ZERO);
    assert!(harness.artifacts.is_empty());
}

#[test]
fn test_known_file_bypasses_pipeline() {
    let harness = Harness::new();
    let mut worker = harness.factory.create_file_module();
    worker.start_up(Arc::new(JobHandle::new(7))).unwrap();

    let outcome = worker
        .process(&MemoryFile::new(1, "installer.docx", ENGLISH).known())
        .unwrap();
    assert_eq!(outcome, FileOutcome::Skipped(SkipReason::KnownFile));
    assert_eq!(harness.extractor.calls(), 0);
    assert_eq!(harness.registry.snapshot(7).unwrap().files_processed, 0);
}

#[test]
fn test_unallocated_blocks_bypass_pipeline() {
    let harness = Harness::new();
    let mut worker = harness.factory.create_file_module();
    worker.start_up(Arc::new(JobHandle::new(7))).unwrap();

    let mut file = MemoryFile::new(1, "carved.pdf", ENGLISH);
    file.kind = FileKind::UnallocatedBlocks;
    assert_eq!(
        worker.process(&file).unwrap(),
        FileOutcome::Skipped(SkipReason::NotRegularFile)
    );
    assert_eq!(harness.extractor.calls(), 0);
}

#[test]
fn test_cancelled_job_never_extracts() {
    let harness = Harness::new();
    let job = JobHandle::new(11);
    let mut worker = harness.factory.create_file_module();
    worker.start_up(Arc::new(job.clone())).unwrap();
    job.cancel();

    for (id, name) in ["memo.docx", "readme.txt", "scan.pdf"].iter().enumerate() {
        let result = worker.process(&MemoryFile::new(id as u64, name, ENGLISH));
        assert_eq!(result.unwrap(), FileOutcome::Cancelled);
    }

    assert_eq!(harness.extractor.calls(), 0);
    assert!(harness.artifacts.is_empty());
    assert_eq!(harness.notifier.infos().len(), 1);

    worker.shut_down().unwrap();
    let summaries = harness.notifier.summaries();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].files_processed, 0);
}

#[test]
fn test_unknown_code_passes_through_verbatim() {
    let slot = Arc::new(ClassifierSlot::new(Box::new(|| {
        Ok(Box::new(FixedModel("xx")) as Box<dyn LanguageModel>)
    })));
    let harness = Harness::with_classifier(slot);
    let mut worker = harness.factory.create_file_module();
    worker.start_up(Arc::new(JobHandle::new(3))).unwrap();

    let outcome = worker.process(&MemoryFile::new(1, "memo.docx", ENGLISH)).unwrap();
    let record = outcome.record().unwrap();
    assert_eq!(record.language_code, "xx");
    assert_eq!(record.language_name, "xx");
    assert!(!record.is_name_resolved());
    assert_eq!(harness.artifacts.records()[0].language_name, "xx");
}

#[test]
fn test_failed_model_load_aborts_start_up_without_counting() {
    let slot = Arc::new(ClassifierSlot::whatlang(LanguageDetectionConfig {
        min_confidence: 0.0,
        allowed_languages: Some(vec!["zz".to_string()]),
    }));
    let harness = Harness::with_classifier(slot.clone());
    let mut worker = harness.factory.create_file_module();

    let err = worker.start_up(Arc::new(JobHandle::new(5))).unwrap_err();
    assert!(matches!(err, LangsiftError::ModelLoad { .. }));
    assert!(harness.registry.snapshot(5).is_none());
    assert!(!slot.is_loaded());

    assert!(matches!(
        worker.process(&MemoryFile::new(1, "memo.docx", ENGLISH)),
        Err(LangsiftError::LifecycleViolation(_))
    ));
}

#[test]
fn test_model_loaded_once_for_all_workers() {
    let slot = Arc::new(ClassifierSlot::whatlang(LanguageDetectionConfig::default()));
    let harness = Harness::with_classifier(slot.clone());

    let mut workers: Vec<_> = (0..4).map(|_| harness.factory.create_file_module()).collect();
    for worker in &mut workers {
        worker.start_up(Arc::new(JobHandle::new(1))).unwrap();
    }
    for worker in &mut workers {
        worker.shut_down().unwrap();
    }

    assert_eq!(slot.load_count(), 1);
    assert_eq!(harness.notifier.summaries().len(), 1);
}

#[test]
fn test_failed_file_does_not_stop_the_job() {
    let harness = Harness::new();
    let mut worker = harness.factory.create_file_module();
    worker.start_up(Arc::new(JobHandle::new(2))).unwrap();

    let broken = MemoryFile::new(1, "broken.docx", vec![0xff, 0xfe, 0x00]);
    let result = worker.process(&broken);
    assert_eq!(ProcessResult::from(&result), ProcessResult::Error);

    let ok = worker.process(&MemoryFile::new(2, "memo.docx", ENGLISH)).unwrap();
    assert!(ok.record().is_some());

    worker.shut_down().unwrap();
    assert_eq!(harness.notifier.summaries()[0].files_processed, 1);
}

#[test]
fn test_double_shutdown_is_rejected() {
    let harness = Harness::new();
    let mut worker = harness.factory.create_file_module();
    worker.start_up(Arc::new(JobHandle::new(6))).unwrap();
    worker.shut_down().unwrap();

    assert!(matches!(worker.shut_down(), Err(LangsiftError::LifecycleViolation(_))));
    assert_eq!(harness.notifier.summaries().len(), 1);
    assert!(harness.registry.is_finalized(6));
}
