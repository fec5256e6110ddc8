//! Integration tests for batch sync
//!
//! These tests drive `SyncOrchestrator::sync_all` end to end:
//! - Empty batches and ordering of outcomes
//! - Duplicate skips (no upload issued)
//! - Retry counts per kind
//! - Remote store effects: one record per document, even on a flaky network
//! - Progress callback sequence and event bus publishing

use async_trait::async_trait;
use bridge_traits::time::{Clock, SystemClock};
use bridge_traits::BridgeError;
use core_content::remote::InjectedFailure;
use core_content::{
    BankQuestion, DocumentAnalysis, DocumentEntry, InMemoryRemoteStore, InterviewFeedback,
    InterviewSession, ItemKind, LocalItem, QuestionAnswer, QuestionBank, RemoteRecord, StoreError,
};
use core_runtime::events::{CoreEvent, EventBus, ItemStatus, SyncEvent};
use core_sync::{
    DuplicateCheck, DuplicateClassifier, ErrorClass, ItemUpload, OutcomeStatus, ProgressEvent,
    RemoteItemUploader, Result, RetryPolicy, SyncConfig, SyncError, SyncOrchestrator, SyncSummary,
};
use mockall::mock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

// ============================================================================
// Mocks and fixtures
// ============================================================================

mock! {
    Classifier {}

    #[async_trait]
    impl DuplicateCheck for Classifier {
        async fn is_duplicate(&self, item: &LocalItem) -> Result<bool>;
    }
}

mock! {
    Uploader {}

    #[async_trait]
    impl ItemUpload for Uploader {
        async fn upload(&self, item: &LocalItem) -> Result<RemoteRecord>;
    }
}

fn document(name: &str, text: &str) -> DocumentEntry {
    DocumentEntry::new(
        name,
        text,
        DocumentAnalysis {
            summary: format!("Summary of {}", text),
            topics: vec!["biology".to_string()],
            ..Default::default()
        },
    )
}

fn interview(position: &str) -> InterviewSession {
    InterviewSession {
        cv_content: "Built distributed systems in Rust".to_string(),
        cv_file_name: Some("cv.pdf".to_string()),
        target_position: position.to_string(),
        interview_type: "technical".to_string(),
        custom_prompt: None,
        exchanges: vec![QuestionAnswer {
            question: "Tell me about ownership".to_string(),
            answer: "Each value has one owner".to_string(),
        }],
        feedback: InterviewFeedback {
            score: Some(75.0),
            ..Default::default()
        },
        completed_at: None,
    }
}

fn bank(name: &str) -> QuestionBank {
    let mut bank = QuestionBank::new(name);
    bank.questions.push(BankQuestion::new("What is 2 + 2?"));
    bank
}

fn unavailable() -> SyncError {
    SyncError::Store(StoreError::Status {
        status: 503,
        message: "service unavailable".to_string(),
    })
}

fn not_duplicate() -> MockClassifier {
    let mut classifier = MockClassifier::new();
    classifier.expect_is_duplicate().returning(|_| Ok(false));
    classifier
}

fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::default()
        .with_max_attempts(max_attempts)
        .with_base_delay(std::time::Duration::from_millis(10))
}

fn pipeline(store: Arc<InMemoryRemoteStore>) -> SyncOrchestrator {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    SyncOrchestrator::new(
        Arc::new(DuplicateClassifier::new(store.clone())),
        Arc::new(RemoteItemUploader::new(store, clock)),
        SyncConfig::default(),
    )
}

fn with_mocks(
    classifier: MockClassifier,
    uploader: MockUploader,
    config: SyncConfig,
) -> SyncOrchestrator {
    SyncOrchestrator::new(Arc::new(classifier), Arc::new(uploader), config)
}

// ============================================================================
// Batch shape
// ============================================================================

#[tokio::test]
async fn test_empty_batch_reports_nothing() {
    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let orchestrator = pipeline(Arc::new(InMemoryRemoteStore::new())).with_event_bus(bus);

    let mut callbacks = 0;
    let outcomes = orchestrator.sync_all(&[], &[], |_| callbacks += 1).await;

    assert!(outcomes.is_empty());
    assert_eq!(callbacks, 0);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn test_one_outcome_per_item_in_flattened_order() {
    let store = Arc::new(InMemoryRemoteStore::new());
    let history: Vec<LocalItem> = vec![
        interview("Engineer").into(),
        document("a.pdf", "alpha").into(),
        interview("Architect").into(),
        document("b.pdf", "beta").into(),
    ];
    let banks = vec![bank("Algebra"), bank("Geometry")];

    let outcomes = pipeline(store.clone()).sync_all(&history, &banks, |_| {}).await;

    let labels: Vec<&str> = outcomes.iter().map(|o| o.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "a.pdf",
            "b.pdf",
            "Interview: Engineer",
            "Interview: Architect",
            "Algebra",
            "Geometry",
        ]
    );
    assert!(outcomes.iter().all(|o| o.is_success()));
    assert_eq!(outcomes[2].kind, ItemKind::Interview);

    assert_eq!(store.documents().len(), 2);
    assert_eq!(store.interviews().len(), 2);
    assert_eq!(store.question_banks().len(), 2);
    assert_eq!(
        outcomes[4].remote_id(),
        Some(store.question_banks()[0].id.as_str())
    );
}

// ============================================================================
// Duplicates
// ============================================================================

#[tokio::test]
async fn test_duplicate_is_never_uploaded() {
    let mut classifier = MockClassifier::new();
    classifier.expect_is_duplicate().times(1).returning(|_| Ok(true));
    let mut uploader = MockUploader::new();
    uploader.expect_upload().times(0);

    let orchestrator = with_mocks(classifier, uploader, SyncConfig::default());
    let outcomes = orchestrator
        .sync_all(&[document("notes.pdf", "text").into()], &[], |_| {})
        .await;

    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].is_duplicate());
    assert_eq!(
        outcomes[0].status,
        OutcomeStatus::Failure {
            class: ErrorClass::Duplicate,
            message: "duplicate".to_string(),
        }
    );
}

#[tokio::test]
async fn test_same_document_twice_leaves_one_remote_record() {
    let store = Arc::new(InMemoryRemoteStore::new());
    let orchestrator = pipeline(store.clone());
    let history: Vec<LocalItem> = vec![
        document("notes.pdf", "Mitochondria").into(),
        document("notes-copy.pdf", "Mitochondria").into(),
    ];

    let first = orchestrator.sync_all(&history, &[], |_| {}).await;
    assert!(first[0].is_success());
    assert!(first[1].is_duplicate());

    // A second run over the same history writes nothing
    let second = orchestrator.sync_all(&history, &[], |_| {}).await;
    assert!(second.iter().all(|o| o.is_duplicate()));

    assert_eq!(store.documents().len(), 1);
    assert_eq!(store.create_calls().documents, 1);
}

#[tokio::test]
async fn test_conflict_on_write_is_reported_as_duplicate() {
    let store = Arc::new(InMemoryRemoteStore::new().with_unique_constraints());
    pipeline(store.clone())
        .sync_all(&[], &[bank("Algebra")], |_| {})
        .await;

    // Classifier misses it, the store rejects the write with 409
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let orchestrator = SyncOrchestrator::new(
        Arc::new(not_duplicate()),
        Arc::new(RemoteItemUploader::new(store.clone(), clock)),
        SyncConfig::default().with_question_bank_retry(fast_retry(3)),
    );

    let outcomes = orchestrator.sync_all(&[], &[bank("Algebra")], |_| {}).await;

    assert_eq!(outcomes[0].error_class(), Some(ErrorClass::Duplicate));
    assert_eq!(store.question_banks().len(), 1);
    // 409 is terminal: one write for the first run, one rejected write
    assert_eq!(store.create_calls().question_banks, 2);
}

// ============================================================================
// Retries
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_document_fails_twice_then_succeeds_in_three_calls() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut uploader = MockUploader::new();
    uploader.expect_upload().times(3).returning(move |item| {
        if counter.fetch_add(1, Ordering::SeqCst) < 2 {
            Err(unavailable())
        } else {
            Ok(RemoteRecord::new(item.kind(), "doc-1"))
        }
    });

    let orchestrator = with_mocks(not_duplicate(), uploader, SyncConfig::default());
    let outcomes = orchestrator
        .sync_all(&[document("notes.pdf", "text").into()], &[], |_| {})
        .await;

    assert_eq!(outcomes[0].remote_id(), Some("doc-1"));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_upload_stops_at_max_attempts() {
    let mut uploader = MockUploader::new();
    uploader.expect_upload().times(4).returning(|_| Err(unavailable()));

    let config = SyncConfig::default().with_document_retry(fast_retry(4));
    let orchestrator = with_mocks(not_duplicate(), uploader, config);
    let outcomes = orchestrator
        .sync_all(&[document("notes.pdf", "text").into()], &[], |_| {})
        .await;

    assert_eq!(outcomes[0].error_class(), Some(ErrorClass::TransientNetwork));
}

#[tokio::test(start_paused = true)]
async fn test_always_failing_document_uses_three_attempts_by_default() {
    let mut uploader = MockUploader::new();
    uploader.expect_upload().times(3).returning(|_| Err(unavailable()));

    let orchestrator = with_mocks(not_duplicate(), uploader, SyncConfig::default());
    let outcomes = orchestrator
        .sync_all(&[document("notes.pdf", "text").into()], &[], |_| {})
        .await;

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].error_class(), Some(ErrorClass::TransientNetwork));
}

#[tokio::test(start_paused = true)]
async fn test_unreadable_response_body_is_not_retried() {
    let mut uploader = MockUploader::new();
    uploader.expect_upload().times(1).returning(|_| {
        Err(SyncError::Store(StoreError::Network(BridgeError::OperationFailed(
            "Failed to read response body: operation timed out".to_string(),
        ))))
    });

    let orchestrator = with_mocks(not_duplicate(), uploader, SyncConfig::default());
    let outcomes = orchestrator
        .sync_all(&[document("notes.pdf", "text").into()], &[], |_| {})
        .await;

    assert_eq!(outcomes[0].error_class(), Some(ErrorClass::Unknown));
}

#[tokio::test(start_paused = true)]
async fn test_interviews_and_banks_get_a_single_attempt_by_default() {
    let mut uploader = MockUploader::new();
    uploader.expect_upload().times(2).returning(|_| Err(unavailable()));

    let orchestrator = with_mocks(not_duplicate(), uploader, SyncConfig::default());
    let outcomes = orchestrator
        .sync_all(&[interview("Engineer").into()], &[bank("Algebra")], |_| {})
        .await;

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| !o.is_success()));
}

#[tokio::test(start_paused = true)]
async fn test_validation_error_is_not_retried() {
    let mut uploader = MockUploader::new();
    uploader.expect_upload().times(1).returning(|_| {
        Err(SyncError::Store(StoreError::Status {
            status: 422,
            message: "documentText is required".to_string(),
        }))
    });

    let orchestrator = with_mocks(not_duplicate(), uploader, SyncConfig::default());
    let outcomes = orchestrator
        .sync_all(&[document("empty.pdf", "").into()], &[], |_| {})
        .await;

    assert_eq!(outcomes[0].error_class(), Some(ErrorClass::Validation));
    let summary = SyncSummary::from_outcomes(&outcomes);
    assert!(summary.message().contains("documentText is required"));
}

#[tokio::test(start_paused = true)]
async fn test_flaky_network_writes_document_once() {
    let store = Arc::new(InMemoryRemoteStore::new());
    store.fail_next_creates(2, InjectedFailure::Network);

    let outcomes = pipeline(store.clone())
        .sync_all(&[document("notes.pdf", "Krebs cycle").into()], &[], |_| {})
        .await;

    assert!(outcomes[0].is_success());
    assert_eq!(store.documents().len(), 1);
    assert_eq!(store.create_calls().documents, 3);
}

// ============================================================================
// Failure isolation
// ============================================================================

#[tokio::test]
async fn test_classification_error_fails_only_that_item() {
    let store = Arc::new(InMemoryRemoteStore::new());
    store.fail_next_lists(1, InjectedFailure::Status(500));

    let history: Vec<LocalItem> = vec![
        document("a.pdf", "alpha").into(),
        document("b.pdf", "beta").into(),
    ];
    let outcomes = pipeline(store.clone()).sync_all(&history, &[bank("Algebra")], |_| {}).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].error_class(), Some(ErrorClass::TransientNetwork));
    assert!(outcomes[1].is_success());
    assert!(outcomes[2].is_success());
    assert_eq!(store.create_calls().documents, 1);
}

// ============================================================================
// Progress and events
// ============================================================================

#[tokio::test]
async fn test_five_items_report_six_progress_events() {
    let store = Arc::new(InMemoryRemoteStore::new());
    let history: Vec<LocalItem> = vec![
        document("1.pdf", "one").into(),
        document("2.pdf", "two").into(),
        interview("Engineer").into(),
    ];
    let banks = vec![bank("Algebra"), bank("Geometry")];

    let mut progress: Vec<ProgressEvent> = Vec::new();
    pipeline(store)
        .sync_all(&history, &banks, |event| progress.push(event.clone()))
        .await;

    assert_eq!(
        progress,
        vec![
            ProgressEvent::new(0, 5, "1.pdf"),
            ProgressEvent::new(1, 5, "2.pdf"),
            ProgressEvent::new(2, 5, "Interview: Engineer"),
            ProgressEvent::new(3, 5, "Algebra"),
            ProgressEvent::new(4, 5, "Geometry"),
            ProgressEvent::new(5, 5, ""),
        ]
    );
    assert!(progress.windows(2).all(|w| w[0].completed < w[1].completed));
}

#[tokio::test]
async fn test_run_is_published_on_event_bus() {
    let bus = EventBus::new(64);
    let mut events = bus.subscribe();
    let store = Arc::new(InMemoryRemoteStore::new());
    let history: Vec<LocalItem> = vec![
        document("a.pdf", "alpha").into(),
        document("a-again.pdf", "alpha").into(),
    ];

    pipeline(store)
        .with_event_bus(bus)
        .sync_all(&history, &[], |_| {})
        .await;

    let mut received = Vec::new();
    while let Ok(CoreEvent::Sync(event)) = events.try_recv() {
        received.push(event);
    }

    assert!(matches!(received.first(), Some(SyncEvent::Started { total: 2, .. })));
    let statuses: Vec<ItemStatus> = received
        .iter()
        .filter_map(|e| match e {
            SyncEvent::ItemCompleted { status, .. } => Some(*status),
            _ => None,
        })
        .collect();
    assert_eq!(statuses, vec![ItemStatus::Uploaded, ItemStatus::Duplicate]);
    assert!(matches!(
        received.last(),
        Some(SyncEvent::Completed {
            succeeded: 1,
            duplicates: 1,
            failed: 0,
            ..
        })
    ));
    assert!(received.iter().any(|e| matches!(
        e,
        SyncEvent::Progress {
            completed: 2,
            total: 2,
            percent: 100,
            ..
        }
    )));
}
