//! Duplicate detection against the remote store
//!
//! Each kind has its own notion of "already uploaded":
//!
//! - **Document**: a remote document stores the same content fingerprint.
//!   Records written before fingerprints were stored are matched on file
//!   name and text instead.
//! - **Interview**: same target position and CV text.
//! - **Question bank**: same name.
//!
//! A failed remote query is an error, never "not a duplicate".

use async_trait::async_trait;
use core_content::{
    ContentAddresser, DocumentEntry, InterviewSession, KeyOrder, LocalItem, QuestionBank,
    RemoteStore,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::Result;

/// Decides whether a local item already exists remotely
#[async_trait]
pub trait DuplicateCheck: Send + Sync {
    async fn is_duplicate(&self, item: &LocalItem) -> Result<bool>;
}

pub struct DuplicateClassifier {
    store: Arc<dyn RemoteStore>,
    addresser: ContentAddresser,
}

impl DuplicateClassifier {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            addresser: ContentAddresser::new(),
        }
    }

    pub fn with_addresser(mut self, addresser: ContentAddresser) -> Self {
        self.addresser = addresser;
        self
    }

    async fn document_exists(&self, entry: &DocumentEntry) -> Result<bool> {
        let fingerprint = self.addresser.fingerprint_document(entry)?;
        // Hashes written by older clients kept the analysis keys unsorted
        let legacy = match self.addresser.key_order() {
            KeyOrder::Canonical => Some(
                ContentAddresser::new()
                    .with_key_order(KeyOrder::AsSerialized)
                    .fingerprint_document(entry)?,
            ),
            KeyOrder::AsSerialized => None,
        };

        let remote = self.store.list_documents().await?;
        let found = remote.iter().any(|doc| match doc.content_hash.as_deref() {
            Some(stored) => {
                fingerprint.matches(stored)
                    || legacy.as_ref().is_some_and(|fp| fp.matches(stored))
            }
            None => doc.file_name == entry.file_name && doc.document_text == entry.document_text,
        });

        debug!(
            fingerprint = %fingerprint,
            remote_count = remote.len(),
            found,
            "Checked document against remote"
        );
        Ok(found)
    }

    async fn interview_exists(&self, session: &InterviewSession) -> Result<bool> {
        let remote = self.store.list_interviews().await?;
        Ok(remote.iter().any(|interview| {
            interview.target_position == session.target_position
                && interview.cv_content == session.cv_content
        }))
    }

    async fn question_bank_exists(&self, bank: &QuestionBank) -> Result<bool> {
        let remote = self.store.list_question_banks().await?;
        Ok(remote.iter().any(|existing| existing.name == bank.name))
    }
}

#[async_trait]
impl DuplicateCheck for DuplicateClassifier {
    #[instrument(skip_all, fields(kind = %item.kind()))]
    async fn is_duplicate(&self, item: &LocalItem) -> Result<bool> {
        match item {
            LocalItem::Document(entry) => self.document_exists(entry).await,
            LocalItem::Interview(session) => self.interview_exists(session).await,
            LocalItem::QuestionBank(bank) => self.question_bank_exists(bank).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorClass, SyncError};
    use core_content::remote::{InjectedFailure, NewDocument, NewInterview, NewQuestionBank};
    use core_content::{DocumentAnalysis, InMemoryRemoteStore, InterviewFeedback};
    use serde_json::json;

    fn entry(name: &str, text: &str) -> DocumentEntry {
        DocumentEntry::new(
            name,
            text,
            DocumentAnalysis {
                summary: "Cell biology basics".to_string(),
                topics: vec!["cells".to_string()],
                ..Default::default()
            },
        )
    }

    fn session(position: &str, cv: &str) -> InterviewSession {
        InterviewSession {
            cv_content: cv.to_string(),
            cv_file_name: None,
            target_position: position.to_string(),
            interview_type: "technical".to_string(),
            custom_prompt: None,
            exchanges: vec![],
            feedback: InterviewFeedback::default(),
            completed_at: None,
        }
    }

    async fn store_with_document(doc: NewDocument) -> Arc<InMemoryRemoteStore> {
        let store = Arc::new(InMemoryRemoteStore::new());
        store.create_document(&doc).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_document_matched_by_fingerprint() {
        let local = entry("notes.pdf", "Mitochondria are the powerhouse");
        let hash = ContentAddresser::new().fingerprint_document(&local).unwrap();
        let store = store_with_document(NewDocument {
            file_name: "renamed.pdf".to_string(),
            document_text: local.document_text.clone(),
            analysis: serde_json::to_value(&local.analysis).unwrap(),
            content_hash: Some(hash.into_string().to_uppercase()),
        })
        .await;

        let classifier = DuplicateClassifier::new(store);
        assert!(classifier.is_duplicate(&local.into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_document_matched_by_unsorted_legacy_hash() {
        let local = entry("notes.pdf", "Mitochondria are the powerhouse");
        let legacy = ContentAddresser::new()
            .with_key_order(KeyOrder::AsSerialized)
            .fingerprint_document(&local)
            .unwrap();
        let store = store_with_document(NewDocument {
            file_name: "notes.pdf".to_string(),
            document_text: String::new(),
            analysis: json!({}),
            content_hash: Some(legacy.into_string()),
        })
        .await;

        let classifier = DuplicateClassifier::new(store);
        assert!(classifier.is_duplicate(&local.into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_document_without_hash_matched_by_name_and_text() {
        let local = entry("notes.pdf", "Mitochondria are the powerhouse");
        let store = store_with_document(NewDocument {
            file_name: "notes.pdf".to_string(),
            document_text: "Mitochondria are the powerhouse".to_string(),
            analysis: json!(null),
            content_hash: None,
        })
        .await;
        let classifier = DuplicateClassifier::new(store);

        assert!(classifier.is_duplicate(&local.into()).await.unwrap());

        let edited = entry("notes.pdf", "Ribosomes build proteins");
        assert!(!classifier.is_duplicate(&edited.into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_changed_analysis_is_not_a_duplicate() {
        let local = entry("notes.pdf", "Mitochondria are the powerhouse");
        let hash = ContentAddresser::new().fingerprint_document(&local).unwrap();
        let store = store_with_document(NewDocument {
            file_name: "notes.pdf".to_string(),
            document_text: local.document_text.clone(),
            analysis: json!({}),
            content_hash: Some(hash.into_string()),
        })
        .await;

        let mut reanalyzed = local.clone();
        reanalyzed.analysis.summary = "Energy production".to_string();

        let classifier = DuplicateClassifier::new(store);
        assert!(!classifier.is_duplicate(&reanalyzed.into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_interview_matched_by_position_and_cv() {
        let store = Arc::new(InMemoryRemoteStore::new());
        store
            .create_interview(&NewInterview {
                cv_content: "10 years of Rust".to_string(),
                cv_file_name: None,
                target_position: "Engineer".to_string(),
                interview_type: "technical".to_string(),
                custom_prompt: None,
                questions: vec![],
                answers: vec![],
                overall_score: None,
                feedback: json!({}),
                completed_at: None,
                status: "completed".to_string(),
            })
            .await
            .unwrap();
        let classifier = DuplicateClassifier::new(store);

        let same = session("Engineer", "10 years of Rust");
        let other_role = session("Manager", "10 years of Rust");
        assert!(classifier.is_duplicate(&same.into()).await.unwrap());
        assert!(!classifier.is_duplicate(&other_role.into()).await.unwrap());
    }

    #[tokio::test]
    async fn test_question_bank_matched_by_name() {
        let store = Arc::new(InMemoryRemoteStore::new());
        store
            .create_question_bank(&NewQuestionBank {
                name: "Algebra".to_string(),
                description: None,
                subject: None,
                tags: None,
                questions: vec![],
                is_public: None,
                usage_count: None,
            })
            .await
            .unwrap();
        let classifier = DuplicateClassifier::new(store);

        assert!(classifier
            .is_duplicate(&QuestionBank::new("Algebra").into())
            .await
            .unwrap());
        assert!(!classifier
            .is_duplicate(&QuestionBank::new("Geometry").into())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_remote_failure_is_an_error() {
        let store = Arc::new(InMemoryRemoteStore::new());
        store.fail_next_lists(1, InjectedFailure::Status(503));
        let classifier = DuplicateClassifier::new(store);

        let err = classifier
            .is_duplicate(&QuestionBank::new("Algebra").into())
            .await
            .unwrap_err();
        assert!(matches!(err, SyncError::Store(_)));
        assert_eq!(err.class(), ErrorClass::TransientNetwork);
    }
}
