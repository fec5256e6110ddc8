//! Translation of local items into remote writes
//!
//! One `upload` is exactly one `create_*` call on the store. The uploader
//! never retries and never interprets a store error; both are the caller's
//! business.

use async_trait::async_trait;
use bridge_traits::time::Clock;
use core_content::remote::{
    InterviewAnswer, InterviewQuestion, NewDocument, NewInterview, NewQuestionBank,
};
use core_content::{
    ContentAddresser, DocumentEntry, InterviewSession, ItemKind, LocalItem, QuestionBank,
    RemoteRecord, RemoteStore,
};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{Result, SyncError};

const DEFAULT_INTERVIEW_TYPE: &str = "general";
const COMPLETED_STATUS: &str = "completed";

/// Writes one local item to the remote store
#[async_trait]
pub trait ItemUpload: Send + Sync {
    async fn upload(&self, item: &LocalItem) -> Result<RemoteRecord>;
}

pub struct RemoteItemUploader {
    store: Arc<dyn RemoteStore>,
    addresser: ContentAddresser,
    clock: Arc<dyn Clock>,
}

impl RemoteItemUploader {
    pub fn new(store: Arc<dyn RemoteStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            addresser: ContentAddresser::new(),
            clock,
        }
    }

    pub fn with_addresser(mut self, addresser: ContentAddresser) -> Self {
        self.addresser = addresser;
        self
    }

    /// Request body for a document, content hash included
    pub fn document_payload(&self, entry: &DocumentEntry) -> Result<NewDocument> {
        let content_hash = self.addresser.fingerprint_document(entry)?;
        let analysis = serde_json::to_value(&entry.analysis).map_err(|e| SyncError::Encoding {
            kind: ItemKind::Document,
            message: e.to_string(),
        })?;

        Ok(NewDocument {
            file_name: entry.file_name.clone(),
            document_text: entry.document_text.clone(),
            analysis,
            content_hash: Some(content_hash.into_string()),
        })
    }

    /// Request body for an interview
    ///
    /// Exchanges are split into parallel question and answer lists linked by
    /// 1-based ids.
    pub fn interview_payload(&self, session: &InterviewSession) -> Result<NewInterview> {
        let (questions, answers): (Vec<_>, Vec<_>) = session
            .exchanges
            .iter()
            .zip(1u32..)
            .map(|(exchange, id)| {
                (
                    InterviewQuestion {
                        id,
                        question: exchange.question.clone(),
                    },
                    InterviewAnswer {
                        question_id: id,
                        answer: exchange.answer.clone(),
                    },
                )
            })
            .unzip();

        let feedback = serde_json::to_value(&session.feedback).map_err(|e| SyncError::Encoding {
            kind: ItemKind::Interview,
            message: e.to_string(),
        })?;

        let interview_type = if session.interview_type.trim().is_empty() {
            DEFAULT_INTERVIEW_TYPE.to_string()
        } else {
            session.interview_type.clone()
        };

        let completed_at = match session.completed_at {
            Some(at) => at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            None => self.clock.now_rfc3339(),
        };

        Ok(NewInterview {
            cv_content: session.cv_content.clone(),
            cv_file_name: session.cv_file_name.clone(),
            target_position: session.target_position.clone(),
            interview_type,
            custom_prompt: session.custom_prompt.clone(),
            questions,
            answers,
            overall_score: session.feedback.score,
            feedback,
            completed_at: Some(completed_at),
            status: COMPLETED_STATUS.to_string(),
        })
    }

    /// Request body for a question bank
    pub fn question_bank_payload(&self, bank: &QuestionBank) -> NewQuestionBank {
        NewQuestionBank {
            name: bank.name.clone(),
            description: bank.description.clone(),
            subject: bank.subject.clone(),
            tags: (!bank.tags.is_empty()).then(|| bank.tags.clone()),
            questions: bank.questions.clone(),
            is_public: Some(bank.is_public),
            usage_count: Some(bank.usage_count),
        }
    }
}

#[async_trait]
impl ItemUpload for RemoteItemUploader {
    #[instrument(skip_all, fields(kind = %item.kind()))]
    async fn upload(&self, item: &LocalItem) -> Result<RemoteRecord> {
        let record = match item {
            LocalItem::Document(entry) => {
                let payload = self.document_payload(entry)?;
                let created = self.store.create_document(&payload).await?;
                RemoteRecord::new(ItemKind::Document, created.id)
            }
            LocalItem::Interview(session) => {
                let payload = self.interview_payload(session)?;
                let created = self.store.create_interview(&payload).await?;
                RemoteRecord::new(ItemKind::Interview, created.id)
            }
            LocalItem::QuestionBank(bank) => {
                let payload = self.question_bank_payload(bank);
                let created = self.store.create_question_bank(&payload).await?;
                RemoteRecord::new(ItemKind::QuestionBank, created.id)
            }
        };

        debug!(id = %record.id, "Created remote record");
        Ok(record)
    }
}
