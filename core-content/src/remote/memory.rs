//! In-process remote store
//!
//! Keeps records in memory and counts create calls, so tests can assert how
//! many writes a sync run issued. Failures can be queued to emulate an
//! unreliable network or a server that rejects requests, and unique
//! constraints can be switched on to emulate a store that answers 409 to
//! duplicates.

use async_trait::async_trait;
use bridge_traits::error::BridgeError;
use chrono::{SecondsFormat, Utc};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::records::{
    NewDocument, NewInterview, NewQuestion, NewQuestionBank, RemoteDocument, RemoteInterview,
    RemoteQuestion, RemoteQuestionBank,
};
use super::RemoteStore;
use crate::error::{StoreError, StoreResult};

/// A failure the store returns instead of serving a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectedFailure {
    /// The request never reached the store
    Network,
    /// The store answered with this status code
    Status(u16),
}

impl InjectedFailure {
    fn into_error(self) -> StoreError {
        match self {
            InjectedFailure::Network => {
                StoreError::Network(BridgeError::Connection("injected network failure".to_string()))
            }
            InjectedFailure::Status(status) => StoreError::Status {
                status,
                message: format!("injected failure ({})", status),
            },
        }
    }
}

/// Number of `create_*` calls received per collection, failed ones included
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CreateCalls {
    pub documents: usize,
    pub interviews: usize,
    pub questions: usize,
    pub question_banks: usize,
}

impl CreateCalls {
    pub fn total(&self) -> usize {
        self.documents + self.interviews + self.questions + self.question_banks
    }
}

#[derive(Default)]
struct State {
    documents: Vec<RemoteDocument>,
    interviews: Vec<RemoteInterview>,
    questions: Vec<RemoteQuestion>,
    question_banks: Vec<RemoteQuestionBank>,
    create_calls: CreateCalls,
    create_failures: VecDeque<InjectedFailure>,
    list_failures: VecDeque<InjectedFailure>,
}

/// Remote store living in process memory
#[derive(Default)]
pub struct InMemoryRemoteStore {
    state: Mutex<State>,
    unique_constraints: bool,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject duplicates with 409: documents by content hash, interviews by
    /// (position, CV), question banks by name
    pub fn with_unique_constraints(mut self) -> Self {
        self.unique_constraints = true;
        self
    }

    /// The next `count` create calls fail with `failure`
    pub fn fail_next_creates(&self, count: usize, failure: InjectedFailure) {
        let mut state = self.lock();
        state
            .create_failures
            .extend(std::iter::repeat(failure).take(count));
    }

    /// The next `count` list calls fail with `failure`
    pub fn fail_next_lists(&self, count: usize, failure: InjectedFailure) {
        let mut state = self.lock();
        state
            .list_failures
            .extend(std::iter::repeat(failure).take(count));
    }

    pub fn create_calls(&self) -> CreateCalls {
        self.lock().create_calls
    }

    pub fn documents(&self) -> Vec<RemoteDocument> {
        self.lock().documents.clone()
    }

    pub fn interviews(&self) -> Vec<RemoteInterview> {
        self.lock().interviews.clone()
    }

    pub fn questions(&self) -> Vec<RemoteQuestion> {
        self.lock().questions.clone()
    }

    pub fn question_banks(&self) -> Vec<RemoteQuestionBank> {
        self.lock().question_banks.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn conflict(message: &str) -> StoreError {
        StoreError::Status {
            status: 409,
            message: message.to_string(),
        }
    }

    fn check_list(state: &mut State) -> StoreResult<()> {
        match state.list_failures.pop_front() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn check_create(state: &mut State) -> StoreResult<()> {
        match state.create_failures.pop_front() {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }

    fn find<T: Clone>(
        items: &[T],
        id: &str,
        resource: &'static str,
        id_of: fn(&T) -> &str,
    ) -> StoreResult<T> {
        items
            .iter()
            .find(|item| id_of(item) == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                resource,
                id: id.to_string(),
            })
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemoteStore {
    async fn create_document(&self, document: &NewDocument) -> StoreResult<RemoteDocument> {
        let mut state = self.lock();
        state.create_calls.documents += 1;
        Self::check_create(&mut state)?;

        if self.unique_constraints {
            if let Some(hash) = &document.content_hash {
                if state
                    .documents
                    .iter()
                    .any(|d| d.content_hash.as_deref() == Some(hash.as_str()))
                {
                    return Err(Self::conflict("Document already exists"));
                }
            }
        }

        let record = RemoteDocument {
            id: Self::new_id(),
            file_name: document.file_name.clone(),
            document_text: document.document_text.clone(),
            analysis: document.analysis.clone(),
            content_hash: document.content_hash.clone(),
            created_at: Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        };
        state.documents.push(record.clone());
        debug!(id = %record.id, "Stored document");
        Ok(record)
    }

    async fn list_documents(&self) -> StoreResult<Vec<RemoteDocument>> {
        let mut state = self.lock();
        Self::check_list(&mut state)?;
        Ok(state.documents.clone())
    }

    async fn get_document(&self, id: &str) -> StoreResult<RemoteDocument> {
        Self::find(&self.lock().documents, id, "document", |d| &d.id)
    }

    async fn create_interview(&self, interview: &NewInterview) -> StoreResult<RemoteInterview> {
        let mut state = self.lock();
        state.create_calls.interviews += 1;
        Self::check_create(&mut state)?;

        if self.unique_constraints
            && state.interviews.iter().any(|i| {
                i.target_position == interview.target_position
                    && i.cv_content == interview.cv_content
            })
        {
            return Err(Self::conflict("Interview already exists"));
        }

        let record = RemoteInterview {
            id: Self::new_id(),
            cv_content: interview.cv_content.clone(),
            cv_file_name: interview.cv_file_name.clone(),
            target_position: interview.target_position.clone(),
            interview_type: interview.interview_type.clone(),
            questions: interview.questions.clone(),
            answers: interview.answers.clone(),
            overall_score: interview.overall_score,
            feedback: interview.feedback.clone(),
            completed_at: interview.completed_at.clone(),
            status: interview.status.clone(),
        };
        state.interviews.push(record.clone());
        debug!(id = %record.id, "Stored interview");
        Ok(record)
    }

    async fn list_interviews(&self) -> StoreResult<Vec<RemoteInterview>> {
        let mut state = self.lock();
        Self::check_list(&mut state)?;
        Ok(state.interviews.clone())
    }

    async fn get_interview(&self, id: &str) -> StoreResult<RemoteInterview> {
        Self::find(&self.lock().interviews, id, "interview", |i| &i.id)
    }

    async fn create_question(&self, question: &NewQuestion) -> StoreResult<RemoteQuestion> {
        let mut state = self.lock();
        state.create_calls.questions += 1;
        Self::check_create(&mut state)?;

        let record = RemoteQuestion {
            id: Self::new_id(),
            question: question.question.clone(),
            answer: question.answer.clone(),
            difficulty: question.difficulty.clone(),
            topic: question.topic.clone(),
            bank_id: question.bank_id.clone(),
        };
        state.questions.push(record.clone());
        Ok(record)
    }

    async fn list_questions(&self) -> StoreResult<Vec<RemoteQuestion>> {
        let mut state = self.lock();
        Self::check_list(&mut state)?;
        Ok(state.questions.clone())
    }

    async fn get_question(&self, id: &str) -> StoreResult<RemoteQuestion> {
        Self::find(&self.lock().questions, id, "question", |q| &q.id)
    }

    async fn create_question_bank(
        &self,
        bank: &NewQuestionBank,
    ) -> StoreResult<RemoteQuestionBank> {
        let mut state = self.lock();
        state.create_calls.question_banks += 1;
        Self::check_create(&mut state)?;

        if self.unique_constraints && state.question_banks.iter().any(|b| b.name == bank.name) {
            return Err(Self::conflict("Question bank already exists"));
        }

        let record = RemoteQuestionBank {
            id: Self::new_id(),
            name: bank.name.clone(),
            description: bank.description.clone(),
            subject: bank.subject.clone(),
            tags: bank.tags.clone().unwrap_or_default(),
            questions: bank.questions.clone(),
            is_public: bank.is_public.unwrap_or(false),
            usage_count: bank.usage_count.unwrap_or(0),
        };
        state.question_banks.push(record.clone());
        debug!(id = %record.id, "Stored question bank");
        Ok(record)
    }

    async fn list_question_banks(&self) -> StoreResult<Vec<RemoteQuestionBank>> {
        let mut state = self.lock();
        Self::check_list(&mut state)?;
        Ok(state.question_banks.clone())
    }

    async fn get_question_bank(&self, id: &str) -> StoreResult<RemoteQuestionBank> {
        Self::find(&self.lock().question_banks, id, "question bank", |b| &b.id)
    }
}
