//! # Remote Store Boundary
//!
//! The shared backend that synced records end up in. The store is the single
//! authority: it either accepts a write or rejects it (a duplicate, bad input,
//! an outage). The sync engine reads it to detect duplicates and writes each
//! new item exactly once.
//!
//! ## Implementations
//!
//! | Store                 | Use                                   |
//! |-----------------------|---------------------------------------|
//! | [`HttpRemoteStore`]     | REST API over a host `HttpClient`     |
//! | [`InMemoryRemoteStore`] | Tests, demos, offline development     |

mod http;
mod memory;
pub mod records;

pub use http::HttpRemoteStore;
pub use memory::{CreateCalls, InMemoryRemoteStore, InjectedFailure};
pub use records::{
    InterviewAnswer, InterviewQuestion, NewDocument, NewInterview, NewQuestion, NewQuestionBank,
    RemoteDocument, RemoteInterview, RemoteQuestion, RemoteQuestionBank, RemoteRecord,
};

use crate::error::StoreResult;
use async_trait::async_trait;

/// CRUD surface of the remote store used by the sync engine.
///
/// Every `create_*` performs one write. Listing returns the full collection;
/// the store is expected to be small enough per user for that to be fine.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn create_document(&self, document: &NewDocument) -> StoreResult<RemoteDocument>;
    async fn list_documents(&self) -> StoreResult<Vec<RemoteDocument>>;
    async fn get_document(&self, id: &str) -> StoreResult<RemoteDocument>;

    async fn create_interview(&self, interview: &NewInterview) -> StoreResult<RemoteInterview>;
    async fn list_interviews(&self) -> StoreResult<Vec<RemoteInterview>>;
    async fn get_interview(&self, id: &str) -> StoreResult<RemoteInterview>;

    async fn create_question(&self, question: &NewQuestion) -> StoreResult<RemoteQuestion>;
    async fn list_questions(&self) -> StoreResult<Vec<RemoteQuestion>>;
    async fn get_question(&self, id: &str) -> StoreResult<RemoteQuestion>;

    async fn create_question_bank(&self, bank: &NewQuestionBank)
        -> StoreResult<RemoteQuestionBank>;
    async fn list_question_banks(&self) -> StoreResult<Vec<RemoteQuestionBank>>;
    async fn get_question_bank(&self, id: &str) -> StoreResult<RemoteQuestionBank>;
}
