//! # Study Content
//!
//! The records a StudySync user accumulates locally and the boundary to the
//! shared remote store they are pushed to.
//!
//! - [`models`]: documents, interview sessions and question banks as they live
//!   in the local history
//! - [`fingerprint`]: content addressing for analyzed documents
//! - [`remote`]: the `RemoteStore` trait with REST and in-memory implementations
//! - [`history`]: the offline copy of the local history on disk

pub mod error;
pub mod fingerprint;
pub mod history;
pub mod models;
pub mod remote;

pub use error::{ContentError, Result, StoreError, StoreResult};
pub use fingerprint::{ContentAddresser, ContentFingerprint, KeyOrder};
pub use history::LocalHistory;
pub use models::{
    BankQuestion, DocumentAnalysis, DocumentEntry, InterviewFeedback, InterviewSession, ItemKind,
    LocalItem, NamedEntity, QuestionAnswer, QuestionBank, Sentiment,
};
pub use remote::{HttpRemoteStore, InMemoryRemoteStore, RemoteRecord, RemoteStore};
