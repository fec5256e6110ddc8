//! Sync engine configuration

use core_content::ItemKind;

use crate::retry::RetryPolicy;

/// Retry policy per item kind
///
/// Documents are retried by default; interviews and question banks get a
/// single attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub document_retry: RetryPolicy,
    pub interview_retry: RetryPolicy,
    pub question_bank_retry: RetryPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            document_retry: RetryPolicy::default(),
            interview_retry: RetryPolicy::no_retry(),
            question_bank_retry: RetryPolicy::no_retry(),
        }
    }
}

impl SyncConfig {
    pub fn with_document_retry(mut self, policy: RetryPolicy) -> Self {
        self.document_retry = policy;
        self
    }

    pub fn with_interview_retry(mut self, policy: RetryPolicy) -> Self {
        self.interview_retry = policy;
        self
    }

    pub fn with_question_bank_retry(mut self, policy: RetryPolicy) -> Self {
        self.question_bank_retry = policy;
        self
    }

    /// Apply the same policy to every kind
    pub fn with_uniform_retry(self, policy: RetryPolicy) -> Self {
        Self {
            document_retry: policy.clone(),
            interview_retry: policy.clone(),
            question_bank_retry: policy,
        }
    }

    pub fn policy_for(&self, kind: ItemKind) -> &RetryPolicy {
        match kind {
            ItemKind::Document => &self.document_retry,
            ItemKind::Interview => &self.interview_retry,
            ItemKind::QuestionBank => &self.question_bank_retry,
        }
    }
}
