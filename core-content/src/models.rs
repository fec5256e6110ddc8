//! Domain models for the local study history
//!
//! Everything a user produces on this device before it is pushed to the
//! remote store: analyzed documents, mock interview sessions and question
//! banks. Field names serialize in camelCase, matching both the offline history
//! file and the remote store's JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Item kind
// =============================================================================

/// Discriminant of a [`LocalItem`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Document,
    Interview,
    QuestionBank,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Document => "document",
            ItemKind::Interview => "interview",
            ItemKind::QuestionBank => "question_bank",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Documents
// =============================================================================

/// Named entity found by document analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedEntity {
    pub name: String,
    /// Entity category such as "person", "organization" or "concept"
    #[serde(rename = "type")]
    pub entity_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sentiment {
    /// "positive", "neutral" or "negative"
    pub label: String,
    pub score: f64,
}

/// Structured result of analyzing a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    pub summary: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub entities: Vec<NamedEntity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
}

/// An uploaded document together with its extracted text and analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEntry {
    pub file_name: String,
    pub document_text: String,
    pub analysis: DocumentAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl DocumentEntry {
    pub fn new(
        file_name: impl Into<String>,
        document_text: impl Into<String>,
        analysis: DocumentAnalysis,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            document_text: document_text.into(),
            analysis,
            created_at: None,
        }
    }
}

// =============================================================================
// Interviews
// =============================================================================

/// One question asked during a mock interview and the user's answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewFeedback {
    /// Overall score, 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default)]
    pub fit_rating: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub summary: String,
}

/// A completed mock interview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub cv_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv_file_name: Option<String>,
    pub target_position: String,
    pub interview_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub exchanges: Vec<QuestionAnswer>,
    #[serde(default)]
    pub feedback: InterviewFeedback,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Question banks
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankQuestion {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl BankQuestion {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: None,
            difficulty: None,
            topic: None,
        }
    }
}

/// A named, ordered collection of practice questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub questions: Vec<BankQuestion>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub usage_count: u32,
}

impl QuestionBank {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            subject: None,
            tags: Vec::new(),
            questions: Vec::new(),
            is_public: false,
            usage_count: 0,
        }
    }
}

// =============================================================================
// Local item
// =============================================================================

/// One record of the local history awaiting sync
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocalItem {
    Document(DocumentEntry),
    Interview(InterviewSession),
    QuestionBank(QuestionBank),
}

impl LocalItem {
    pub fn kind(&self) -> ItemKind {
        match self {
            LocalItem::Document(_) => ItemKind::Document,
            LocalItem::Interview(_) => ItemKind::Interview,
            LocalItem::QuestionBank(_) => ItemKind::QuestionBank,
        }
    }

    /// Display label used in progress reports and outcomes
    pub fn label(&self) -> String {
        match self {
            LocalItem::Document(doc) => doc.file_name.clone(),
            LocalItem::Interview(session) => format!("Interview: {}", session.target_position),
            LocalItem::QuestionBank(bank) => bank.name.clone(),
        }
    }
}

impl From<DocumentEntry> for LocalItem {
    fn from(entry: DocumentEntry) -> Self {
        LocalItem::Document(entry)
    }
}

impl From<InterviewSession> for LocalItem {
    fn from(session: InterviewSession) -> Self {
        LocalItem::Interview(session)
    }
}

impl From<QuestionBank> for LocalItem {
    fn from(bank: QuestionBank) -> Self {
        LocalItem::QuestionBank(bank)
    }
}
