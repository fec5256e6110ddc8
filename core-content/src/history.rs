//! Offline copy of the local history
//!
//! Everything the user produced on this device, persisted as one JSON file so
//! it survives restarts until it is synced. Syncing reads the history but never
//! rewrites it; removing synced items is the host's decision.
//!
//! ```ignore
//! use core_content::history::LocalHistory;
//!
//! let mut history = LocalHistory::load(&path).await?;
//! history.push(entry.into());
//! history.save(&path).await?;
//! ```

use crate::error::{ContentError, Result};
use crate::models::{DocumentEntry, InterviewSession, ItemKind, LocalItem, QuestionBank};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Local documents and interviews plus the user's question banks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalHistory {
    /// Documents and interviews in the order they were created
    #[serde(default)]
    pub entries: Vec<LocalItem>,
    #[serde(default)]
    pub question_banks: Vec<QuestionBank>,
}

impl LocalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the history file. A missing file is an empty history.
    #[instrument(skip_all)]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No local history file yet");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let history: Self = serde_json::from_slice(&bytes)?;
        history.validate()?;

        info!(
            entries = history.entries.len(),
            question_banks = history.question_banks.len(),
            "Loaded local history"
        );
        Ok(history)
    }

    /// Write the history file, replacing it in one rename.
    #[instrument(skip_all)]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;

        debug!(entries = self.len(), "Saved local history");
        Ok(())
    }

    /// Question banks live in their own list; entries hold documents and interviews.
    fn validate(&self) -> Result<()> {
        if let Some(index) = self
            .entries
            .iter()
            .position(|item| item.kind() == ItemKind::QuestionBank)
        {
            return Err(ContentError::InvalidInput {
                field: format!("entries[{}]", index),
                message: "question banks belong in questionBanks".to_string(),
            });
        }
        Ok(())
    }

    /// Add a document, interview or question bank to the right list
    pub fn push(&mut self, item: LocalItem) {
        match item {
            LocalItem::QuestionBank(bank) => self.question_banks.push(bank),
            other => self.entries.push(other),
        }
    }

    pub fn documents(&self) -> impl Iterator<Item = &DocumentEntry> {
        self.entries.iter().filter_map(|item| match item {
            LocalItem::Document(doc) => Some(doc),
            _ => None,
        })
    }

    pub fn interviews(&self) -> impl Iterator<Item = &InterviewSession> {
        self.entries.iter().filter_map(|item| match item {
            LocalItem::Interview(session) => Some(session),
            _ => None,
        })
    }

    /// Total number of items, question banks included
    pub fn len(&self) -> usize {
        self.entries.len() + self.question_banks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
