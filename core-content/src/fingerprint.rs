//! Content addressing for analyzed documents
//!
//! A document is identified by the SHA-256 of its extracted text followed by
//! the JSON of its analysis. Two uploads of the same file produce the same
//! fingerprint, which is how the remote store recognizes duplicates.
//!
//! ## Key order
//!
//! By default the analysis JSON is canonicalized: object keys are sorted at
//! every depth, so a struct and an equivalent map hash identically. Hashes
//! stored by older clients were computed over the JSON in serialization order;
//! [`KeyOrder::AsSerialized`] reproduces those.
//!
//! ```
//! use core_content::fingerprint::ContentAddresser;
//! use serde_json::json;
//!
//! let addresser = ContentAddresser::new();
//! let a = addresser.fingerprint("Cells divide.", &json!({"summary": "s", "topics": []})).unwrap();
//! let b = addresser.fingerprint("Cells divide.", &json!({"topics": [], "summary": "s"})).unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.as_str().len(), 64);
//! ```

use crate::error::Result;
use crate::models::DocumentEntry;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Lowercase hex SHA-256 digest identifying a document's content
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentFingerprint(String);

impl ContentFingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Compare against a hash stored by the remote store
    pub fn matches(&self, stored: &str) -> bool {
        self.0.eq_ignore_ascii_case(stored.trim())
    }
}

impl fmt::Display for ContentFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How object keys of the analysis are ordered before hashing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyOrder {
    /// Sorted recursively
    #[default]
    Canonical,
    /// Whatever order the serializer emits (struct declaration order)
    AsSerialized,
}

/// Computes [`ContentFingerprint`]s. Pure and deterministic.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentAddresser {
    key_order: KeyOrder,
}

impl ContentAddresser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_order(mut self, key_order: KeyOrder) -> Self {
        self.key_order = key_order;
        self
    }

    pub fn key_order(&self) -> KeyOrder {
        self.key_order
    }

    /// Fingerprint `text` together with its serialized `analysis`.
    ///
    /// Empty text and empty analyses are valid input.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::Serialization` only if `analysis` cannot be
    /// represented as JSON (for example a map with non-string keys).
    pub fn fingerprint<T>(&self, text: &str, analysis: &T) -> Result<ContentFingerprint>
    where
        T: Serialize + ?Sized,
    {
        let json = match self.key_order {
            KeyOrder::Canonical => {
                let value = serde_json::to_value(analysis)?;
                let mut out = String::new();
                write_canonical(&value, &mut out)?;
                out
            }
            KeyOrder::AsSerialized => serde_json::to_string(analysis)?,
        };

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(json.as_bytes());
        Ok(ContentFingerprint(format!("{:x}", hasher.finalize())))
    }

    /// Fingerprint of a local document entry
    pub fn fingerprint_document(&self, entry: &DocumentEntry) -> Result<ContentFingerprint> {
        self.fingerprint(&entry.document_text, &entry.analysis)
    }
}

fn write_canonical(value: &Value, out: &mut String) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            out.push('{');
            for (i, (key, child)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(child, out)?;
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, child) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(child, out)?;
            }
            out.push(']');
        }
        scalar => out.push_str(&serde_json::to_string(scalar)?),
    }
    Ok(())
}
