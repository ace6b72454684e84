//! Core record types shared across the sync pipeline and the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-source sync metadata. One record per source id (`"cedict"`,
/// `"tatoeba/links"`, `"tatoeba/<lang>"`). `last_updated` only ever
/// advances, and is written only inside a committed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncMeta {
    /// Source identifier
    pub source_id: String,
    /// The source's self-declared last-update date at the time of the
    /// last successful sync
    pub last_updated: DateTime<Utc>,
}

impl SyncMeta {
    pub fn new(source_id: impl Into<String>, last_updated: DateTime<Utc>) -> Self {
        Self {
            source_id: source_id.into(),
            last_updated,
        }
    }
}

/// One CEDICT dictionary entry.
///
/// The derived `key` is deliberately not unique: homographs share a key and
/// coexist as separate rows. Sync replaces all rows under the keys of the
/// current run rather than upserting row-by-row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictEntry {
    /// Composite replace-by-key identity, see [`DictEntry::derive_key`]
    pub key: String,
    /// Traditional form, omitted when identical to `simplified`
    pub traditional: Option<String>,
    /// Simplified form
    pub simplified: String,
    /// Numbered-tone pinyin as it appears in the dump
    pub pinyin: String,
    /// Gloss segments joined with `\n`
    pub gloss: String,
}

impl DictEntry {
    /// Build an entry, dropping `traditional` when it equals `simplified`
    /// and deriving the composite key.
    pub fn new(traditional: &str, simplified: &str, pinyin: &str, gloss: &str) -> Self {
        let traditional = if traditional == simplified {
            None
        } else {
            Some(traditional.to_string())
        };
        let key = Self::derive_key(pinyin, simplified, traditional.as_deref());
        Self {
            key,
            traditional,
            simplified: simplified.to_string(),
            pinyin: pinyin.to_string(),
            gloss: gloss.to_string(),
        }
    }

    /// Derive the stable composite key for an entry.
    ///
    /// Pure and referentially stable: equal inputs always produce an
    /// identical key, which is what makes delete-before-insert replacement
    /// converge across runs. Not globally unique.
    pub fn derive_key(pinyin: &str, simplified: &str, traditional: Option<&str>) -> String {
        format!("{} {} {}", pinyin, simplified, traditional.unwrap_or(""))
    }
}

/// An unordered translation link between two Tatoeba sentence ids.
/// Identity is the ordered pair `(n1, n2)`; inserting a duplicate is a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LinkPair {
    pub n1: u64,
    pub n2: u64,
}

/// One Tatoeba sentence, with its segmented word list for token search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentenceRecord {
    /// Tatoeba's own sentence id, unique per language
    pub id: u64,
    /// ISO 639-3 language code (`cmn`, `jpn`, `eng`, ...)
    pub lang: String,
    /// Full sentence text
    pub text: String,
    /// Segmented words, produced by the language segmenter
    pub words: Vec<String>,
}
