//! Persistent store boundary
//!
//! The store is an external collaborator: the pipeline only sees the
//! query, transaction and bulk-write primitives below. A sync run obtains
//! one [`SyncTransaction`], streams its batches into it, and either
//! commits everything or drops it — there is no path that leaves a
//! partial replacement visible.

pub mod sled_store;

use crate::types::{DictEntry, LinkPair, SentenceRecord, SyncMeta};
use thiserror::Error;

pub use sled_store::SledStore;

/// Errors surfaced by store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sled(#[from] sled::Error),
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Collection sizes, used by the stats command and tests
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct StoreCounts {
    pub entries: usize,
    pub links: usize,
    pub sentences: usize,
}

/// The persistent store as the pipeline sees it
pub trait CorpusStore {
    /// Read the stored sync metadata for a source, if any
    fn meta(&self, source_id: &str) -> Result<Option<SyncMeta>, StoreError>;

    /// All stored sync metadata records
    fn metas(&self) -> Result<Vec<SyncMeta>, StoreError>;

    /// Open a transaction for one sync run. Dropping the handle without
    /// committing aborts it.
    fn begin(&self) -> Result<Box<dyn SyncTransaction + '_>, StoreError>;

    /// Row counts per collection
    fn counts(&self) -> Result<StoreCounts, StoreError>;

    /// All dictionary rows under one derived key
    fn entries_for_key(&self, key: &str) -> Result<Vec<DictEntry>, StoreError>;

    /// Dictionary rows whose pinyin matches under case/width folding
    fn find_by_pinyin(&self, pinyin: &str) -> Result<Vec<DictEntry>, StoreError>;

    /// One sentence by language and corpus id
    fn sentence(&self, lang: &str, id: u64) -> Result<Option<SentenceRecord>, StoreError>;

    /// Sentence ids whose word index contains `word` for `lang`
    fn sentences_with_word(&self, lang: &str, word: &str) -> Result<Vec<u64>, StoreError>;

    /// Whether the ordered link `(n1, n2)` exists
    fn has_link(&self, n1: u64, n2: u64) -> Result<bool, StoreError>;
}

/// One snapshot transaction covering a whole sync run.
///
/// Deletes resolve against the state the store had before the run began;
/// inserts staged in the same transaction are never affected by them.
/// Nothing becomes visible until `commit` returns.
pub trait SyncTransaction {
    /// Delete all dictionary rows whose derived key is in `keys`
    fn delete_entries(&mut self, keys: &[String]) -> Result<(), StoreError>;

    /// Bulk-insert one batch of dictionary rows
    fn insert_entries(&mut self, batch: Vec<DictEntry>) -> Result<(), StoreError>;

    /// Bulk-insert link pairs; duplicates of existing pairs are no-ops
    fn insert_links(&mut self, batch: Vec<LinkPair>) -> Result<(), StoreError>;

    /// Bulk-insert sentences, replacing any prior row with the same
    /// `(lang, id)`
    fn insert_sentences(&mut self, batch: Vec<SentenceRecord>) -> Result<(), StoreError>;

    /// Record the run's freshness timestamp inside the transaction
    fn put_meta(&mut self, meta: &SyncMeta) -> Result<(), StoreError>;

    /// Commit every staged mutation atomically
    fn commit(self: Box<Self>) -> Result<(), StoreError>;
}
