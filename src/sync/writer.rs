//! Transactional writer
//!
//! Owns the single store transaction of a sync run. Entry batches go
//! through delete-of-superseded-keys followed by bulk insert; keys
//! already deleted earlier in the same run are not deleted again, so a
//! key whose rows span two batches keeps the rows inserted by the first
//! one. Links and sentences rely on the store's own idempotent /
//! replace-by-primary-key semantics. Dropping the writer without
//! committing aborts the run with zero visible writes.

use crate::store::{CorpusStore, StoreError, SyncTransaction};
use crate::types::{DictEntry, LinkPair, SentenceRecord, SyncMeta};
use std::collections::HashSet;
use tracing::debug;

/// Writer for one sync run's transaction
pub struct TransactionalWriter<'a> {
    txn: Box<dyn SyncTransaction + 'a>,
    deleted_keys: HashSet<String>,
    records_written: usize,
}

impl<'a> TransactionalWriter<'a> {
    /// Open the run's transaction
    pub fn begin(store: &'a dyn CorpusStore) -> Result<Self, StoreError> {
        Ok(Self {
            txn: store.begin()?,
            deleted_keys: HashSet::new(),
            records_written: 0,
        })
    }

    /// Write one batch of dictionary entries, deleting superseded rows
    /// for keys this run has not deleted yet
    pub fn write_entries(&mut self, batch: Vec<DictEntry>) -> Result<(), StoreError> {
        let fresh_keys: Vec<String> = batch
            .iter()
            .filter(|e| !self.deleted_keys.contains(&e.key))
            .map(|e| e.key.clone())
            .collect();
        for key in &fresh_keys {
            self.deleted_keys.insert(key.clone());
        }

        debug!(
            "entry batch: {} rows, {} keys to supersede",
            batch.len(),
            fresh_keys.len()
        );
        self.txn.delete_entries(&fresh_keys)?;
        self.records_written += batch.len();
        self.txn.insert_entries(batch)
    }

    /// Write one batch of link pairs
    pub fn write_links(&mut self, batch: Vec<LinkPair>) -> Result<(), StoreError> {
        self.records_written += batch.len();
        self.txn.insert_links(batch)
    }

    /// Write one batch of sentences
    pub fn write_sentences(&mut self, batch: Vec<SentenceRecord>) -> Result<(), StoreError> {
        self.records_written += batch.len();
        self.txn.insert_sentences(batch)
    }

    /// Records staged so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Write the run's freshness metadata and commit everything
    pub fn commit(mut self, meta: &SyncMeta) -> Result<usize, StoreError> {
        self.txn.put_meta(meta)?;
        self.txn.commit()?;
        Ok(self.records_written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{SledStore, StoreCounts};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn entry(pinyin: &str, gloss: &str) -> DictEntry {
        DictEntry::new("好", "好", pinyin, gloss)
    }

    #[test]
    fn test_key_spanning_two_batches_keeps_both_rows() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::open(dir.path().join("db")).unwrap();

        // seed an old row under the shared key
        let mut writer = TransactionalWriter::begin(&store).unwrap();
        writer.write_entries(vec![entry("hao3", "stale")]).unwrap();
        writer
            .commit(&SyncMeta::new(
                "cedict",
                Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            ))
            .unwrap();

        // resync: two rows under the same key arrive in separate batches
        let mut writer = TransactionalWriter::begin(&store).unwrap();
        writer.write_entries(vec![entry("hao3", "good")]).unwrap();
        writer.write_entries(vec![entry("hao3", "fine")]).unwrap();
        writer
            .commit(&SyncMeta::new(
                "cedict",
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            ))
            .unwrap();

        let key = DictEntry::derive_key("hao3", "好", None);
        let glosses: Vec<String> = store
            .entries_for_key(&key)
            .unwrap()
            .into_iter()
            .map(|e| e.gloss)
            .collect();
        assert_eq!(glosses.len(), 2);
        assert!(glosses.contains(&"good".to_string()));
        assert!(glosses.contains(&"fine".to_string()));
        assert!(!glosses.contains(&"stale".to_string()));
    }

    #[test]
    fn test_dropped_writer_leaves_store_untouched() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::open(dir.path().join("db")).unwrap();

        {
            let mut writer = TransactionalWriter::begin(&store).unwrap();
            writer.write_entries(vec![entry("hao3", "good")]).unwrap();
            writer
                .write_links(vec![LinkPair { n1: 1, n2: 2 }])
                .unwrap();
            // dropped: simulated failure between batches
        }

        assert_eq!(store.counts().unwrap(), StoreCounts::default());
        assert!(store.meta("cedict").unwrap().is_none());
    }

    #[test]
    fn test_records_written_counts_all_kinds() {
        let dir = TempDir::new().unwrap();
        let store = SledStore::open(dir.path().join("db")).unwrap();

        let mut writer = TransactionalWriter::begin(&store).unwrap();
        writer.write_entries(vec![entry("hao3", "good")]).unwrap();
        writer
            .write_links(vec![LinkPair { n1: 1, n2: 2 }, LinkPair { n1: 3, n2: 4 }])
            .unwrap();
        writer
            .write_sentences(vec![SentenceRecord {
                id: 1,
                lang: "eng".to_string(),
                text: "hi".to_string(),
                words: vec!["hi".to_string()],
            }])
            .unwrap();
        assert_eq!(writer.records_written(), 4);
    }
}
