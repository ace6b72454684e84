//! sled-backed corpus store
//!
//! One sled tree holds every collection under a prefixed keyspace:
//!
//! ```text
//! m/<source_id>                      sync metadata
//! d/<key>\x00<seq>                   dictionary rows (seq disambiguates homographs)
//! p/<folded pinyin>\x00<row key>     pinyin index (case/width folded)
//! g/<token>\x00<row key>             gloss text index
//! l/<n1><n2>                         links, primary key (n1, n2)
//! s/<lang>\x00<id>                   sentences
//! w/<lang>\x00<word>\x00<id>         per-language word index
//! ```
//!
//! A run's transaction stages every mutation in a `sled::Batch` and
//! applies it in a single atomic `apply_batch` at commit; a dropped
//! transaction writes nothing. Keeping everything in one tree is what
//! makes the single batch cover the whole run. Delete sets are resolved
//! by prefix scan against pre-run state, which is sound because runs for
//! one source are serialized by the caller.

use super::{CorpusStore, StoreCounts, StoreError, SyncTransaction};
use crate::types::{DictEntry, LinkPair, SentenceRecord, SyncMeta};
use std::collections::HashMap;
use std::path::Path;
use unicode_segmentation::UnicodeSegmentation;

const META_PREFIX: &[u8] = b"m/";
const DICT_PREFIX: &[u8] = b"d/";
const PINYIN_PREFIX: &[u8] = b"p/";
const GLOSS_PREFIX: &[u8] = b"g/";
const LINK_PREFIX: &[u8] = b"l/";
const SENTENCE_PREFIX: &[u8] = b"s/";
const WORD_PREFIX: &[u8] = b"w/";
const SEP: u8 = 0x00;

/// Value stored for pure index/link keys
const EMPTY: &[u8] = &[];

/// Embedded store holding all corpus collections
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open or create the store at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    fn count_prefix(&self, prefix: &[u8]) -> Result<usize, StoreError> {
        let mut n = 0;
        for item in self.db.scan_prefix(prefix) {
            item?;
            n += 1;
        }
        Ok(n)
    }
}

fn meta_key(source_id: &str) -> Vec<u8> {
    [META_PREFIX, source_id.as_bytes()].concat()
}

fn dict_key_prefix(key: &str) -> Vec<u8> {
    let mut k = [DICT_PREFIX, key.as_bytes()].concat();
    k.push(SEP);
    k
}

fn dict_row_key(key: &str, seq: u32) -> Vec<u8> {
    let mut k = dict_key_prefix(key);
    k.extend_from_slice(&seq.to_be_bytes());
    k
}

fn pinyin_index_key(pinyin: &str, row_key: &[u8]) -> Vec<u8> {
    let mut k = [PINYIN_PREFIX, normalize_pinyin(pinyin).as_bytes()].concat();
    k.push(SEP);
    k.extend_from_slice(row_key);
    k
}

fn gloss_index_key(token: &str, row_key: &[u8]) -> Vec<u8> {
    let mut k = [GLOSS_PREFIX, token.as_bytes()].concat();
    k.push(SEP);
    k.extend_from_slice(row_key);
    k
}

fn link_key(n1: u64, n2: u64) -> Vec<u8> {
    let mut k = LINK_PREFIX.to_vec();
    k.extend_from_slice(&n1.to_be_bytes());
    k.extend_from_slice(&n2.to_be_bytes());
    k
}

fn sentence_key(lang: &str, id: u64) -> Vec<u8> {
    let mut k = [SENTENCE_PREFIX, lang.as_bytes()].concat();
    k.push(SEP);
    k.extend_from_slice(&id.to_be_bytes());
    k
}

fn word_key(lang: &str, word: &str, id: u64) -> Vec<u8> {
    let mut k = [WORD_PREFIX, lang.as_bytes()].concat();
    k.push(SEP);
    k.extend_from_slice(word.as_bytes());
    k.push(SEP);
    k.extend_from_slice(&id.to_be_bytes());
    k
}

/// Lowercase and fold fullwidth forms to their ASCII equivalents, so the
/// pinyin index matches regardless of case or width
pub fn normalize_pinyin(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => {
                char::from_u32(c as u32 - 0xFEE0).unwrap_or(c)
            }
            '\u{3000}' => ' ',
            _ => c,
        })
        .flat_map(char::to_lowercase)
        .collect()
}

/// Tokenize a gloss for the text index
fn gloss_tokens(gloss: &str) -> Vec<String> {
    gloss.unicode_words().map(|w| w.to_lowercase()).collect()
}

impl CorpusStore for SledStore {
    fn meta(&self, source_id: &str) -> Result<Option<SyncMeta>, StoreError> {
        match self.db.get(meta_key(source_id))? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    fn metas(&self) -> Result<Vec<SyncMeta>, StoreError> {
        let mut out = Vec::new();
        for item in self.db.scan_prefix(META_PREFIX) {
            let (_, value) = item?;
            out.push(bincode::deserialize(&value)?);
        }
        Ok(out)
    }

    fn begin(&self) -> Result<Box<dyn SyncTransaction + '_>, StoreError> {
        Ok(Box::new(SledTransaction {
            store: self,
            batch: sled::Batch::default(),
            seq: 0,
            staged_sentence_words: HashMap::new(),
        }))
    }

    fn counts(&self) -> Result<StoreCounts, StoreError> {
        Ok(StoreCounts {
            entries: self.count_prefix(DICT_PREFIX)?,
            links: self.count_prefix(LINK_PREFIX)?,
            sentences: self.count_prefix(SENTENCE_PREFIX)?,
        })
    }

    fn entries_for_key(&self, key: &str) -> Result<Vec<DictEntry>, StoreError> {
        let mut out = Vec::new();
        for item in self.db.scan_prefix(dict_key_prefix(key)) {
            let (_, value) = item?;
            out.push(bincode::deserialize(&value)?);
        }
        Ok(out)
    }

    fn find_by_pinyin(&self, pinyin: &str) -> Result<Vec<DictEntry>, StoreError> {
        let mut prefix = [PINYIN_PREFIX, normalize_pinyin(pinyin).as_bytes()].concat();
        prefix.push(SEP);

        let mut out = Vec::new();
        for item in self.db.scan_prefix(&prefix) {
            let (index_key, _) = item?;
            let row_key = &index_key[prefix.len()..];
            if let Some(value) = self.db.get(row_key)? {
                out.push(bincode::deserialize(&value)?);
            }
        }
        Ok(out)
    }

    fn sentence(&self, lang: &str, id: u64) -> Result<Option<SentenceRecord>, StoreError> {
        match self.db.get(sentence_key(lang, id))? {
            Some(value) => Ok(Some(bincode::deserialize(&value)?)),
            None => Ok(None),
        }
    }

    fn sentences_with_word(&self, lang: &str, word: &str) -> Result<Vec<u64>, StoreError> {
        let mut prefix = [WORD_PREFIX, lang.as_bytes()].concat();
        prefix.push(SEP);
        prefix.extend_from_slice(word.as_bytes());
        prefix.push(SEP);

        let mut out = Vec::new();
        for item in self.db.scan_prefix(&prefix) {
            let (index_key, _) = item?;
            let id_bytes = &index_key[prefix.len()..];
            if id_bytes.len() == 8 {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(id_bytes);
                out.push(u64::from_be_bytes(buf));
            }
        }
        Ok(out)
    }

    fn has_link(&self, n1: u64, n2: u64) -> Result<bool, StoreError> {
        Ok(self.db.get(link_key(n1, n2))?.is_some())
    }
}

/// Staged transaction over a [`SledStore`]
struct SledTransaction<'a> {
    store: &'a SledStore,
    batch: sled::Batch,
    /// Run-unique suffix for dictionary rows sharing a derived key
    seq: u32,
    /// Word-index keys staged per sentence row this run, so a repeated
    /// `(lang, id)` inside one run retires the earlier version's postings
    staged_sentence_words: HashMap<Vec<u8>, Vec<Vec<u8>>>,
}

impl SyncTransaction for SledTransaction<'_> {
    fn delete_entries(&mut self, keys: &[String]) -> Result<(), StoreError> {
        for key in keys {
            for item in self.store.db.scan_prefix(dict_key_prefix(key)) {
                let (row_key, value) = item?;
                let entry: DictEntry = bincode::deserialize(&value)?;
                self.batch.remove(pinyin_index_key(&entry.pinyin, &row_key));
                for token in gloss_tokens(&entry.gloss) {
                    self.batch.remove(gloss_index_key(&token, &row_key));
                }
                self.batch.remove(row_key);
            }
        }
        Ok(())
    }

    fn insert_entries(&mut self, batch: Vec<DictEntry>) -> Result<(), StoreError> {
        for entry in batch {
            let row_key = dict_row_key(&entry.key, self.seq);
            self.seq += 1;

            self.batch
                .insert(pinyin_index_key(&entry.pinyin, &row_key), EMPTY);
            for token in gloss_tokens(&entry.gloss) {
                self.batch
                    .insert(gloss_index_key(&token, &row_key), EMPTY);
            }
            self.batch.insert(row_key, bincode::serialize(&entry)?);
        }
        Ok(())
    }

    fn insert_links(&mut self, batch: Vec<LinkPair>) -> Result<(), StoreError> {
        for link in batch {
            // overwriting an existing pair is the conflict-skip no-op
            self.batch.insert(link_key(link.n1, link.n2), EMPTY);
        }
        Ok(())
    }

    fn insert_sentences(&mut self, batch: Vec<SentenceRecord>) -> Result<(), StoreError> {
        for record in batch {
            let row_key = sentence_key(&record.lang, record.id);

            // replacing a sentence retires its old word postings, whether
            // the old version was committed before the run or staged by it
            if let Some(staged) = self.staged_sentence_words.remove(&row_key) {
                for key in staged {
                    self.batch.remove(key);
                }
            } else if let Some(old) = self.store.db.get(&row_key)? {
                let old: SentenceRecord = bincode::deserialize(&old)?;
                for word in &old.words {
                    self.batch.remove(word_key(&old.lang, word, old.id));
                }
            }

            let mut word_keys = Vec::with_capacity(record.words.len());
            for word in &record.words {
                let key = word_key(&record.lang, word, record.id);
                self.batch.insert(key.clone(), EMPTY);
                word_keys.push(key);
            }
            self.staged_sentence_words.insert(row_key.clone(), word_keys);
            self.batch.insert(row_key, bincode::serialize(&record)?);
        }
        Ok(())
    }

    fn put_meta(&mut self, meta: &SyncMeta) -> Result<(), StoreError> {
        self.batch
            .insert(meta_key(&meta.source_id), bincode::serialize(meta)?);
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.store.db.apply_batch(self.batch)?;
        self.store.db.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn entry(trad: &str, simp: &str, pinyin: &str, gloss: &str) -> DictEntry {
        DictEntry::new(trad, simp, pinyin, gloss)
    }

    fn open_store(dir: &TempDir) -> SledStore {
        SledStore::open(dir.path().join("db")).unwrap()
    }

    #[test]
    fn test_commit_makes_rows_visible() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut txn = store.begin().unwrap();
        txn.insert_entries(vec![entry("中國", "中国", "zhong1 guo2", "China")])
            .unwrap();
        txn.put_meta(&SyncMeta::new(
            "cedict",
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
        .unwrap();
        txn.commit().unwrap();

        let key = DictEntry::derive_key("zhong1 guo2", "中国", Some("中國"));
        let rows = store.entries_for_key(&key).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].gloss, "China");
        assert!(store.meta("cedict").unwrap().is_some());
    }

    #[test]
    fn test_dropped_transaction_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        {
            let mut txn = store.begin().unwrap();
            txn.insert_entries(vec![entry("你好", "你好", "ni3 hao3", "hello")])
                .unwrap();
            // dropped without commit
        }

        assert_eq!(store.counts().unwrap(), StoreCounts::default());
    }

    #[test]
    fn test_replace_by_key_removes_old_rows() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let key = DictEntry::derive_key("hao3", "好", None);

        let mut txn = store.begin().unwrap();
        txn.insert_entries(vec![
            entry("好", "好", "hao3", "good"),
            entry("好", "好", "hao3", "fine"),
        ])
        .unwrap();
        txn.commit().unwrap();
        assert_eq!(store.entries_for_key(&key).unwrap().len(), 2);

        let mut txn = store.begin().unwrap();
        txn.delete_entries(std::slice::from_ref(&key)).unwrap();
        txn.insert_entries(vec![entry("好", "好", "hao3", "good\nwell")])
            .unwrap();
        txn.commit().unwrap();

        let rows = store.entries_for_key(&key).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].gloss, "good\nwell");
    }

    #[test]
    fn test_pinyin_index_is_fold_insensitive() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut txn = store.begin().unwrap();
        txn.insert_entries(vec![entry("中國", "中国", "Zhong1 guo2", "China")])
            .unwrap();
        txn.commit().unwrap();

        let found = store.find_by_pinyin("zhong1 GUO2").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].simplified, "中国");
    }

    #[test]
    fn test_pinyin_index_retired_on_delete() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        let key = DictEntry::derive_key("hao3", "好", None);

        let mut txn = store.begin().unwrap();
        txn.insert_entries(vec![entry("好", "好", "hao3", "good")])
            .unwrap();
        txn.commit().unwrap();
        assert_eq!(store.find_by_pinyin("hao3").unwrap().len(), 1);

        let mut txn = store.begin().unwrap();
        txn.delete_entries(std::slice::from_ref(&key)).unwrap();
        txn.commit().unwrap();
        assert!(store.find_by_pinyin("hao3").unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_link_insert_is_noop() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut txn = store.begin().unwrap();
        txn.insert_links(vec![LinkPair { n1: 5, n2: 9 }]).unwrap();
        txn.commit().unwrap();

        let mut txn = store.begin().unwrap();
        txn.insert_links(vec![LinkPair { n1: 5, n2: 9 }, LinkPair { n1: 9, n2: 5 }])
            .unwrap();
        txn.commit().unwrap();

        assert!(store.has_link(5, 9).unwrap());
        assert!(store.has_link(9, 5).unwrap());
        assert_eq!(store.counts().unwrap().links, 2);
    }

    #[test]
    fn test_sentence_replacement_retires_word_postings() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut txn = store.begin().unwrap();
        txn.insert_sentences(vec![SentenceRecord {
            id: 1,
            lang: "eng".to_string(),
            text: "old text".to_string(),
            words: vec!["old".to_string(), "text".to_string()],
        }])
        .unwrap();
        txn.commit().unwrap();
        assert_eq!(store.sentences_with_word("eng", "old").unwrap(), vec![1]);

        let mut txn = store.begin().unwrap();
        txn.insert_sentences(vec![SentenceRecord {
            id: 1,
            lang: "eng".to_string(),
            text: "new text".to_string(),
            words: vec!["new".to_string(), "text".to_string()],
        }])
        .unwrap();
        txn.commit().unwrap();

        assert!(store.sentences_with_word("eng", "old").unwrap().is_empty());
        assert_eq!(store.sentences_with_word("eng", "new").unwrap(), vec![1]);
        assert_eq!(store.counts().unwrap().sentences, 1);
        assert_eq!(store.sentence("eng", 1).unwrap().unwrap().text, "new text");
    }

    #[test]
    fn test_repeated_sentence_id_in_one_run_keeps_last_postings() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut txn = store.begin().unwrap();
        txn.insert_sentences(vec![SentenceRecord {
            id: 3,
            lang: "eng".to_string(),
            text: "first draft".to_string(),
            words: vec!["first".to_string(), "draft".to_string()],
        }])
        .unwrap();
        txn.insert_sentences(vec![SentenceRecord {
            id: 3,
            lang: "eng".to_string(),
            text: "final draft".to_string(),
            words: vec!["final".to_string(), "draft".to_string()],
        }])
        .unwrap();
        txn.commit().unwrap();

        assert!(store.sentences_with_word("eng", "first").unwrap().is_empty());
        assert_eq!(store.sentences_with_word("eng", "final").unwrap(), vec![3]);
        assert_eq!(store.sentences_with_word("eng", "draft").unwrap(), vec![3]);
        assert_eq!(store.counts().unwrap().sentences, 1);
        assert_eq!(store.sentence("eng", 3).unwrap().unwrap().text, "final draft");
    }

    #[test]
    fn test_gloss_index() {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);

        let mut txn = store.begin().unwrap();
        txn.insert_entries(vec![entry("中國", "中国", "zhong1 guo2", "China\nMiddle Kingdom")])
            .unwrap();
        txn.commit().unwrap();

        // the gloss index stores lowercase tokens under g/<token>\x00
        let mut prefix = b"g/china".to_vec();
        prefix.push(0);
        let hits = store.db.scan_prefix(&prefix).count();
        assert_eq!(hits, 1);
    }

    #[test]
    fn test_normalize_pinyin_folds_width_and_case() {
        assert_eq!(normalize_pinyin("Zhong1"), "zhong1");
        assert_eq!(normalize_pinyin("ｚｈｏｎｇ１"), "zhong1");
        assert_eq!(normalize_pinyin("ni3\u{3000}hao3"), "ni3 hao3");
    }
}
