//! Tatoeba sync
//!
//! Two export shapes share one pipeline skeleton. The links archive is a
//! tar inside bz2; its `links.csv` member is extracted to a scoped temp
//! directory and streamed from disk. The per-language sentence exports
//! are plain bz2 tsv files streamed directly. Neither export declares an
//! update date, so a committed run records the run's own start time and
//! relies on the recent-sync window to pace re-downloads.

use super::{Batcher, FreshnessGate, SyncError, SyncOutcome, TransactionalWriter};
use crate::config::{SyncConfig, TatoebaConfig};
use crate::fetch::Fetcher;
use crate::parse::{parse_link_line, parse_sentence_line, Parsed};
use crate::segment::SegmenterSet;
use crate::store::CorpusStore;
use crate::stream::{extract_member, Codec, Decompressor, LineStream};
use crate::types::{SentenceRecord, SyncMeta};
use chrono::{DateTime, Utc};
use std::io::{BufReader, Read};
use tempfile::TempDir;
use tracing::debug;

pub const LINKS_SOURCE_ID: &str = "tatoeba/links";

/// Source id for one language's sentence export
pub fn sentences_source_id(lang: &str) -> String {
    format!("tatoeba/{}", lang)
}

/// Sync translation links from an already-open bz2 tar stream
pub fn sync_links_stream<R: Read>(
    store: &dyn CorpusStore,
    raw: R,
    member_name: &str,
    sync: &SyncConfig,
    now: DateTime<Utc>,
) -> Result<SyncOutcome, SyncError> {
    let stored = store.meta(LINKS_SOURCE_ID)?.map(|m| m.last_updated);
    let mut gate = FreshnessGate::new(stored, sync.freshness_days);
    if gate.is_recent(now) {
        return Ok(SyncOutcome::UpToDate);
    }

    let tmp = TempDir::new().map_err(SyncError::Stream)?;
    let file = extract_member(Decompressor::new(Codec::Bzip2, raw), member_name, &tmp)?;

    let mut writer = TransactionalWriter::begin(store)?;
    let mut batcher = Batcher::new(sync.batch_size);
    let mut skipped = 0usize;

    for line in LineStream::new(BufReader::new(file)) {
        let line = line?;
        match parse_link_line(&line) {
            Parsed::Matched(pair) => {
                if let Some(batch) = batcher.push(pair) {
                    writer.write_links(batch)?;
                }
            }
            _ => skipped += 1,
        }
    }
    if let Some(batch) = batcher.finish() {
        writer.write_links(batch)?;
    }
    debug!(skipped, "finished reading links");

    if writer.records_written() == 0 {
        gate.finish();
        return Ok(SyncOutcome::NoNewData);
    }

    // dateless export: the run's start time becomes the recorded state
    gate.observe(now);
    let Some(candidate) = gate.candidate() else {
        gate.finish();
        return Ok(SyncOutcome::NoNewData);
    };
    let records = writer.commit(&SyncMeta::new(LINKS_SOURCE_ID, candidate))?;
    gate.finish();
    Ok(SyncOutcome::Synced {
        records,
        updated: candidate,
    })
}

/// Sync one language's sentences from an already-open bz2 tsv stream
pub fn sync_sentences_stream<R: Read>(
    store: &dyn CorpusStore,
    raw: R,
    lang: &str,
    segmenters: &SegmenterSet,
    sync: &SyncConfig,
    now: DateTime<Utc>,
) -> Result<SyncOutcome, SyncError> {
    let source_id = sentences_source_id(lang);
    let stored = store.meta(&source_id)?.map(|m| m.last_updated);
    let mut gate = FreshnessGate::new(stored, sync.freshness_days);
    if gate.is_recent(now) {
        return Ok(SyncOutcome::UpToDate);
    }

    let segmenter = segmenters.for_language(lang);
    let mut writer = TransactionalWriter::begin(store)?;
    let mut batcher = Batcher::new(sync.batch_size);
    let mut skipped = 0usize;

    for line in LineStream::new(Decompressor::new(Codec::Bzip2, raw)) {
        let line = line?;
        match parse_sentence_line(&line) {
            // rows tagged with another language slip into per-language
            // exports occasionally; drop them
            Parsed::Matched(raw_sentence) if raw_sentence.lang == lang => {
                let words = segmenter.segment(&raw_sentence.text);
                let record = SentenceRecord {
                    id: raw_sentence.id,
                    lang: raw_sentence.lang,
                    text: raw_sentence.text,
                    words,
                };
                if let Some(batch) = batcher.push(record) {
                    writer.write_sentences(batch)?;
                }
            }
            _ => skipped += 1,
        }
    }
    if let Some(batch) = batcher.finish() {
        writer.write_sentences(batch)?;
    }
    debug!(lang, skipped, "finished reading sentences");

    if writer.records_written() == 0 {
        gate.finish();
        return Ok(SyncOutcome::NoNewData);
    }

    gate.observe(now);
    let Some(candidate) = gate.candidate() else {
        gate.finish();
        return Ok(SyncOutcome::NoNewData);
    };
    let records = writer.commit(&SyncMeta::new(source_id, candidate))?;
    gate.finish();
    Ok(SyncOutcome::Synced {
        records,
        updated: candidate,
    })
}

/// Fetch and sync the configured links archive
pub fn sync_links(
    store: &dyn CorpusStore,
    fetcher: &Fetcher,
    sync: &SyncConfig,
    tatoeba: &TatoebaConfig,
) -> Result<SyncOutcome, SyncError> {
    let raw = fetcher.open(&tatoeba.links_url)?;
    sync_links_stream(store, raw, &tatoeba.links_member, sync, Utc::now())
}

/// Fetch and sync one language's sentence export
pub fn sync_sentences(
    store: &dyn CorpusStore,
    fetcher: &Fetcher,
    sync: &SyncConfig,
    tatoeba: &TatoebaConfig,
    lang: &str,
    segmenters: &SegmenterSet,
) -> Result<SyncOutcome, SyncError> {
    let raw = fetcher.open(&tatoeba.sentences_url(lang))?;
    sync_sentences_stream(store, raw, lang, segmenters, sync, Utc::now())
}
