//! Corpus sync pipeline
//!
//! Each source runs as one pull-driven pass: fetch → decompress → line
//! reassembly → parse → freshness gate → batched writes inside a single
//! store transaction. Sources are independent; a failure in one never
//! blocks or rolls back another.

pub mod batch;
pub mod cedict;
pub mod freshness;
pub mod tatoeba;
pub mod writer;

pub use batch::Batcher;
pub use cedict::{sync_cedict, CEDICT_SOURCE_ID};
pub use freshness::{FreshnessGate, GateDecision, GateState};
pub use tatoeba::{sentences_source_id, sync_links, sync_sentences, LINKS_SOURCE_ID};
pub use writer::TransactionalWriter;

use crate::config::Config;
use crate::fetch::{FetchError, Fetcher};
use crate::segment::SegmenterSet;
use crate::store::{CorpusStore, StoreError};
use crate::stream::ArchiveError;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

/// Terminal failures of a single source's sync run
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),
    #[error("stream failed: {0}")]
    Stream(#[from] std::io::Error),
    #[error("archive extraction failed: {0}")]
    Archive(#[from] ArchiveError),
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),
    #[error("unknown source: {0}")]
    UnknownSource(String),
}

/// How a single source's run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Stored metadata is recent; the stream was never opened
    UpToDate,
    /// The source declared no newer data, or the stream held no records;
    /// nothing was written
    NoNewData,
    /// The run committed
    Synced {
        records: usize,
        updated: DateTime<Utc>,
    },
}

/// Result of one source within a multi-source run
#[derive(Debug)]
pub struct SourceResult {
    pub source_id: String,
    pub outcome: Result<SyncOutcome, SyncError>,
}

/// Results of a full run across all configured sources
#[derive(Debug, Default)]
pub struct SyncReport {
    pub results: Vec<SourceResult>,
}

impl SyncReport {
    pub fn all_ok(&self) -> bool {
        self.results.iter().all(|r| r.outcome.is_ok())
    }
}

/// Drives sync runs for every configured source against one store.
pub struct SyncRunner<'a> {
    store: &'a dyn CorpusStore,
    fetcher: Fetcher,
    config: Config,
    segmenters: SegmenterSet,
}

impl<'a> SyncRunner<'a> {
    pub fn new(store: &'a dyn CorpusStore, fetcher: Fetcher, config: Config) -> Self {
        Self {
            store,
            fetcher,
            config,
            segmenters: SegmenterSet::new(),
        }
    }

    /// All source ids this runner would sync, in run order
    pub fn source_ids(&self) -> Vec<String> {
        let mut ids = vec![CEDICT_SOURCE_ID.to_string(), LINKS_SOURCE_ID.to_string()];
        for lang in &self.config.tatoeba.languages {
            ids.push(sentences_source_id(lang));
        }
        ids
    }

    /// Sync one source by id
    pub fn sync_source(&self, source_id: &str) -> Result<SyncOutcome, SyncError> {
        if source_id == CEDICT_SOURCE_ID {
            return sync_cedict(
                self.store,
                &self.fetcher,
                &self.config.sync,
                &self.config.cedict,
            );
        }
        if source_id == LINKS_SOURCE_ID {
            return sync_links(
                self.store,
                &self.fetcher,
                &self.config.sync,
                &self.config.tatoeba,
            );
        }
        if let Some(lang) = source_id.strip_prefix("tatoeba/") {
            return sync_sentences(
                self.store,
                &self.fetcher,
                &self.config.sync,
                &self.config.tatoeba,
                lang,
                &self.segmenters,
            );
        }
        Err(SyncError::UnknownSource(source_id.to_string()))
    }

    /// Run every configured source, isolating failures per source
    pub fn sync_all(&self) -> SyncReport {
        let mut report = SyncReport::default();
        for source_id in self.source_ids() {
            info!(source = %source_id, "starting sync");
            let outcome = self.sync_source(&source_id);
            match &outcome {
                Ok(SyncOutcome::UpToDate) => {
                    info!(source = %source_id, "up to date, skipped")
                }
                Ok(SyncOutcome::NoNewData) => {
                    info!(source = %source_id, "no new data")
                }
                Ok(SyncOutcome::Synced { records, updated }) => {
                    info!(source = %source_id, records, %updated, "synced")
                }
                Err(e) => error!(source = %source_id, error = %e, "sync failed"),
            }
            report.results.push(SourceResult {
                source_id,
                outcome,
            });
        }
        report
    }
}
