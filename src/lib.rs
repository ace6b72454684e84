//! zhcorpus: ingestion pipeline for Chinese learning corpora
//!
//! Keeps a local store in step with two upstream exports: the CC-CEDICT
//! dictionary dump and the Tatoeba sentence/link exports. Each sync run
//! streams a compressed export through decompression, line reassembly and
//! parsing, gates on source freshness, and lands batched writes in a
//! single store transaction, so interrupted runs leave no partial state.

pub mod config;
pub mod fetch;
pub mod parse;
pub mod segment;
pub mod store;
pub mod stream;
pub mod sync;
pub mod types;

pub use config::Config;
pub use store::{CorpusStore, SledStore};
pub use sync::{SyncOutcome, SyncReport, SyncRunner};
pub use types::{DictEntry, LinkPair, SentenceRecord, SyncMeta};
