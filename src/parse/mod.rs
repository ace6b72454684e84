//! Record parsers for the corpus line grammars
//!
//! Each grammar converts one reassembled text line into a tagged outcome:
//! a matched record, a metadata line carrying the source's declared update
//! date, or a skip. Malformed lines are skips, never errors — the stream
//! keeps going.

pub mod cedict;
pub mod tatoeba;

use chrono::{DateTime, Utc};

/// Outcome of parsing one line
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    /// A well-formed record
    Matched(T),
    /// A metadata line declaring the source's update date
    Metadata(DateTime<Utc>),
    /// Comment, empty or malformed line; silently skipped
    Skipped,
}

pub use cedict::{CedictGrammar, CedictParser};
pub use tatoeba::{parse_link_line, parse_sentence_line, RawSentence};
