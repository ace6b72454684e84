//! Source and pipeline configuration

use serde::{Deserialize, Serialize};

/// Pipeline-wide sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Records per write batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Skip a source synced more recently than this many days ago
    #[serde(default = "default_freshness_days")]
    pub freshness_days: i64,
    /// Optional HTTP timeout in seconds (none by default)
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_batch_size() -> usize {
    1000
}

fn default_freshness_days() -> i64 {
    7
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            freshness_days: default_freshness_days(),
            timeout_secs: None,
        }
    }
}

/// CEDICT source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CedictConfig {
    /// URL of the gzip-compressed dump
    #[serde(default = "default_cedict_url")]
    pub url: String,
    /// Require the bracketed pinyin group on data lines
    #[serde(default = "default_true")]
    pub pinyin_required: bool,
}

fn default_cedict_url() -> String {
    "https://www.mdbg.net/chinese/export/cedict/cedict_1_0_ts_utf-8_mdbg.txt.gz".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for CedictConfig {
    fn default() -> Self {
        Self {
            url: default_cedict_url(),
            pinyin_required: true,
        }
    }
}

/// Tatoeba source settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TatoebaConfig {
    /// URL of the links archive (tar inside bz2)
    #[serde(default = "default_links_url")]
    pub links_url: String,
    /// Archive member holding the link rows
    #[serde(default = "default_links_member")]
    pub links_member: String,
    /// Per-language sentence export URL; `{lang}` is substituted
    #[serde(default = "default_sentences_template")]
    pub sentences_url_template: String,
    /// Languages to sync
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
}

fn default_links_url() -> String {
    "https://downloads.tatoeba.org/exports/links.tar.bz2".to_string()
}

fn default_links_member() -> String {
    "links.csv".to_string()
}

fn default_sentences_template() -> String {
    "https://downloads.tatoeba.org/exports/per_language/{lang}/{lang}_sentences.tsv.bz2"
        .to_string()
}

fn default_languages() -> Vec<String> {
    vec!["eng".to_string(), "cmn".to_string(), "jpn".to_string()]
}

impl Default for TatoebaConfig {
    fn default() -> Self {
        Self {
            links_url: default_links_url(),
            links_member: default_links_member(),
            sentences_url_template: default_sentences_template(),
            languages: default_languages(),
        }
    }
}

impl TatoebaConfig {
    /// Resolve the sentence export URL for one language
    pub fn sentences_url(&self, lang: &str) -> String {
        self.sentences_url_template.replace("{lang}", lang)
    }
}
