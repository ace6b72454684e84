//! CEDICT line grammar
//!
//! One entry per line: `<traditional> <simplified> [<pinyin>] /<gloss>/...`.
//! Lines starting with `#` are comments; the `#! date=<value>` sub-form
//! declares the dump's update date and feeds the freshness gate.

use super::Parsed;
use crate::types::DictEntry;
use chrono::{DateTime, NaiveDate, Utc};
use regex_lite::Regex;

/// Prefix of the metadata line carrying the declared update date
const DATE_PREFIX: &str = "#! date=";

/// Grammar knob for the dump variants in circulation.
///
/// The published regex variants differ in whether the bracketed pinyin
/// group is mandatory; this is one parameter, not two parsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CedictGrammar {
    /// Require the `[pinyin]` group on every data line
    pub pinyin_required: bool,
}

impl Default for CedictGrammar {
    fn default() -> Self {
        Self {
            pinyin_required: true,
        }
    }
}

/// Parser for CEDICT data and metadata lines
pub struct CedictParser {
    re: Regex,
}

impl CedictParser {
    pub fn new(grammar: CedictGrammar) -> Self {
        let pattern = if grammar.pinyin_required {
            r"^(\S+) (\S+) \[([^\]]+)\] /(.+)/$"
        } else {
            r"^(\S+) (\S+)(?: \[([^\]]*)\])? /(.+)/$"
        };
        Self {
            // the pattern is a compile-time constant; it cannot fail
            re: Regex::new(pattern).unwrap(),
        }
    }

    /// Parse one line into an entry, a declared date, or a skip
    pub fn parse_line(&self, line: &str) -> Parsed<DictEntry> {
        if line.is_empty() {
            return Parsed::Skipped;
        }

        if let Some(rest) = line.strip_prefix('#') {
            if let Some(date_str) = rest.strip_prefix(&DATE_PREFIX[1..]) {
                if let Some(date) = parse_declared_date(date_str.trim()) {
                    return Parsed::Metadata(date);
                }
            }
            return Parsed::Skipped;
        }

        match self.re.captures(line) {
            Some(caps) => {
                let traditional = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                let simplified = caps.get(2).map(|m| m.as_str()).unwrap_or("");
                let pinyin = caps.get(3).map(|m| m.as_str()).unwrap_or("");
                let gloss = caps
                    .get(4)
                    .map(|m| m.as_str())
                    .unwrap_or("")
                    .replace('/', "\n");
                Parsed::Matched(DictEntry::new(traditional, simplified, pinyin, &gloss))
            }
            None => Parsed::Skipped,
        }
    }
}

/// Parse the declared date, accepting RFC 3339 or a bare `YYYY-MM-DD`
fn parse_declared_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}
