//! Tatoeba line grammars
//!
//! Two tab-separated shapes, one per export file: link lines
//! `<id1>\t<id2>` and sentence lines `<id>\t<lang>\t<text>`. Lines with
//! missing or non-numeric ids are skipped, not errors.

use super::Parsed;
use crate::types::LinkPair;

/// A sentence line before segmentation
#[derive(Debug, Clone, PartialEq)]
pub struct RawSentence {
    pub id: u64,
    pub lang: String,
    pub text: String,
}

/// Parse one link line: `<id1>\t<id2>`
pub fn parse_link_line(line: &str) -> Parsed<LinkPair> {
    let mut fields = line.splitn(2, '\t');
    let (Some(t1), Some(t2)) = (fields.next(), fields.next()) else {
        return Parsed::Skipped;
    };
    match (t1.parse::<u64>(), t2.parse::<u64>()) {
        (Ok(n1), Ok(n2)) => Parsed::Matched(LinkPair { n1, n2 }),
        _ => Parsed::Skipped,
    }
}

/// Parse one sentence line: `<id>\t<lang>\t<text>`.
///
/// A zero id is skipped (the corpus uses positive ids; zero marks a
/// malformed row). A missing text column yields an empty sentence, as in
/// the upstream export.
pub fn parse_sentence_line(line: &str) -> Parsed<RawSentence> {
    let mut fields = line.splitn(3, '\t');
    let (Some(id_str), Some(lang)) = (fields.next(), fields.next()) else {
        return Parsed::Skipped;
    };
    let text = fields.next().unwrap_or("");

    match id_str.parse::<u64>() {
        Ok(id) if id > 0 => Parsed::Matched(RawSentence {
            id,
            lang: lang.to_string(),
            text: text.to_string(),
        }),
        _ => Parsed::Skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_line() {
        assert_eq!(
            parse_link_line("5\t9"),
            Parsed::Matched(LinkPair { n1: 5, n2: 9 })
        );
    }

    #[test]
    fn test_link_line_non_numeric_is_skipped() {
        assert_eq!(parse_link_line("5\tabc"), Parsed::Skipped);
        assert_eq!(parse_link_line("abc\t9"), Parsed::Skipped);
    }

    #[test]
    fn test_link_line_missing_field_is_skipped() {
        assert_eq!(parse_link_line("5"), Parsed::Skipped);
        assert_eq!(parse_link_line(""), Parsed::Skipped);
    }

    #[test]
    fn test_sentence_line() {
        let parsed = parse_sentence_line("42\tcmn\t我爱你");
        assert_eq!(
            parsed,
            Parsed::Matched(RawSentence {
                id: 42,
                lang: "cmn".to_string(),
                text: "我爱你".to_string(),
            })
        );
    }

    #[test]
    fn test_sentence_text_keeps_embedded_tabs() {
        let parsed = parse_sentence_line("7\teng\ta\tb");
        match parsed {
            Parsed::Matched(s) => assert_eq!(s.text, "a\tb"),
            other => panic!("expected sentence, got {:?}", other),
        }
    }

    #[test]
    fn test_sentence_zero_or_bad_id_is_skipped() {
        assert_eq!(parse_sentence_line("0\tcmn\ttext"), Parsed::Skipped);
        assert_eq!(parse_sentence_line("x\tcmn\ttext"), Parsed::Skipped);
        assert_eq!(parse_sentence_line("12"), Parsed::Skipped);
    }
}
