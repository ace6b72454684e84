//! Language-specific word segmentation
//!
//! Sentence text is segmented into words before storage so the word index
//! can serve token queries. Chinese goes through jieba's search-mode cut
//! with punctuation stripped first; Japanese is indexed as character
//! n-grams over kana/kanji runs; every other language falls back to
//! Unicode word segmentation. The trait seam keeps a dictionary-based
//! morphological analyzer pluggable for Japanese.

use jieba_rs::Jieba;
use unicode_segmentation::UnicodeSegmentation;

/// Splits sentence text into index words
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// jieba search-mode segmentation for Chinese
pub struct ChineseSegmenter {
    jieba: Jieba,
}

impl ChineseSegmenter {
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }
}

impl Default for ChineseSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter for ChineseSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let stripped = strip_punctuation(text);
        self.jieba
            .cut_for_search(&stripped, true)
            .into_iter()
            .filter(|w| !w.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// UAX-29 word segmentation, used for every language without a dedicated
/// analyzer
pub struct UnicodeSegmenter;

impl Segmenter for UnicodeSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(str::to_string).collect()
    }
}

/// Character n-gram indexing for Japanese.
///
/// UAX-29 has no dictionary, so it splits kanji runs one character at a
/// time and a multi-kanji word could never match the index as a unit.
/// Instead, every kana/kanji run yields its unigrams and bigrams: a
/// two-character word is findable whole, and longer words are findable
/// through their overlapping bigrams. Embedded Latin runs go through
/// Unicode word segmentation.
pub struct JapaneseSegmenter;

impl Segmenter for JapaneseSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let stripped = strip_punctuation(text);
        let mut words = Vec::new();
        let mut run: Vec<char> = Vec::new();
        let mut other = String::new();

        for c in stripped.chars() {
            if is_japanese_script(c) {
                if !other.is_empty() {
                    words.extend(other.unicode_words().map(str::to_string));
                    other.clear();
                }
                run.push(c);
            } else {
                if !run.is_empty() {
                    push_ngrams(&run, &mut words);
                    run.clear();
                }
                other.push(c);
            }
        }
        if !run.is_empty() {
            push_ngrams(&run, &mut words);
        }
        words.extend(other.unicode_words().map(str::to_string));
        words
    }
}

fn push_ngrams(run: &[char], words: &mut Vec<String>) {
    for (i, c) in run.iter().enumerate() {
        words.push(c.to_string());
        if let Some(next) = run.get(i + 1) {
            words.push(format!("{}{}", c, next));
        }
    }
}

fn is_japanese_script(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'   // hiragana
        | '\u{30A0}'..='\u{30FF}' // katakana
        | '\u{3400}'..='\u{4DBF}' // CJK extension A
        | '\u{4E00}'..='\u{9FFF}' // CJK unified ideographs
        | '\u{F900}'..='\u{FAFF}' // CJK compatibility ideographs
    )
}

/// Per-language dispatch. Holds the jieba dictionary once; cloning
/// segmenters per sentence would reload it.
pub struct SegmenterSet {
    chinese: ChineseSegmenter,
    japanese: JapaneseSegmenter,
    fallback: UnicodeSegmenter,
}

impl SegmenterSet {
    pub fn new() -> Self {
        Self {
            chinese: ChineseSegmenter::new(),
            japanese: JapaneseSegmenter,
            fallback: UnicodeSegmenter,
        }
    }

    /// Pick the segmenter for an ISO 639-3 language code
    pub fn for_language(&self, lang: &str) -> &dyn Segmenter {
        match lang {
            "cmn" => &self.chinese,
            "jpn" => &self.japanese,
            _ => &self.fallback,
        }
    }
}

impl Default for SegmenterSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove punctuation before segmentation, mirroring the corpus
/// preparation convention (`\p{P}` strip). Covers ASCII punctuation plus
/// the common CJK marks in the corpus.
fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation() && !is_cjk_punctuation(*c))
        .collect()
}

fn is_cjk_punctuation(c: char) -> bool {
    matches!(c,
        '\u{3000}'..='\u{303F}'   // CJK symbols and punctuation
        | '\u{FF01}'..='\u{FF0F}' // fullwidth ! " # $ % & ' ( ) * + , - . /
        | '\u{FF1A}'..='\u{FF20}' // fullwidth : ; < = > ? @
        | '\u{FF3B}'..='\u{FF40}' // fullwidth [ \ ] ^ _ `
        | '\u{FF5B}'..='\u{FF65}' // fullwidth { | } ~ and halfwidth brackets
        | '\u{2018}'..='\u{201F}' // curly quotes
        | '\u{2026}'              // ellipsis
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chinese_segmentation() {
        let seg = ChineseSegmenter::new();
        let words = seg.segment("我爱北京天安门");
        assert!(!words.is_empty());
        assert!(words.iter().any(|w| w == "北京"));
    }

    #[test]
    fn test_chinese_punctuation_is_stripped() {
        let seg = ChineseSegmenter::new();
        let words = seg.segment("你好，世界！");
        assert!(words.iter().all(|w| !w.contains('，') && !w.contains('！')));
    }

    #[test]
    fn test_unicode_fallback() {
        let seg = UnicodeSegmenter;
        let words = seg.segment("Hello, world!");
        assert_eq!(words, vec!["Hello", "world"]);
    }

    #[test]
    fn test_japanese_multi_kanji_word_is_indexed_whole() {
        let seg = JapaneseSegmenter;
        let words = seg.segment("私は学生です");
        assert!(words.iter().any(|w| w == "学生"));
        assert!(words.iter().any(|w| w == "私"));
    }

    #[test]
    fn test_japanese_longer_word_is_covered_by_bigrams() {
        let seg = JapaneseSegmenter;
        let words = seg.segment("図書館に行く");
        assert!(words.iter().any(|w| w == "図書"));
        assert!(words.iter().any(|w| w == "書館"));
    }

    #[test]
    fn test_japanese_mixed_latin_and_punctuation() {
        let seg = JapaneseSegmenter;
        let words = seg.segment("OKです。");
        assert!(words.iter().any(|w| w == "OK"));
        assert!(words.iter().any(|w| w == "です"));
        assert!(words.iter().all(|w| !w.contains('。')));
    }

    #[test]
    fn test_dispatch_by_language() {
        let set = SegmenterSet::new();
        let eng = set.for_language("eng").segment("one two");
        assert_eq!(eng, vec!["one", "two"]);

        let cmn = set.for_language("cmn").segment("我爱你");
        assert!(!cmn.is_empty());

        let jpn = set.for_language("jpn").segment("私は学生です");
        assert!(jpn.iter().any(|w| w == "学生"));
    }

    #[test]
    fn test_strip_punctuation() {
        assert_eq!(strip_punctuation("a,b.c"), "abc");
        assert_eq!(strip_punctuation("你好。"), "你好");
    }
}
