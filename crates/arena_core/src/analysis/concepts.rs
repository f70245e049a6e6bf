//! Fixed concept dictionary and substring tagger.
//!
//! # Invariants
//! - Dictionary order is stable and doubles as the tie-break order.
//! - Matching is literal substring search; only ASCII letters fold case.

/// One concept label and its trigger keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Concept {
    pub label: &'static str,
    pub keywords: &'static [&'static str],
}

/// Process-lifetime concept dictionary.
pub const CONCEPT_DICTIONARY: &[Concept] = &[
    Concept {
        label: "成長",
        keywords: &["成長", "growth", "伸び"],
    },
    Concept {
        label: "失敗",
        keywords: &["失敗", "failure", "挫折", "ミス"],
    },
    Concept {
        label: "物語",
        keywords: &["物語", "ストーリー", "story", "比喩", "伏線"],
    },
    Concept {
        label: "習慣",
        keywords: &["習慣", "habit", "継続", "ルーティン"],
    },
    Concept {
        label: "直感",
        keywords: &["直感", "intuition", "バイアス", "システム1"],
    },
    Concept {
        label: "部下育成",
        keywords: &["部下", "1on1", "フジモン", "藤門", "育成"],
    },
    Concept {
        label: "軽さ",
        keywords: &["軽やか", "ユーモア", "遊び", "重力"],
    },
    Concept {
        label: "行動",
        keywords: &["行動", "実験", "試行", "action"],
    },
];

/// Returns the labels whose keywords occur in `text`, in dictionary order.
pub fn tag_concepts(text: &str) -> Vec<&'static str> {
    tag_concepts_with(CONCEPT_DICTIONARY, text)
}

/// Same as [`tag_concepts`] over a caller-provided dictionary.
pub fn tag_concepts_with(dictionary: &[Concept], text: &str) -> Vec<&'static str> {
    let folded = text.to_ascii_lowercase();
    dictionary
        .iter()
        .filter(|concept| {
            concept
                .keywords
                .iter()
                .any(|keyword| contains_folded(&folded, keyword))
        })
        .map(|concept| concept.label)
        .collect()
}

/// `haystack` must already be ASCII-lowercased.
pub(crate) fn contains_folded(haystack: &str, keyword: &str) -> bool {
    !keyword.is_empty() && haystack.contains(keyword.to_ascii_lowercase().as_str())
}

#[cfg(test)]
mod tests {
    use super::{tag_concepts, tag_concepts_with, Concept};

    #[test]
    fn tags_japanese_keywords() {
        assert_eq!(tag_concepts("失敗から成長する"), vec!["成長", "失敗"]);
    }

    #[test]
    fn ascii_keywords_ignore_case() {
        assert_eq!(tag_concepts("Growth MINDSET"), vec!["成長"]);
        assert_eq!(tag_concepts("Daily HABIT tracking"), vec!["習慣"]);
    }

    #[test]
    fn unmatched_text_yields_nothing() {
        assert!(tag_concepts("今日は晴れ").is_empty());
        assert!(tag_concepts("").is_empty());
    }

    #[test]
    fn custom_dictionary_is_respected() {
        const DICT: &[Concept] = &[Concept {
            label: "jazz",
            keywords: &["Improv"],
        }];
        assert_eq!(tag_concepts_with(DICT, "free improv session"), vec!["jazz"]);
    }
}
