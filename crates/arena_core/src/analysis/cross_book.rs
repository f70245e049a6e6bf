//! Cross-book concept overlap analyzer.
//!
//! # Responsibility
//! - Tag every insight on the shelf with dictionary concepts.
//! - Pick the dominant concept shared by at least two books.
//! - Choose a canned provocation for that concept.
//!
//! # Invariants
//! - Returns `None` when fewer than two books carry insights.
//! - Returns `None` when no concept spans two distinct books.
//! - Ties on occurrence count resolve to the earlier dictionary entry.
//! - Evidence holds at most `MAX_EVIDENCE` pairs in shelf order.

use crate::analysis::concepts::{tag_concepts_with, Concept, CONCEPT_DICTIONARY};
use crate::model::book::Book;
use crate::model::message::{ChatMessage, Evidence};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Maximum evidence pairs attached to one analysis.
pub const MAX_EVIDENCE: usize = 3;

const GROWTH_PROVOCATIONS: &[&str] = &[
    "どの本でも『成長』って書いてるな。便利な言葉に逃げてないか？何がどう変わったか数字で言え。",
    "成長、成長って、お前は毎回同じ結論に着地してる。それ、本を読む前から持ってた答えじゃないのか？",
];

const FAILURE_PROVOCATIONS: &[&str] = &[
    "また『失敗』の話か。失敗を語るのは得意だな。で、最後に本気で失敗したのはいつだ？",
    "失敗を学びに変えろって何冊読んでも、挑戦しなきゃ失敗すらできないぞ。",
];

const STORY_PROVOCATIONS: &[&str] = &[
    "小説でもビジネス書でも『物語』に反応してるな。次の商談、最初の30秒を物語にしてみろ。",
    "物語が大事なのはわかった。じゃあお前自身の物語はどこに書いてある？",
];

const MENTORING_PROVOCATIONS: &[&str] = &[
    "どの本を読んでも部下の話に戻ってくるな。フジモンに直接聞いたほうが早いんじゃないか？",
    "部下育成の気づきが溜まってる。で、次の1on1で何を変える？一つに絞れ。",
];

const ACTION_PROVOCATIONS: &[&str] = &[
    "複数の本で『試せ』と言われてるのに、まだメモしかしてないな。実験の日付を決めろ。",
];

fn concept_provocations(label: &str) -> Option<&'static [&'static str]> {
    match label {
        "成長" => Some(GROWTH_PROVOCATIONS),
        "失敗" => Some(FAILURE_PROVOCATIONS),
        "物語" => Some(STORY_PROVOCATIONS),
        "部下育成" => Some(MENTORING_PROVOCATIONS),
        "行動" => Some(ACTION_PROVOCATIONS),
        _ => None,
    }
}

/// Dominant shared concept and its supporting evidence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossAnalysis {
    pub concept: &'static str,
    /// Total (book, insight) occurrences for `concept`.
    pub occurrences: usize,
    /// Distinct books mentioning `concept`.
    pub book_count: usize,
    pub evidence: Vec<Evidence>,
    pub message: String,
}

impl CrossAnalysis {
    /// Wraps the result as a `cross_analysis` chat message.
    pub fn to_message(&self, timestamp: i64) -> ChatMessage {
        ChatMessage::cross_analysis(self.message.clone(), self.evidence.clone(), timestamp)
    }
}

/// Runs the analyzer over the built-in concept dictionary.
pub fn analyze_shelf<R: Rng + ?Sized>(books: &[Book], rng: &mut R) -> Option<CrossAnalysis> {
    analyze_shelf_with(CONCEPT_DICTIONARY, books, rng)
}

/// Runs the analyzer over a caller-provided dictionary.
pub fn analyze_shelf_with<R: Rng + ?Sized>(
    dictionary: &[Concept],
    books: &[Book],
    rng: &mut R,
) -> Option<CrossAnalysis> {
    let books_with_insights = books
        .iter()
        .filter(|book| !book.insights.is_empty())
        .count();
    if books_with_insights < 2 {
        debug!(
            "event=cross_analysis module=analysis status=skipped reason=too_few_books books_with_insights={}",
            books_with_insights
        );
        return None;
    }

    // Indexed by dictionary position: (book index, insight text).
    let mut occurrences: Vec<Vec<(usize, &str)>> = vec![Vec::new(); dictionary.len()];
    for (book_index, book) in books.iter().enumerate() {
        for insight in book.insight_texts() {
            for label in tag_concepts_with(dictionary, insight) {
                if let Some(position) = dictionary.iter().position(|c| c.label == label) {
                    occurrences[position].push((book_index, insight));
                }
            }
        }
    }

    let mut best: Option<(usize, usize, usize)> = None;
    for (position, hits) in occurrences.iter().enumerate() {
        let book_count = distinct_books(hits);
        if book_count < 2 {
            continue;
        }
        let better = match best {
            Some((_, best_hits, _)) => hits.len() > best_hits,
            None => true,
        };
        if better {
            best = Some((position, hits.len(), book_count));
        }
    }

    let Some((position, occurrence_count, book_count)) = best else {
        debug!("event=cross_analysis module=analysis status=skipped reason=no_shared_concept");
        return None;
    };

    let concept = dictionary[position].label;
    let hits = &occurrences[position];
    let evidence: Vec<Evidence> = hits
        .iter()
        .take(MAX_EVIDENCE)
        .map(|(book_index, insight)| Evidence {
            book_title: books[*book_index].title.clone(),
            insight: insight.to_string(),
        })
        .collect();

    let message = match concept_provocations(concept).and_then(|pool| pool.choose(rng)) {
        Some(text) => text.to_string(),
        None => fallback_provocation(concept, books, hits),
    };

    debug!(
        "event=cross_analysis module=analysis status=ok concept={} occurrences={} books={}",
        concept, occurrence_count, book_count
    );
    Some(CrossAnalysis {
        concept,
        occurrences: occurrence_count,
        book_count,
        evidence,
        message,
    })
}

fn distinct_books(hits: &[(usize, &str)]) -> usize {
    let mut seen: Vec<usize> = hits.iter().map(|(book_index, _)| *book_index).collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}

fn fallback_provocation(concept: &str, books: &[Book], hits: &[(usize, &str)]) -> String {
    let mut titles: Vec<&str> = Vec::new();
    for (book_index, _) in hits {
        let title = books[*book_index].title.as_str();
        if !titles.contains(&title) {
            titles.push(title);
        }
    }
    let quoted = titles
        .iter()
        .map(|title| format!("『{title}』"))
        .collect::<Vec<_>>()
        .join("と");
    format!("{quoted}、どれも「{concept}」の話をしてるぞ。偶然か？それともお前の思考の癖か？")
}
