use arena_core::repo::seed::seed_books;
use arena_core::{analyze_shelf, tag_concepts, Book, Category, Insight, Tone};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn book_with_insights(title: &str, insights: &[&str]) -> Book {
    let mut book = Book::new(title, "著者", Category::Business, "bg-slate-800", 0);
    book.insights = insights.iter().map(|text| Insight::new(*text, 0)).collect();
    book
}

#[test]
fn shared_concept_beats_single_book_concept() {
    let books = vec![
        book_with_insights("Mindset", &["努力の過程を褒めると成長する。"]),
        book_with_insights("GRIT", &["やり抜く力が成長を支える。"]),
        book_with_insights("失敗の科学", &["失敗を記録する文化をつくる。"]),
    ];
    let mut rng = StdRng::seed_from_u64(42);

    let result = analyze_shelf(&books, &mut rng).unwrap();
    assert_eq!(result.concept, "成長");
    assert_eq!(result.book_count, 2);
    assert_eq!(result.occurrences, 2);
    let titles: Vec<&str> = result
        .evidence
        .iter()
        .map(|evidence| evidence.book_title.as_str())
        .collect();
    assert_eq!(titles, vec!["Mindset", "GRIT"]);
}

#[test]
fn fewer_than_two_books_with_insights_yields_no_result() {
    let books = vec![
        book_with_insights("A", &["成長", "成長した"]),
        book_with_insights("B", &[]),
    ];
    let mut rng = StdRng::seed_from_u64(1);
    assert!(analyze_shelf(&books, &mut rng).is_none());
    assert!(analyze_shelf(&[], &mut rng).is_none());
}

#[test]
fn no_shared_concept_yields_no_result() {
    let books = vec![
        book_with_insights("A", &["成長を実感"]),
        book_with_insights("B", &["失敗を恐れない"]),
        book_with_insights("C", &["天気の話"]),
    ];
    let mut rng = StdRng::seed_from_u64(1);
    assert!(analyze_shelf(&books, &mut rng).is_none());
}

#[test]
fn evidence_is_capped_at_three_pairs() {
    let books = vec![
        book_with_insights("A", &["growth 1", "growth 2"]),
        book_with_insights("B", &["Growth 3", "成長 4"]),
    ];
    let mut rng = StdRng::seed_from_u64(9);
    let result = analyze_shelf(&books, &mut rng).unwrap();
    assert_eq!(result.occurrences, 4);
    assert_eq!(result.evidence.len(), 3);
    assert_eq!(result.evidence[2].insight, "Growth 3");
}

#[test]
fn same_seed_picks_same_message() {
    let books = seed_books();
    let first = analyze_shelf(&books, &mut StdRng::seed_from_u64(3)).unwrap();
    let second = analyze_shelf(&books, &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.concept, "成長");
}

#[test]
fn analysis_converts_to_cross_analysis_message() {
    let books = seed_books();
    let result = analyze_shelf(&books, &mut StdRng::seed_from_u64(8)).unwrap();
    let message = result.to_message(123);
    assert_eq!(message.tone(), Tone::CrossAnalysis);
    assert_eq!(message.timestamp(), 123);
    assert_eq!(message.text(), result.message);
    assert_eq!(message.evidence(), result.evidence.as_slice());
}

#[test]
fn tagger_reports_concepts_in_dictionary_order() {
    assert_eq!(
        tag_concepts("部下との1on1で失敗談を物語として話す"),
        vec!["失敗", "物語", "部下育成"]
    );
}
