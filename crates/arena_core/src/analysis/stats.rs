//! Shelf-wide reading statistics.

use crate::model::book::{Book, BookStatus, Category};

/// Aggregate counters over a book list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingStats {
    pub total_books: usize,
    pub reading: usize,
    pub finished: usize,
    pub tsundoku: usize,
    /// Sum of note lengths in characters.
    pub total_note_chars: usize,
    pub total_insights: usize,
    /// Books whose one-line takeaway is not blank.
    pub books_with_one_thing: usize,
    /// Most frequent category and its count; first seen wins ties.
    pub top_category: Option<(Category, usize)>,
    /// Finished share, rounded to a whole percent.
    pub finished_percent: u32,
}

pub fn reading_stats(books: &[Book]) -> ReadingStats {
    let count_status = |status: BookStatus| books.iter().filter(|b| b.status == status).count();
    let finished = count_status(BookStatus::Finished);

    let mut categories: Vec<(Category, usize)> = Vec::new();
    for book in books {
        match categories.iter_mut().find(|(category, _)| *category == book.category) {
            Some((_, count)) => *count += 1,
            None => categories.push((book.category, 1)),
        }
    }
    let top_category = categories
        .into_iter()
        .fold(None, |best: Option<(Category, usize)>, entry| match best {
            Some(current) if current.1 >= entry.1 => Some(current),
            _ => Some(entry),
        });

    let finished_percent = if books.is_empty() {
        0
    } else {
        ((finished as f64 / books.len() as f64) * 100.0).round() as u32
    };

    ReadingStats {
        total_books: books.len(),
        reading: count_status(BookStatus::Reading),
        finished,
        tsundoku: count_status(BookStatus::Tsundoku),
        total_note_chars: books.iter().map(|b| b.notes.chars().count()).sum(),
        total_insights: books.iter().map(|b| b.insights.len()).sum(),
        books_with_one_thing: books
            .iter()
            .filter(|b| !b.one_thing.trim().is_empty())
            .count(),
        top_category,
        finished_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::reading_stats;
    use crate::model::book::{BookStatus, Category};
    use crate::repo::seed::seed_books;

    #[test]
    fn empty_shelf_has_zero_percent_and_no_category() {
        let stats = reading_stats(&[]);
        assert_eq!(stats.finished_percent, 0);
        assert_eq!(stats.top_category, None);
    }

    #[test]
    fn seed_shelf_counts() {
        let mut books = seed_books();
        books[0].notes = "あいう".to_string();
        books[2].status = BookStatus::Finished;
        let stats = reading_stats(&books);
        assert_eq!(stats.total_books, 4);
        assert_eq!(stats.finished, 2);
        assert_eq!(stats.finished_percent, 50);
        assert_eq!(stats.top_category, Some((Category::Business, 2)));
        assert_eq!(stats.total_insights, 6);
        assert_eq!(stats.books_with_one_thing, 4);
        assert!(stats.total_note_chars >= 3);
    }
}
