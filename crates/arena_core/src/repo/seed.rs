//! Fixed sample shelf used when no usable snapshot exists.

use crate::model::book::{Book, BookStatus, Category, Insight};

#[allow(clippy::too_many_arguments)]
fn seed_book(
    id: &str,
    title: &str,
    author: &str,
    one_thing: &str,
    status: BookStatus,
    category: Category,
    notes: &str,
    tags: &[&str],
    insights: &[&str],
    cover_color: &str,
    last_updated: i64,
) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        one_thing: one_thing.to_string(),
        status,
        category,
        notes: notes.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        insights: insights
            .iter()
            .map(|text| Insight::new(*text, last_updated))
            .collect(),
        cover_color: cover_color.to_string(),
        last_updated,
    }
}

/// Returns the sample books shown on first launch.
pub fn seed_books() -> Vec<Book> {
    vec![
        seed_book(
            "1",
            "Mindset",
            "Carol S. Dweck",
            "才能ではなく、努力のプロセスを褒めることが成長を生む。",
            BookStatus::Reading,
            Category::Business,
            "# 第1章：マインドセットとは\n\n- 固定思考（Fixed）と成長思考（Growth）\n- 失敗をどう捉えるか？\n  - Fixed: 才能がない証拠\n  - Growth: 学びの機会\n\n## 現場での適用\n部下のフジモンに対して、成果物だけで判断していないか？「アプローチ」を評価する言葉かけを意識する。",
            &["ビジネス", "心理学"],
            &[
                "失敗は能力不足の証明ではなく、成長の途中経過だ。",
                "部下の試行を言語化して評価する。",
            ],
            "bg-blue-900",
            1_770_458_400_000,
        ),
        seed_book(
            "2",
            "重力ピエロ",
            "伊坂幸太郎",
            "深刻さは、重力のように人を縛る。もっと軽やかに跳べ。",
            BookStatus::Finished,
            Category::Novel,
            "春が二階から落ちてくる冒頭の軽やかさ。\n遺伝子という「呪い」をどう解釈するか。\n\n> \"楽しそうに生きていれば、重力なんて消してしまう\" \n\n営業のプレッシャーも同じかもしれない。深刻ぶることで自分を守っていないか？",
            &["小説", "物語構造"],
            &[
                "軽やかな会話ほど、重い真実を運べる。",
                "深刻さで自分を守ると、成長が止まる。",
            ],
            "bg-emerald-900",
            1_769_959_800_000,
        ),
        seed_book(
            "3",
            "Thinking, Fast and Slow",
            "Daniel Kahneman",
            "直感（システム1）は便利だが、重要な決定では疑え。",
            BookStatus::Tsundoku,
            Category::Science,
            "",
            &["心理学"],
            &[],
            "bg-amber-900",
            1_768_899_600_000,
        ),
        seed_book(
            "4",
            "Pure Invention",
            "Matt Alt",
            "日本の「ファンタジー」が世界を変えた。",
            BookStatus::Reading,
            Category::Business,
            "日本の製品がなぜ愛されるか？機能ではなく「不可思議さ」や「カワイイ」が鍵。\n\n建材の営業に「物語」はあるか？\n機能スペック競争からの脱却ヒント。",
            &["ビジネス", "文化"],
            &[
                "機能ではなく物語が製品を愛させる。",
                "営業トークにも比喩を置く。",
            ],
            "bg-purple-900",
            1_770_408_000_000,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::seed_books;
    use std::collections::BTreeSet;

    #[test]
    fn seed_ids_are_unique_and_books_valid() {
        let books = seed_books();
        let ids: BTreeSet<_> = books.iter().map(|book| book.id.clone()).collect();
        assert_eq!(ids.len(), books.len());
        for book in &books {
            book.validate().unwrap();
        }
    }
}
