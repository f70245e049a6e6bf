use arena_core::repo::seed::seed_books;
use arena_core::{
    load_books, save_books, BookService, BookServiceError, BookStatus, Category, KeyValueStore,
    MemoryKvStore, NewBook, SqliteKvStore, StoreError, StoreResult, BOOKS_STORAGE_KEY,
};

fn fixed_clock() -> i64 {
    1_800_000_000_000
}

fn new_book(title: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: "伊坂幸太郎".to_string(),
        category: Category::Novel,
        cover_color: None,
    }
}

/// Store whose writes always fail.
#[derive(Default)]
struct ReadOnlyStore {
    inner: MemoryKvStore,
}

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key)
    }

    fn set(&mut self, _key: &str, _value: &str) -> StoreResult<()> {
        Err(StoreError::Unavailable("quota exceeded".to_string()))
    }

    fn remove(&mut self, key: &str) -> StoreResult<()> {
        self.inner.remove(key)
    }
}

#[test]
fn absent_snapshot_loads_seed_shelf() {
    let service = BookService::load(MemoryKvStore::new());
    assert_eq!(service.list(), seed_books().as_slice());
}

#[test]
fn malformed_snapshot_falls_back_to_seed_and_is_cleared() {
    let mut store = MemoryKvStore::new();
    store.set(BOOKS_STORAGE_KEY, "{not json").unwrap();

    let books = load_books(&mut store);
    assert_eq!(books, seed_books());
    assert_eq!(store.get(BOOKS_STORAGE_KEY).unwrap(), None);
}

#[test]
fn empty_snapshot_falls_back_to_seed() {
    let mut store = MemoryKvStore::new();
    store.set(BOOKS_STORAGE_KEY, "[]").unwrap();
    assert_eq!(load_books(&mut store), seed_books());
}

#[test]
fn string_timestamps_load_and_keep_the_stored_shelf() {
    // Older snapshots: ISO strings for lastUpdated, no tags or insights.
    let raw = r#"[
        {"id":"1","title":"ゼロ・トゥ・ワン","author":"ピーター・ティール","oneThing":"",
         "status":"reading","category":"Business","notes":"","coverColor":"bg-slate-900",
         "lastUpdated":"2026-02-07T10:00:00"},
        {"id":"9","title":"砂の女","author":"安部公房","oneThing":"逃げない",
         "status":"finished","category":"Novel","notes":"穴","coverColor":"bg-amber-900",
         "lastUpdated":"2026-02-07T10:00:00.000Z"}
    ]"#;
    let mut store = MemoryKvStore::new();
    store.set(BOOKS_STORAGE_KEY, raw).unwrap();

    let books = load_books(&mut store);
    assert_eq!(books.len(), 2);
    assert_eq!(books[1].id, "9");
    assert!(books.iter().all(|book| book.last_updated == 1_770_458_400_000));
    assert!(books.iter().all(|book| book.tags.is_empty() && book.insights.is_empty()));
    assert_eq!(store.get(BOOKS_STORAGE_KEY).unwrap().as_deref(), Some(raw));
}

#[test]
fn saved_shelf_round_trips_through_sqlite_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("arena.sqlite3");

    let expected = {
        let mut service =
            BookService::load_with_clock(SqliteKvStore::open(&path).unwrap(), fixed_clock);
        let created = service.create(new_book("ラッシュライフ")).unwrap();
        service.update_note(&created.id, "# 群像劇\n- 視点の交差").unwrap();
        service
            .update_tags(&created.id, vec!["小説".to_string(), "構造".to_string()])
            .unwrap();
        service.add_insight(&created.id, "伏線は回収されて初めて伏線になる。").unwrap();
        service.update_status("2", BookStatus::Reading).unwrap();
        service.list().to_vec()
    };

    let reloaded = BookService::load(SqliteKvStore::open(&path).unwrap());
    assert_eq!(reloaded.list(), expected.as_slice());
}

#[test]
fn save_then_load_preserves_arbitrary_list() {
    let mut store = MemoryKvStore::new();
    let mut books = seed_books();
    books.truncate(2);
    books[1].tags.clear();
    books[1].insights.clear();

    save_books(&mut store, &books).unwrap();
    assert_eq!(load_books(&mut store), books);
}

#[test]
fn create_prepends_tsundoku_book_and_persists() {
    let mut service = BookService::load_with_clock(MemoryKvStore::new(), fixed_clock);
    let created = service.create(new_book(" 砂漠 ")).unwrap();

    assert_eq!(created.title, "砂漠");
    assert_eq!(created.status, BookStatus::Tsundoku);
    assert_eq!(created.cover_color, "bg-blue-900");
    assert_eq!(created.last_updated, fixed_clock());
    assert_eq!(service.list()[0].id, created.id);

    let stored = service.storage().get(BOOKS_STORAGE_KEY).unwrap().unwrap();
    assert!(stored.contains(&created.id));
}

#[test]
fn create_rejects_blank_title() {
    let mut service = BookService::load(MemoryKvStore::new());
    let err = service.create(new_book("   ")).unwrap_err();
    assert!(matches!(err, BookServiceError::InvalidInput(_)));
    assert_eq!(service.list().len(), seed_books().len());
}

#[test]
fn mutations_stamp_last_updated() {
    let mut service = BookService::load_with_clock(MemoryKvStore::new(), fixed_clock);
    let updated = service.update_one_thing("3", "直感を疑え。").unwrap();
    assert_eq!(updated.one_thing, "直感を疑え。");
    assert_eq!(updated.last_updated, fixed_clock());
}

#[test]
fn tag_operations_keep_set_semantics() {
    let mut service = BookService::load_with_clock(MemoryKvStore::new(), fixed_clock);
    let before = service.get("1").unwrap().clone();

    let after_dup = service.add_tag("1", "ビジネス").unwrap();
    assert_eq!(after_dup.tags, before.tags);
    assert_eq!(after_dup.last_updated, before.last_updated);

    let after_missing = service.remove_tag("1", "存在しない").unwrap();
    assert_eq!(after_missing.tags, before.tags);

    let after_add = service.add_tag("1", "リーダーシップ").unwrap();
    assert_eq!(
        after_add.tags,
        vec![
            "ビジネス".to_string(),
            "心理学".to_string(),
            "リーダーシップ".to_string()
        ]
    );

    let after_remove = service.remove_tag("1", "心理学").unwrap();
    assert_eq!(
        after_remove.tags,
        vec!["ビジネス".to_string(), "リーダーシップ".to_string()]
    );
}

#[test]
fn update_tags_replaces_and_deduplicates() {
    let mut service = BookService::load(MemoryKvStore::new());
    let updated = service
        .update_tags(
            "2",
            vec![
                "物語".to_string(),
                " 物語 ".to_string(),
                "".to_string(),
                "家族".to_string(),
            ],
        )
        .unwrap();
    assert_eq!(updated.tags, vec!["物語".to_string(), "家族".to_string()]);
}

#[test]
fn delete_removes_book_and_unknown_ids_error() {
    let mut service = BookService::load(MemoryKvStore::new());
    let removed = service.delete("3").unwrap();
    assert_eq!(removed.title, "Thinking, Fast and Slow");
    assert!(service.get("3").is_none());

    let err = service.delete("3").unwrap_err();
    assert_eq!(err, BookServiceError::BookNotFound("3".to_string()));
    let err = service.update_note("missing", "x").unwrap_err();
    assert_eq!(err, BookServiceError::BookNotFound("missing".to_string()));
}

#[test]
fn blank_insight_is_rejected() {
    let mut service = BookService::load(MemoryKvStore::new());
    assert_eq!(
        service.add_insight("1", "  ").unwrap_err(),
        BookServiceError::EmptyInsight
    );
}

#[test]
fn write_failures_are_dropped_and_memory_state_survives() {
    let mut service = BookService::load(ReadOnlyStore::default());
    let updated = service.update_note("1", "書き込めなくても編集は続く").unwrap();
    assert_eq!(updated.notes, "書き込めなくても編集は続く");
    assert_eq!(service.get("1").unwrap().notes, "書き込めなくても編集は続く");
}

#[test]
fn list_by_status_filters_in_shelf_order() {
    let service = BookService::load(MemoryKvStore::new());
    let reading: Vec<&str> = service
        .list_by_status(BookStatus::Reading)
        .into_iter()
        .map(|book| book.id.as_str())
        .collect();
    assert_eq!(reading, vec!["1", "4"]);
}
