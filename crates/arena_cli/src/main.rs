//! `arena` command-line entry point.
//!
//! # Responsibility
//! - Expose shelf operations, reading stats and persona calls as subcommands.
//! - Run the debounced commentary loop over stdin for `watch`.
//!
//! # Invariants
//! - Every failure is reported on stderr with a non-zero exit; nothing panics.

use arena_core::{
    analyze_shelf, init_logging, ArenaConfig, Book, BookService, BookStatus, Category,
    ChatMessage, CommentarySession, Conversation, KeyValueStore, NewBook, PersonaClient,
    PersonaContext, SqliteKvStore, Tone,
};
use clap::{Parser, Subcommand};
use log::{error, info};
use std::error::Error;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::time::Instant;

const HISTORY_LIMIT: usize = 10;

type CliResult<T> = Result<T, Box<dyn Error>>;

#[derive(Parser, Debug)]
#[command(name = "arena", version, about = "Reading journal with a sparring partner")]
struct Cli {
    /// Directory holding the journal database and default logs [env: ARENA_DATA_DIR].
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List books in shelf order.
    List {
        #[arg(long)]
        status: Option<BookStatus>,
    },
    /// Show one book in full.
    Show { id: String },
    /// Add a book to the front of the shelf.
    Add {
        title: String,
        author: String,
        #[arg(long, default_value = "Business")]
        category: Category,
        #[arg(long)]
        cover_color: Option<String>,
    },
    /// Replace a book's note.
    Note { id: String, content: String },
    /// Change reading status.
    Status { id: String, status: BookStatus },
    /// Set the one-line takeaway.
    OneThing { id: String, text: String },
    /// Replace the tag list.
    Tags { id: String, tags: Vec<String> },
    TagAdd { id: String, tag: String },
    TagRemove { id: String, tag: String },
    /// Record an insight.
    Insight { id: String, text: String },
    Delete { id: String },
    /// Print reading statistics.
    Stats,
    /// Find a concept shared across books.
    Analyze {
        /// Ask the remote persona instead of the local dictionary.
        #[arg(long)]
        remote: bool,
    },
    /// Ask the persona one question.
    Ask {
        message: String,
        #[arg(long)]
        book: Option<String>,
    },
    /// Append stdin lines to a book's note and print commentary as it fires.
    Watch { id: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = ArenaConfig::from_env_with_level(cli.log_level.as_deref())?;
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_dir(data_dir);
    }

    let log_dir = absolute(&config.log_dir)?;
    init_logging(config.log_level, &log_dir)?;

    let store = SqliteKvStore::open(config.db_path())?;
    let mut service = BookService::load(store);
    info!(
        "event=cli_start module=cli status=ok books={}",
        service.list().len()
    );

    match cli.command {
        Command::List { status } => {
            let books: Vec<&Book> = match status {
                Some(status) => service.list_by_status(status),
                None => service.list().iter().collect(),
            };
            for book in books {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    book.id,
                    book.status.as_str(),
                    book.category.as_str(),
                    book.title,
                    book.author
                );
            }
        }
        Command::Show { id } => {
            let book = service
                .get(&id)
                .ok_or_else(|| format!("book not found: {id}"))?;
            print_book(book);
        }
        Command::Add {
            title,
            author,
            category,
            cover_color,
        } => {
            let book = service.create(NewBook {
                title,
                author,
                category,
                cover_color,
            })?;
            println!("{}", book.id);
        }
        Command::Note { id, content } => {
            service.update_note(&id, content)?;
        }
        Command::Status { id, status } => {
            let book = service.update_status(&id, status)?;
            println!("{} -> {}", book.title, book.status.label());
        }
        Command::OneThing { id, text } => {
            service.update_one_thing(&id, text)?;
        }
        Command::Tags { id, tags } => {
            let book = service.update_tags(&id, tags)?;
            println!("{}", book.tags.join(", "));
        }
        Command::TagAdd { id, tag } => {
            let book = service.add_tag(&id, &tag)?;
            println!("{}", book.tags.join(", "));
        }
        Command::TagRemove { id, tag } => {
            let book = service.remove_tag(&id, &tag)?;
            println!("{}", book.tags.join(", "));
        }
        Command::Insight { id, text } => {
            let book = service.add_insight(&id, &text)?;
            println!("{} insights", book.insights.len());
        }
        Command::Delete { id } => {
            let book = service.delete(&id)?;
            println!("deleted {}", book.title);
        }
        Command::Stats => print_stats(&service),
        Command::Analyze { remote } => {
            if remote {
                let client = PersonaClient::from_config(&config)?;
                println!("{}", client.analyze_books(service.list()));
            } else {
                match analyze_shelf(service.list(), &mut rand::thread_rng()) {
                    Some(analysis) => print_message(&analysis.to_message(now_ms())),
                    None => println!("共通するテーマはまだ見つからない。もっと気づきを書け。"),
                }
            }
        }
        Command::Ask { message, book } => {
            let client = PersonaClient::from_config(&config)?;
            let context = match book.as_deref() {
                Some(id) => {
                    let book = service
                        .get(id)
                        .ok_or_else(|| format!("book not found: {id}"))?;
                    let history =
                        Conversation::opening_for(book, now_ms()).history_turns(HISTORY_LIMIT);
                    PersonaContext::from_book(book, history)
                }
                None => PersonaContext {
                    history: Conversation::global(now_ms()).history_turns(HISTORY_LIMIT),
                    ..PersonaContext::default()
                },
            };
            println!("{}", client.get_jinnai_response(&message, &context));
        }
        Command::Watch { id } => watch(&mut service, &id)?,
    }
    Ok(())
}

/// Feeds stdin lines into the note and prints commentary when the quiet period lapses.
fn watch<S: KeyValueStore>(service: &mut BookService<S>, id: &str) -> CliResult<()> {
    let book = service
        .get(id)
        .cloned()
        .ok_or_else(|| format!("book not found: {id}"))?;
    let mut notes = book.notes.clone();
    let mut session = CommentarySession::new(rand::thread_rng());
    if let Some(greeting) = session.select_book(&book) {
        print_message(greeting);
    }

    let (sender, receiver) = mpsc::channel::<String>();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });

    loop {
        let received = match session.next_deadline() {
            Some(deadline) => {
                let wait = deadline.saturating_duration_since(Instant::now());
                receiver.recv_timeout(wait)
            }
            None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(line) => {
                if !notes.is_empty() {
                    notes.push('\n');
                }
                notes.push_str(&line);
                service.update_note(id, notes.clone())?;
                session.note_edited(&notes, Instant::now());
            }
            Err(RecvTimeoutError::Timeout) => {
                if let Some(message) = session.poll(Instant::now()) {
                    print_message(message);
                }
            }
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(deadline) = session.next_deadline() {
                    std::thread::sleep(deadline.saturating_duration_since(Instant::now()));
                    if let Some(message) = session.poll(Instant::now()) {
                        print_message(message);
                    }
                }
                return Ok(());
            }
        }
    }
}

fn print_book(book: &Book) {
    println!("{} / {}", book.title, book.author);
    println!(
        "id={} status={} category={}",
        book.id,
        book.status.label(),
        book.category.as_str()
    );
    if !book.one_thing.is_empty() {
        println!("one thing: {}", book.one_thing);
    }
    if !book.tags.is_empty() {
        println!("tags: {}", book.tags.join(", "));
    }
    if !book.notes.is_empty() {
        println!("\n{}", book.notes);
    }
    for insight in &book.insights {
        println!("* {}", insight.text);
    }
}

fn print_stats<S: KeyValueStore>(service: &BookService<S>) {
    let stats = service.stats();
    println!("total:     {}", stats.total_books);
    println!("reading:   {}", stats.reading);
    println!(
        "finished:  {} ({}%)",
        stats.finished, stats.finished_percent
    );
    println!("tsundoku:  {}", stats.tsundoku);
    println!("notes:     {} chars", stats.total_note_chars);
    println!("insights:  {}", stats.total_insights);
    println!("one thing: {}", stats.books_with_one_thing);
    if let Some((category, count)) = stats.top_category {
        println!("top:       {} ({})", category.as_str(), count);
    }
}

fn print_message(message: &ChatMessage) {
    let label = match message.tone() {
        Tone::Devil => "陣内[devil]",
        Tone::Serendipity => "陣内[serendipity]",
        Tone::Action => "陣内[action]",
        Tone::CrossAnalysis => "陣内[cross]",
        Tone::Normal => "陣内",
        Tone::User => "you",
    };
    println!("{label}> {}", message.text());
    for evidence in message.evidence() {
        println!("    『{}』 {}", evidence.book_title, evidence.insight);
    }
}

fn absolute(path: &Path) -> CliResult<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

fn now_ms() -> i64 {
    arena_core::model::now_epoch_ms()
}
