//! ledger CLI: personal reading tracker.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use miette::Result;

use book_ledger::auth::Session;
use book_ledger::config::{ADMIN_PASS_ENV, LedgerConfig};
use book_ledger::error::LedgerResult;
use book_ledger::library::model::{BookDraft, BookRecord, ReadingStatus, coerce_progress_str, now};
use book_ledger::library::normalize::split_tags;
use book_ledger::library::{
    BookCatalog, BookFilter, BookForm, BookStore, CoverStore, CoverUpload, LibraryError, Overview,
    QuickEdit, RecommendationJournal, currently_reading,
};
use book_ledger::llm::ChatClient;
use book_ledger::paths::LedgerPaths;
use book_ledger::recommend::{self, PromptRequest, Recommendation, SEED_LIMIT, seed_lines};

/// Environment variable read when --password is not given.
const PASSWORD_ENV: &str = "LEDGER_PASSWORD";

#[derive(Parser)]
#[command(name = "ledger", version, about = "Personal reading tracker with LLM recommendations")]
struct Cli {
    /// Data directory holding the collection, covers and journal.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Config file path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Admin password; enables write commands for this invocation.
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and a default config file.
    Init,

    /// Add a new book.
    Add {
        #[command(flatten)]
        book: BookArgs,

        /// Cover image (jpg/png) to attach.
        #[arg(long)]
        cover: Option<PathBuf>,
    },

    /// Update an existing book. Only the given fields change.
    Update {
        /// Book ID.
        id: String,

        #[command(flatten)]
        book: BookArgs,

        /// Replace the cover with this image (jpg/png).
        #[arg(long, conflicts_with = "remove_cover")]
        cover: Option<PathBuf>,

        /// Remove the current cover.
        #[arg(long)]
        remove_cover: bool,
    },

    /// Add books from a JSON array of book objects.
    Import {
        /// JSON file to read.
        file: PathBuf,
    },

    /// Set reading progress in percent. 100 marks the book read.
    Progress {
        /// Book ID.
        id: String,
        /// Percent read; non-numeric input counts as 0.
        percent: String,
    },

    /// Quick edit of favorite, status, rating and tags.
    Edit {
        /// Book ID.
        id: String,

        #[arg(long)]
        favorite: Option<bool>,

        #[arg(long)]
        status: Option<ReadingStatus>,

        /// Rating 1-10.
        #[arg(long, value_parser = clap::value_parser!(i64).range(1..=10), conflicts_with = "clear_rating")]
        rating: Option<i64>,

        /// Remove the rating.
        #[arg(long)]
        clear_rating: bool,

        /// Comma-separated tags, replacing the current ones.
        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete a book and its cover.
    Delete {
        /// Book ID.
        id: String,
    },

    /// List books, optionally filtered.
    List {
        /// Case-insensitive search over title and author.
        #[arg(long, short)]
        query: Option<String>,

        /// Comma-separated tags; a book must carry all of them.
        #[arg(long)]
        tags: Option<String>,

        /// Only favorites.
        #[arg(long)]
        favorites: bool,

        #[arg(long)]
        status: Option<ReadingStatus>,
    },

    /// Show one book in full.
    Show {
        /// Book ID.
        id: String,
    },

    /// Books currently being read, with progress bars.
    Reading,

    /// Totals per status.
    Stats,

    /// Ask the LLM for recommendations based on read books.
    Recommend {
        /// Number of recommendations (5-15).
        #[arg(long, value_parser = clap::value_parser!(u8).range(5..=15))]
        count: Option<u8>,

        /// Comma-separated tags to prioritize.
        #[arg(long, default_value = "")]
        focus_tags: String,

        /// Draw on all read books, not only favorites.
        #[arg(long)]
        all_read: bool,

        /// Append the result to the recommendations journal (admin only).
        #[arg(long)]
        save: bool,
    },
}

/// Book fields shared by `add` and `update`.
#[derive(Args)]
struct BookArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    author: Option<String>,

    #[arg(long)]
    status: Option<ReadingStatus>,

    /// Percent read; non-numeric input counts as 0.
    #[arg(long)]
    progress: Option<String>,

    #[arg(long)]
    favorite: Option<bool>,

    /// Rating 1-10.
    #[arg(long, value_parser = clap::value_parser!(i64).range(1..=10))]
    rating: Option<i64>,

    /// Comma-separated tags.
    #[arg(long)]
    tags: Option<String>,

    #[arg(long)]
    notes: Option<String>,
}

impl BookArgs {
    fn into_draft(self) -> BookDraft {
        BookDraft {
            title: self.title,
            author: self.author,
            status: self.status,
            progress: self.progress.as_deref().map(coerce_progress_str),
            favorite: self.favorite,
            tags: self.tags.as_deref().map(split_tags),
            rating: self.rating.map(Some),
            notes: self.notes,
            ..Default::default()
        }
    }
}

/// Everything one invocation needs.
struct Context {
    config: LedgerConfig,
    config_path: PathBuf,
    paths: LedgerPaths,
    catalog: BookCatalog,
    session: Session,
}

fn open_context(cli: &Cli) -> LedgerResult<Context> {
    let config_path = LedgerPaths::config_file_or(cli.config.as_deref(), LedgerPaths::resolve)?;
    let config = LedgerConfig::load_or_default(&config_path)?
        .with_admin_override(std::env::var(ADMIN_PASS_ENV).ok());

    let data_dir = LedgerPaths::data_dir_or(
        cli.data_dir.as_deref().or(config.data_dir.as_deref()),
        LedgerPaths::resolve,
    )?;
    let config_dir = config_path
        .parent()
        .map(PathBuf::from)
        .unwrap_or_else(|| data_dir.clone());
    let paths = LedgerPaths::at(&config_dir, &data_dir);

    let catalog = BookCatalog::new(
        BookStore::new(paths.books_file()),
        CoverStore::new(paths.covers_dir()),
    );

    let mut session = Session::viewer();
    let password = cli.password.clone().or_else(|| std::env::var(PASSWORD_ENV).ok());
    if let Some(password) = password
        && let Err(e) = session.login(&config.admin_gate(), &password)
    {
        eprintln!("warning: {e}; continuing in view-only mode");
    }

    Ok(Context {
        config,
        config_path,
        paths,
        catalog,
        session,
    })
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let ctx = open_context(&cli)?;

    match cli.command {
        Commands::Init => {
            ctx.paths.ensure_dirs()?;
            if ctx.config_path.exists() {
                println!("Config already present at {}", ctx.config_path.display());
            } else {
                ctx.config.save(&ctx.config_path)?;
                println!("Wrote default config to {}", ctx.config_path.display());
            }
            println!("Data directory: {}", ctx.paths.data_dir.display());
        }

        Commands::Add { book, cover } => {
            let form = BookForm {
                target: None,
                fields: book.into_draft(),
                cover: cover.as_deref().map(CoverUpload::from_path).transpose()?,
                remove_cover: false,
            };
            let saved = ctx.catalog.save_book(&ctx.session, form)?;
            println!("New book added: {}", saved.record.id);
        }

        Commands::Update {
            id,
            book,
            cover,
            remove_cover,
        } => {
            let form = BookForm {
                target: Some(id),
                fields: book.into_draft(),
                cover: cover.as_deref().map(CoverUpload::from_path).transpose()?,
                remove_cover,
            };
            let saved = ctx.catalog.save_book(&ctx.session, form)?;
            println!("Record updated.");
            print_book(&saved.record);
        }

        Commands::Import { file } => {
            let json = std::fs::read_to_string(&file).map_err(|e| LibraryError::InvalidImport {
                message: format!("read {}: {e}", file.display()),
            })?;
            let imported = ctx.catalog.import_json(&ctx.session, &json)?;
            for book in &imported {
                print_summary(book);
            }
            println!("Imported {} books.", imported.len());
        }

        Commands::Progress { id, percent } => {
            let rec = ctx
                .catalog
                .update_progress(&ctx.session, &id, coerce_progress_str(&percent))?;
            println!("\"{}\" is at {}% [{}]", rec.title, rec.progress, rec.status);
        }

        Commands::Edit {
            id,
            favorite,
            status,
            rating,
            clear_rating,
            tags,
        } => {
            let edit = QuickEdit {
                favorite,
                status,
                rating: if clear_rating { Some(None) } else { rating.map(Some) },
                tags: tags.as_deref().map(split_tags),
            };
            let rec = ctx.catalog.quick_edit(&ctx.session, &id, edit)?;
            println!("Saved.");
            print_book(&rec);
        }

        Commands::Delete { id } => {
            let rec = ctx.catalog.remove(&ctx.session, &id)?;
            println!("Deleted \"{}\" ({})", rec.title, rec.id);
        }

        Commands::List {
            query,
            tags,
            favorites,
            status,
        } => {
            let books = ctx.catalog.books();
            let filter = BookFilter {
                text: query,
                favorites_only: favorites,
                status,
                ..Default::default()
            }
            .with_tag_list(tags.as_deref().unwrap_or_default());

            let hits = filter.apply(&books);
            if hits.is_empty() {
                println!("No results for these filters.");
            } else {
                for book in hits {
                    print_summary(book);
                }
            }
        }

        Commands::Show { id } => {
            let rec = ctx.catalog.get(&id)?;
            print_book(&rec);
        }

        Commands::Reading => {
            let books = ctx.catalog.books();
            let reading = currently_reading(&books);
            if reading.is_empty() {
                println!("No books are marked as 'reading'.");
            }
            for book in reading {
                println!("{} — {}", book.title, book.author);
                println!("  {} {:>3}%  ({})", progress_bar(book.progress), book.progress, book.id);
            }
        }

        Commands::Stats => {
            let overview = Overview::of(&ctx.catalog.books());
            println!("Total:   {}", overview.total);
            println!("Reading: {}", overview.reading);
            println!("Read:    {}", overview.read);
            println!("To read: {}", overview.to_read);
        }

        Commands::Recommend {
            count,
            focus_tags,
            all_read,
            save,
        } => {
            let books = ctx.catalog.books();
            let mut request = ctx.config.prompt_request();
            if let Some(count) = count {
                request.count = count;
            }
            let request = PromptRequest {
                focus_tags,
                favorites_only: !all_read,
                ..request
            };

            let seeds = recommend::read_books(&books);
            if !seeds.is_empty() {
                let total_read = books.iter().filter(|b| b.status == ReadingStatus::Read).count();
                println!("Found {total_read} read books (first {SEED_LIMIT} are used).");
                println!("Seed list:");
                for line in seed_lines(&seeds, request.favorites_only) {
                    println!("{line}");
                }
                println!();
            }

            let client = ChatClient::new(ctx.config.llm.clone());
            if !seeds.is_empty() {
                println!("Asking {} for {} recommendations...", client.model(), request.count());
            }
            match recommend::recommend(&books, &request, &client) {
                Recommendation::NoReadBooks => {
                    println!("Add some books marked as 'read' to get recommendations.");
                }
                Recommendation::Failed { message, .. } => {
                    eprintln!("{message}");
                }
                Recommendation::Generated { text, .. } => {
                    println!("Recommendations\n");
                    println!("{text}");
                    if save {
                        let journal = RecommendationJournal::new(ctx.paths.journal_file());
                        match journal.append(&ctx.session, &text, now()) {
                            Ok(()) => println!("\nRecommendations saved to {}", journal.path().display()),
                            Err(e) => eprintln!("\nNot saved: {e}"),
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

fn starbar(rating: Option<u8>) -> String {
    match rating {
        Some(score) => {
            let score = usize::from(score.min(10));
            format!("{}{}", "★".repeat(score), "☆".repeat(10 - score))
        }
        None => "—".to_string(),
    }
}

fn progress_bar(progress: u8) -> String {
    let filled = usize::from(progress) / 5;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(20 - filled))
}

fn display_tags(book: &BookRecord) -> String {
    if book.tags.is_empty() {
        "—".to_string()
    } else {
        book.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

fn print_summary(book: &BookRecord) {
    let fav = if book.favorite { " ♥" } else { "" };
    println!(
        "{}{fav}  — {}  [{} {}%]  tags: {}  ({})",
        book.title,
        if book.author.is_empty() { "-" } else { book.author.as_str() },
        book.status,
        book.progress,
        display_tags(book),
        book.id
    );
}

fn print_book(book: &BookRecord) {
    println!("{}", book.title);
    println!("  author:   {}", if book.author.is_empty() { "-" } else { book.author.as_str() });
    println!("  status:   {}  |  progress: {}%", book.status, book.progress);
    println!("  favorite: {}", if book.favorite { "yes" } else { "—" });
    println!("  tags:     {}", display_tags(book));
    println!("  rating:   {}", starbar(book.rating));
    match &book.cover_path {
        Some(path) if path.exists() => println!("  cover:    {}", path.display()),
        Some(path) => println!("  cover:    {} (missing)", path.display()),
        None => println!("  cover:    none"),
    }
    if !book.notes.is_empty() {
        println!("  notes:    {}", book.notes);
    }
    println!("  id:       {}", book.id);
    println!("  created:  {}", book.created_at);
    println!("  updated:  {}", book.updated_at);
}
