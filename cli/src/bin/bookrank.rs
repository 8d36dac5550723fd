use std::{
    error::Error as StdError,
    fs::File,
    io::{self, BufReader, Write as _},
    path::PathBuf,
};

use bookrank::{BookId, RankingSession, RatingSystem};
use bookrank_cli::{
    config::{config_path, create_default_config, load_config, Config},
    goodreads::{read_entries, Year},
    import::{MatchTier, Resolver},
    openlibrary::{search_books, OpenLibrary, DEFAULT_ENDPOINT, PLACEHOLDER_COVER},
    output::{write_json, write_rankings},
    quiz::{run_quiz, QuizOutcome},
    store::{Collection, Store},
};
use clap::{Parser as _, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, clap::Parser)]
#[clap(version, about)]
struct Opt {
    /// Config file (default: ~/.config/bookrank/config.toml).
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Collection file (default: ~/.local/share/bookrank/collection.json).
    #[clap(long, global = true)]
    store: Option<PathBuf>,
    /// Open Library instance.
    #[clap(long, global = true)]
    endpoint: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write a commented config file.
    Init,
    /// Add the books of a Goodreads library export.
    Import {
        csv: PathBuf,
        /// Only books read in this year.
        #[clap(long, conflicts_with = "all_time")]
        year: Option<Year>,
        /// Every read book, ignoring a configured year.
        #[clap(long)]
        all_time: bool,
    },
    /// Search Open Library.
    Search { query: Vec<String> },
    /// Search Open Library and add a result to the collection.
    Add {
        query: Vec<String>,
        /// Result to add, as numbered by `search`.
        #[clap(long, default_value_t = 1)]
        pick: usize,
    },
    /// Remove a book from the collection.
    Remove { id: String },
    /// Compare books until the ranking settles.
    Rank {
        /// Forget earlier comparisons and start from fresh ratings.
        #[clap(long)]
        restart: bool,
        /// Comparisons per book before the ranking is done.
        #[clap(long)]
        comparisons_per_book: Option<u32>,
    },
    /// Print the ranking.
    Results {
        #[clap(long)]
        json: bool,
        /// Only the best N books.
        #[clap(long)]
        top: Option<usize>,
    },
    /// Delete the collection.
    Reset,
}

struct App {
    config: Config,
    store: Store,
    endpoint: String,
    rating_system: RatingSystem,
}

impl App {
    fn open_library(&self) -> Result<OpenLibrary, Box<dyn StdError>> {
        Ok(OpenLibrary::new(self.endpoint.as_str())?)
    }

    fn import(&self, csv: PathBuf, year: Option<Year>, all_time: bool) -> Result<(), Box<dyn StdError>> {
        let year = if all_time { None } else { year.or_else(|| self.config.year.clone()) };
        let entries = read_entries(BufReader::new(File::open(&csv)?), year.as_ref())?;
        println!(
            "Found {} read books{}",
            entries.len(),
            year.as_ref().map(|y| format!(" for {y}")).unwrap_or_default()
        );

        let search = self.open_library()?;
        let resolver = Resolver::new(&search, self.config.normalizer(), self.rating_system.clone()).placeholder(
            self.config
                .placeholder_cover
                .as_deref()
                .unwrap_or(PLACEHOLDER_COVER),
        );

        let total = entries.len();
        let resolved = resolver.resolve_all(&entries, |done| {
            eprint!("\rLooking up books: {done}/{total}");
        });
        if total > 0 {
            eprintln!();
        }

        let fallbacks = resolved.iter().filter(|r| r.tier == MatchTier::Fallback).count();

        let mut collection = self.store.load()?;
        collection.year_filter = year;
        let added = collection.books.extend(resolved.into_iter().map(|r| r.book));
        self.store.save(&collection)?;

        println!("Added {added} books ({fallbacks} without a reliable match)");
        info!(added, fallbacks, path = %self.store.path().display(), "import finished");
        Ok(())
    }

    fn search(&self, query: &[String]) -> Result<(), Box<dyn StdError>> {
        let books = search_books(&self.open_library()?, &query.join(" "), &self.rating_system)?;
        if books.is_empty() {
            println!("No results");
        }
        for (i, book) in books.iter().enumerate() {
            println!("{:>2}. {} ({}) [{}]", i + 1, book.title, book.authors.join(", "), book.id);
        }
        Ok(())
    }

    fn add(&self, query: &[String], pick: usize) -> Result<(), Box<dyn StdError>> {
        let books = search_books(&self.open_library()?, &query.join(" "), &self.rating_system)?;
        let Some(book) = pick.checked_sub(1).and_then(|i| books.into_iter().nth(i)) else {
            return Err(format!("no search result number {pick}").into());
        };

        let mut collection = self.store.load()?;
        let title = book.title.clone();
        if collection.books.add(book) {
            self.store.save(&collection)?;
            println!("Added {title}");
        } else {
            println!("{title} is already in the collection");
        }
        Ok(())
    }

    fn remove(&self, id: &str) -> Result<(), Box<dyn StdError>> {
        let mut collection = self.store.load()?;
        match collection.books.remove(&BookId::from(id)) {
            Some(book) => {
                self.store.save(&collection)?;
                println!("Removed {}", book.title);
            }
            None => println!("No book with id {id}"),
        }
        Ok(())
    }

    fn rank(&self, restart: bool, comparisons_per_book: Option<u32>) -> Result<(), Box<dyn StdError>> {
        let Collection {
            year_filter,
            books,
            seen,
        } = self.store.load()?;

        let mut policy = self.config.stop_policy();
        if let Some(comparisons_per_book) = comparisons_per_book {
            policy.comparisons_per_book = comparisons_per_book;
        }

        let mut session = RankingSession::new(books, self.rating_system.clone(), policy).with_seen(seen);
        if restart {
            session.reset();
        }

        let save = |session: &RankingSession| {
            self.store.save(&Collection {
                year_filter: year_filter.clone(),
                books: session.library().clone(),
                seen: session.seen().clone(),
            })
        };
        save(&session)?;

        let outcome = run_quiz(&mut session, io::stdin().lock(), io::stdout().lock(), |session| {
            Ok(save(session)?)
        })?;

        match outcome {
            QuizOutcome::Completed => {
                println!();
                println!("Ranking complete after {} comparisons.", session.total_comparisons());
                write_rankings(io::stdout().lock(), &session.top(5))?;
            }
            QuizOutcome::Quit => println!("Progress saved. Run `bookrank rank` to continue."),
        }
        Ok(())
    }

    fn results(&self, json: bool, top: Option<usize>) -> Result<(), Box<dyn StdError>> {
        let collection = self.store.load()?;
        let mut ranked = collection.books.ranked();
        if let Some(top) = top {
            ranked.truncate(top);
        }

        let mut stdout = io::stdout().lock();
        if json {
            write_json(&mut stdout, &ranked)?;
            writeln!(stdout)?;
        } else {
            write_rankings(&mut stdout, &ranked)?;
        }
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn StdError>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let opt = Opt::parse();

    let config_path = match opt.config {
        Some(path) => path,
        None => config_path()?,
    };

    if let Command::Init = opt.command {
        create_default_config(&config_path)?;
        println!("Created {}", config_path.display());
        return Ok(());
    }

    let config = load_config(&config_path)?;
    let app = App {
        store: Store::new(
            opt.store
                .or_else(|| config.store.clone())
                .unwrap_or_else(Store::default_path),
        ),
        endpoint: opt
            .endpoint
            .or_else(|| config.endpoint.clone())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
        rating_system: RatingSystem::new(),
        config,
    };

    match opt.command {
        Command::Init => Ok(()),
        Command::Import { csv, year, all_time } => app.import(csv, year, all_time),
        Command::Search { query } => app.search(&query),
        Command::Add { query, pick } => app.add(&query, pick),
        Command::Remove { id } => app.remove(&id),
        Command::Rank {
            restart,
            comparisons_per_book,
        } => app.rank(restart, comparisons_per_book),
        Command::Results { json, top } => app.results(json, top),
        Command::Reset => {
            app.store.clear()?;
            println!("Cleared {}", app.store.path().display());
            Ok(())
        }
    }
}
