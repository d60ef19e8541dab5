use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use bookrec::nav::render_nav;
use bookrec::pages::{
    render_authors, render_genres, render_health, render_stats, BookDetailPage, BooksPage,
    HomePage, RecommendationsPage, SearchPage, SearchTab, TopRatedPage,
};
use bookrec_core::config::DEFAULT_RECOMMENDATIONS;
use bookrec_core::{BookApi, Catalog, Config, FilterOptions, SearchSession};
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse books and get recommendations")]
struct Cli {
    /// Backend base URL. Falls back to BOOKREC_API_URL, then http://localhost:8000.
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Landing page with a top-rated preview.
    Home,
    /// Browse the catalog page by page, optionally searched or filtered.
    Books {
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long)]
        query: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// One book with similar titles.
    Book { id: String },
    /// Free-text search, or filter search when no query is given.
    Search {
        query: Option<String>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    TopRated {
        #[arg(long, default_value_t = 50)]
        min_ratings: u64,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Recommendations for a book.
    Recommend {
        book_id: Option<String>,
        #[arg(long, default_value_t = DEFAULT_RECOMMENDATIONS)]
        num: usize,
        /// Bypass cached results.
        #[arg(long)]
        refresh: bool,
    },
    Genres,
    Authors {
        #[arg(long)]
        limit: Option<usize>,
    },
    Stats,
    Health,
    /// Print the navigation bar only.
    Nav,
}

#[derive(Args, Debug, Default)]
struct FilterArgs {
    #[arg(long)]
    min_rating: Option<f64>,
    #[arg(long)]
    max_rating: Option<f64>,
    #[arg(long)]
    genre: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    min_ratings_count: Option<u64>,
    #[arg(long)]
    published_year: Option<i32>,
}

impl From<FilterArgs> for FilterOptions {
    fn from(args: FilterArgs) -> Self {
        FilterOptions {
            min_rating: args.min_rating,
            max_rating: args.max_rating,
            genre: args.genre,
            author: args.author,
            min_ratings_count: args.min_ratings_count,
            published_year: args.published_year,
        }
    }
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so page output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match cli.api_url.as_deref() {
        Some(url) => Config::new(url),
        None => Config::from_env(),
    }
    .context("invalid backend URL")?;
    debug!(api_url = %config.api_url, "configuration loaded");

    let catalog = Arc::new(Catalog::new(BookApi::from_config(&config)));

    let (active, body) = match cli.command {
        Command::Home => ("/", HomePage::render(&*catalog)),
        Command::Books {
            page,
            query,
            filters,
        } => {
            let page = BooksPage {
                page,
                filters: filters.into(),
                query,
            };
            let view = page.load(&*catalog);
            ("/books", page.render(&view))
        }
        Command::Book { id } => {
            let view = BookDetailPage { id }.load(&*catalog);
            ("/books", BookDetailPage::render(&view))
        }
        Command::Search { query, filters } => {
            let tab = match query {
                Some(q) => SearchTab::Search(q),
                None => SearchTab::Filter(filters.into()),
            };
            let page = SearchPage { tab };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to start async runtime")?;
            let body = runtime.block_on(async {
                // A single command-line query has nothing to debounce.
                let session =
                    SearchSession::new(Arc::clone(&catalog)).with_debounce(Duration::ZERO);
                let view = page.load(&session).await;
                page.render(&view)
            });
            ("/books/search", body)
        }
        Command::TopRated { min_ratings, limit } => {
            let page = TopRatedPage { min_ratings, limit };
            let view = page.load(&*catalog);
            ("/top-rated", page.render(&view))
        }
        Command::Recommend {
            book_id,
            num,
            refresh,
        } => {
            let page = RecommendationsPage {
                book_id,
                num,
                refresh,
            };
            let view = page.load(&*catalog);
            ("/recommendations", page.render(&view))
        }
        Command::Genres => ("/books", render_genres(&*catalog)),
        Command::Authors { limit } => ("/books", render_authors(&*catalog, limit)),
        Command::Stats => ("/", render_stats(&*catalog)),
        Command::Health => ("/", render_health(&*catalog)),
        Command::Nav => ("/", String::new()),
    };

    println!("{}", render_nav(active));
    if !body.is_empty() {
        println!("\n{body}");
    }
    Ok(())
}
