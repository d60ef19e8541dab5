//! Screens. Each page owns its local state (offsets, filters, tab), asks the
//! `Catalog` for data, and turns the result into a view that can be
//! rendered as text. Pages never fail: every problem ends up in the view.

use std::fmt::Write;

use bookrec_core::config::{DEFAULT_AUTHORS_LIMIT, DEFAULT_PAGE_SIZE, DEFAULT_RECOMMENDATIONS};
use bookrec_core::{
    Book, Catalog, FetchState, FilterOptions, Recommendations, SearchSession, SearchState,
    Transport,
};

use crate::components::{
    book_details, book_grid, error_banner, filter_summary, recommendation_list,
};

pub const HOME_MIN_RATINGS: u64 = 50;
pub const HOME_BOOKS: usize = 6;
pub const TOP_RATED_THRESHOLDS: [u64; 5] = [10, 50, 100, 500, 1000];
pub const TOP_RATED_LIMITS: [usize; 4] = [10, 20, 50, 100];

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

pub struct HomePage;

impl HomePage {
    pub fn render<T: Transport>(catalog: &Catalog<T>) -> String {
        let top = catalog.top_rated(HOME_MIN_RATINGS, HOME_BOOKS);
        let mut out = String::from(
            "Discover Your Next Favorite Book\n\
             Get personalized book recommendations. \
             Browse, search, or start from a book you love.\n\n\
             Top Rated Books (bookrec top-rated to view all)\n\n",
        );
        if let Some(error) = &top.error {
            let _ = writeln!(out, "{}", error_banner(error));
        }
        out.push_str(&book_grid(&top.data, top.loading));
        out
    }
}

// ---------------------------------------------------------------------------
// Browse books
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum BooksMode {
    All,
    Filtered,
    Search(String),
}

#[derive(Debug, Clone, Default)]
pub struct BooksPage {
    pub page: usize,
    pub filters: FilterOptions,
    pub query: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooksView {
    pub mode: BooksMode,
    pub books: FetchState<Vec<Book>>,
    pub genres: Vec<String>,
    pub has_more: bool,
}

impl BooksPage {
    pub fn skip(&self) -> usize {
        self.page * DEFAULT_PAGE_SIZE
    }

    /// A non-blank query wins over filters; filters win over the plain list.
    pub fn mode(&self) -> BooksMode {
        match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => BooksMode::Search(q.to_string()),
            _ if !self.filters.is_empty() => BooksMode::Filtered,
            _ => BooksMode::All,
        }
    }

    pub fn load<T: Transport>(&self, catalog: &Catalog<T>) -> BooksView {
        let mode = self.mode();
        let books = match &mode {
            BooksMode::Search(q) => catalog.search(q, DEFAULT_PAGE_SIZE),
            BooksMode::Filtered => {
                catalog.filtered_books(&self.filters, self.skip(), DEFAULT_PAGE_SIZE)
            }
            BooksMode::All => catalog.books(self.skip(), DEFAULT_PAGE_SIZE),
        };
        let has_more =
            !matches!(mode, BooksMode::Search(_)) && books.data.len() >= DEFAULT_PAGE_SIZE;
        BooksView {
            mode,
            books,
            genres: catalog.genres().data,
            has_more,
        }
    }

    pub fn render(&self, view: &BooksView) -> String {
        let mut out = String::from("Browse Books\n\n");
        if !view.genres.is_empty() {
            let _ = writeln!(out, "Genres: {}", view.genres.join(", "));
        }
        let heading = match &view.mode {
            BooksMode::Search(q) => format!("Search results for \"{q}\""),
            BooksMode::Filtered => format!("Filtered results ({})", filter_summary(&self.filters)),
            BooksMode::All => "All books".to_string(),
        };
        let _ = writeln!(out, "{heading} - page {}\n", self.page + 1);
        if let Some(error) = &view.books.error {
            let _ = writeln!(out, "{}", error_banner(error));
        }
        out.push_str(&book_grid(&view.books.data, view.books.loading));
        if view.has_more {
            let _ = write!(out, "\n\nLoad more: --page {}", self.page + 1);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Book detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    NotFound { id: String },
    Found {
        book: Box<Book>,
        recommendations: FetchState<Recommendations>,
    },
}

pub struct BookDetailPage {
    pub id: String,
}

impl BookDetailPage {
    /// Any failure to load the book, or an absent record, is "not found".
    pub fn load<T: Transport>(&self, catalog: &Catalog<T>) -> DetailView {
        let state = catalog.book(&self.id);
        match state.data {
            Some(book) if state.error.is_none() => DetailView::Found {
                book: Box::new(book),
                recommendations: catalog
                    .recommendations(Some(&self.id), DEFAULT_RECOMMENDATIONS),
            },
            _ => DetailView::NotFound {
                id: self.id.clone(),
            },
        }
    }

    pub fn render(view: &DetailView) -> String {
        match view {
            DetailView::NotFound { id } => format!(
                "Book not found\n\nNo book with id \"{id}\" exists.\nBack to books: bookrec books"
            ),
            DetailView::Found {
                book,
                recommendations,
            } => {
                let mut out = book_details(book);
                let _ = write!(
                    out,
                    "\n\nGet recommendations: bookrec recommend {}\n\nYou Might Also Like\n\n",
                    book.book_id
                );
                if let Some(error) = &recommendations.error {
                    let _ = writeln!(out, "{}", error_banner(error));
                }
                out.push_str(&recommendation_list(
                    &recommendations.data.items,
                    None,
                    recommendations.loading,
                ));
                out
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum SearchTab {
    Search(String),
    Filter(FilterOptions),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Nothing typed and no filters: prompt the user.
    Ready,
    NoResults,
    Results,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchView {
    pub state: SearchState,
    pub outcome: SearchOutcome,
}

pub struct SearchPage {
    pub tab: SearchTab,
}

impl SearchPage {
    pub fn has_input(&self) -> bool {
        match &self.tab {
            SearchTab::Search(q) => !q.trim().is_empty(),
            SearchTab::Filter(filters) => !filters.is_empty(),
        }
    }

    pub async fn load<T: Transport + 'static>(&self, session: &SearchSession<T>) -> SearchView {
        match &self.tab {
            SearchTab::Search(q) => session.set_query(q),
            SearchTab::Filter(filters) => session.filter(filters),
        }
        session.settle().await;
        let state = session.snapshot();
        let outcome = if !state.books.is_empty() {
            SearchOutcome::Results
        } else if state.loading || !self.has_input() {
            SearchOutcome::Ready
        } else {
            SearchOutcome::NoResults
        };
        SearchView { state, outcome }
    }

    pub fn render(&self, view: &SearchView) -> String {
        let mut out = String::from("Find Your Perfect Book\n\n");
        match &self.tab {
            SearchTab::Search(q) => {
                let _ = writeln!(out, "[Search] Filter    query: \"{}\"\n", q.trim());
            }
            SearchTab::Filter(filters) => {
                let _ = writeln!(out, "Search [Filter]    {}\n", filter_summary(filters));
            }
        }
        if let Some(error) = &view.state.error {
            let _ = writeln!(out, "{}\n", error_banner(error));
        }
        match view.outcome {
            SearchOutcome::Ready => out.push_str(
                "Ready to search\nUse a query or apply filters to discover books.",
            ),
            SearchOutcome::NoResults => out.push_str(
                "No books found\nTry adjusting your search terms or filters to find more results.",
            ),
            SearchOutcome::Results => {
                let _ = writeln!(
                    out,
                    "Search Results ({} books found)\n",
                    view.state.books.len()
                );
                out.push_str(&book_grid(&view.state.books, view.state.loading));
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Top rated
// ---------------------------------------------------------------------------

pub struct TopRatedPage {
    pub min_ratings: u64,
    pub limit: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopRatedView {
    pub books: FetchState<Vec<Book>>,
    pub can_load_more: bool,
}

impl Default for TopRatedPage {
    fn default() -> Self {
        Self {
            min_ratings: HOME_MIN_RATINGS,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TopRatedPage {
    pub fn load<T: Transport>(&self, catalog: &Catalog<T>) -> TopRatedView {
        let books = catalog.top_rated(self.min_ratings, self.limit);
        let can_load_more = books.data.len() == self.limit;
        TopRatedView {
            books,
            can_load_more,
        }
    }

    pub fn render(&self, view: &TopRatedView) -> String {
        let mut out = String::from("Top Rated Books\n\nMinimum ratings:");
        for threshold in TOP_RATED_THRESHOLDS {
            if threshold == self.min_ratings {
                let _ = write!(out, " [{threshold}+]");
            } else {
                let _ = write!(out, " {threshold}+");
            }
        }
        out.push_str("\nShow:");
        for limit in TOP_RATED_LIMITS {
            if limit == self.limit {
                let _ = write!(out, " [{limit}]");
            } else {
                let _ = write!(out, " {limit}");
            }
        }
        let _ = writeln!(
            out,
            "\nBooks with {}+ ratings, sorted by rating (showing up to {})\n",
            self.min_ratings, self.limit
        );
        if let Some(error) = &view.books.error {
            let _ = writeln!(out, "{}", error_banner(error));
        }
        out.push_str(&book_grid(&view.books.data, view.books.loading));
        if view.can_load_more {
            let _ = write!(out, "\n\nLoad more: --limit {}", self.limit + DEFAULT_PAGE_SIZE);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum RecommendationsView {
    MissingBook,
    Failed { book_id: String, message: String },
    Loaded(Recommendations),
}

pub struct RecommendationsPage {
    pub book_id: Option<String>,
    pub num: usize,
    /// Skip the freshness window (the Refresh/Retry action).
    pub refresh: bool,
}

impl RecommendationsPage {
    pub fn load<T: Transport>(&self, catalog: &Catalog<T>) -> RecommendationsView {
        let Some(book_id) = self.book_id.as_deref().filter(|id| !id.trim().is_empty()) else {
            return RecommendationsView::MissingBook;
        };
        let state = if self.refresh {
            catalog.refetch_recommendations(Some(book_id), self.num)
        } else {
            catalog.recommendations(Some(book_id), self.num)
        };
        match state.error {
            Some(message) => RecommendationsView::Failed {
                book_id: book_id.to_string(),
                message,
            },
            None => RecommendationsView::Loaded(state.data),
        }
    }

    pub fn render(&self, view: &RecommendationsView) -> String {
        match view {
            RecommendationsView::MissingBook => "No book selected\n\n\
                 Pick a book first to get recommendations.\nBrowse books: bookrec books"
                .to_string(),
            RecommendationsView::Failed { book_id, message } => format!(
                "Failed to load recommendations\n{}\n\n\
                 Retry: bookrec recommend {book_id} --refresh\nBack to books: bookrec books",
                error_banner(message)
            ),
            RecommendationsView::Loaded(recs) => {
                let mut out = String::new();
                if let Some(input) = &recs.input_book {
                    let _ = writeln!(out, "View book details: bookrec book {}", input.book_id);
                }
                if recs.total > 0 {
                    let _ = writeln!(out, "{} recommendations found", recs.total);
                }
                out.push('\n');
                out.push_str(&recommendation_list(
                    &recs.items,
                    recs.input_book.as_ref(),
                    false,
                ));
                if !recs.items.is_empty() {
                    out.push_str("\n\nExplore more books: bookrec books");
                }
                out
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Catalog utilities
// ---------------------------------------------------------------------------

pub fn render_genres<T: Transport>(catalog: &Catalog<T>) -> String {
    render_names("Genres", catalog.genres())
}

pub fn render_authors<T: Transport>(catalog: &Catalog<T>, limit: Option<usize>) -> String {
    render_names("Authors", catalog.authors(limit.unwrap_or(DEFAULT_AUTHORS_LIMIT)))
}

fn render_names(title: &str, state: FetchState<Vec<String>>) -> String {
    if let Some(error) = state.error {
        return error_banner(&error);
    }
    if state.data.is_empty() {
        return format!("{title}: none");
    }
    format!("{title} ({})\n{}", state.data.len(), state.data.join("\n"))
}

pub fn render_stats<T: Transport>(catalog: &Catalog<T>) -> String {
    let state = catalog.stats();
    if let Some(error) = state.error {
        return error_banner(&error);
    }
    let mut out = String::from("Catalog statistics");
    for (name, value) in &state.data.0 {
        let _ = write!(out, "\n  {}: {value}", name.replace('_', " "));
    }
    out
}

pub fn render_health<T: Transport>(catalog: &Catalog<T>) -> String {
    let state = catalog.health();
    match (state.data, state.error) {
        (_, Some(error)) => error_banner(&error),
        (Some(health), None) => format!("Service status: {}", health.status),
        (None, None) => "Service status: unknown".to_string(),
    }
}
