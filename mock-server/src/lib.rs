use std::{collections::BTreeSet, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub book_id: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratings_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,
}

impl Book {
    fn published_year(&self) -> Option<i32> {
        self.published_date.as_deref()?.get(..4)?.parse().ok()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredBook {
    #[serde(flatten)]
    pub book: Book,
    pub score: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputBook {
    pub book_id: String,
    pub title: String,
    pub author: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub input_book: InputBook,
    pub recommendations: Vec<ScoredBook>,
    pub total_recommendations: usize,
}

#[derive(Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Deserialize)]
pub struct FilterParams {
    pub min_rating: Option<f64>,
    pub max_rating: Option<f64>,
    pub genre: Option<String>,
    pub author: Option<String>,
    pub min_ratings_count: Option<u64>,
    pub published_year: Option<i32>,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Deserialize)]
pub struct TopRatedParams {
    #[serde(default = "default_min_ratings")]
    pub min_ratings: u64,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Deserialize)]
pub struct LimitParams {
    #[serde(default = "default_authors_limit")]
    pub limit: usize,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Deserialize)]
pub struct RecommendationParams {
    #[serde(default = "default_recommendations")]
    pub num_recommendations: usize,
}

fn default_limit() -> usize {
    20
}

fn default_min_ratings() -> u64 {
    10
}

fn default_authors_limit() -> usize {
    100
}

fn default_recommendations() -> usize {
    5
}

pub type Db = Arc<Vec<Book>>;

pub fn app() -> Router {
    app_with(seed_books())
}

pub fn app_with(books: Vec<Book>) -> Router {
    let db: Db = Arc::new(books);
    Router::new()
        .route("/health", get(health))
        .route("/books", get(list_books))
        .route("/books/filter", get(filter_books))
        .route("/books/top-rated", get(top_rated))
        .route("/books/genres", get(genres))
        .route("/books/authors", get(authors))
        .route("/books/stats", get(stats))
        .route("/books/{id}", get(get_book))
        .route("/search/books", get(search_books))
        .route("/recommendations/{id}", get(recommendations))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health(State(db): State<Db>) -> Json<Value> {
    Json(json!({ "status": "healthy", "books_loaded": db.len() }))
}

async fn list_books(State(db): State<Db>, Query(page): Query<Page>) -> Json<Vec<Book>> {
    Json(db.iter().skip(page.skip).take(page.limit).cloned().collect())
}

async fn get_book(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Book>, StatusCode> {
    db.iter()
        .find(|b| b.book_id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn filter_books(
    State(db): State<Db>,
    Query(params): Query<FilterParams>,
) -> Json<Vec<Book>> {
    let genre = params.genre.as_deref().map(str::to_lowercase);
    let author = params.author.as_deref().map(str::to_lowercase);
    let books = db
        .iter()
        .filter(|b| match params.min_rating {
            Some(min) => b.rating.is_some_and(|r| r >= min),
            None => true,
        })
        .filter(|b| match params.max_rating {
            Some(max) => b.rating.is_some_and(|r| r <= max),
            None => true,
        })
        .filter(|b| match &genre {
            Some(g) => b.genres.iter().any(|bg| bg.to_lowercase() == *g),
            None => true,
        })
        .filter(|b| match &author {
            Some(a) => b.author.to_lowercase().contains(a.as_str()),
            None => true,
        })
        .filter(|b| match params.min_ratings_count {
            Some(min) => b.ratings_count.unwrap_or(0) >= min,
            None => true,
        })
        .filter(|b| match params.published_year {
            Some(year) => b.published_year() == Some(year),
            None => true,
        })
        .skip(params.skip)
        .take(params.limit)
        .cloned()
        .collect();
    Json(books)
}

async fn top_rated(
    State(db): State<Db>,
    Query(params): Query<TopRatedParams>,
) -> Json<Vec<Book>> {
    let mut books: Vec<Book> = db
        .iter()
        .filter(|b| b.rating.is_some() && b.ratings_count.unwrap_or(0) >= params.min_ratings)
        .cloned()
        .collect();
    books.sort_by(|a, b| b.rating.unwrap_or(0.0).total_cmp(&a.rating.unwrap_or(0.0)));
    books.truncate(params.limit);
    Json(books)
}

async fn genres(State(db): State<Db>) -> Json<Vec<String>> {
    let genres: BTreeSet<&str> = db
        .iter()
        .flat_map(|b| b.genres.iter().map(String::as_str))
        .collect();
    Json(genres.into_iter().map(str::to_string).collect())
}

async fn authors(State(db): State<Db>, Query(params): Query<LimitParams>) -> Json<Vec<String>> {
    let authors: BTreeSet<&str> = db.iter().map(|b| b.author.as_str()).collect();
    Json(
        authors
            .into_iter()
            .take(params.limit)
            .map(str::to_string)
            .collect(),
    )
}

async fn stats(State(db): State<Db>) -> Json<Value> {
    let ratings: Vec<f64> = db.iter().filter_map(|b| b.rating).collect();
    let average = if ratings.is_empty() {
        0.0
    } else {
        ratings.iter().sum::<f64>() / ratings.len() as f64
    };
    let authors: BTreeSet<&str> = db.iter().map(|b| b.author.as_str()).collect();
    let genres: BTreeSet<&str> = db
        .iter()
        .flat_map(|b| b.genres.iter().map(String::as_str))
        .collect();
    Json(json!({
        "total_books": db.len(),
        "total_authors": authors.len(),
        "total_genres": genres.len(),
        "average_rating": (average * 100.0).round() / 100.0,
    }))
}

async fn search_books(
    State(db): State<Db>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Book>> {
    let needle = params.q.trim().to_lowercase();
    if needle.is_empty() {
        return Json(Vec::new());
    }
    let mut title_hits = Vec::new();
    let mut other_hits = Vec::new();
    for book in db.iter() {
        if book.title.to_lowercase().contains(&needle) {
            title_hits.push(book.clone());
        } else if book.author.to_lowercase().contains(&needle)
            || book
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
        {
            other_hits.push(book.clone());
        }
    }
    title_hits.extend(other_hits);
    title_hits.truncate(params.limit);
    Json(title_hits)
}

async fn recommendations(
    State(db): State<Db>,
    Path(id): Path<String>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<RecommendationResponse>, StatusCode> {
    let input = db
        .iter()
        .find(|b| b.book_id == id)
        .ok_or(StatusCode::NOT_FOUND)?;

    let mut scored: Vec<ScoredBook> = db
        .iter()
        .filter(|b| b.book_id != input.book_id)
        .map(|b| ScoredBook {
            score: similarity(input, b),
            book: b.clone(),
        })
        .filter(|s| s.score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(params.num_recommendations);

    Ok(Json(RecommendationResponse {
        input_book: InputBook {
            book_id: input.book_id.clone(),
            title: input.title.clone(),
            author: input.author.clone(),
        },
        total_recommendations: scored.len(),
        recommendations: scored,
    }))
}

/// Genre Jaccard similarity plus a bonus for a shared author, capped at 1.
pub fn similarity(a: &Book, b: &Book) -> f64 {
    let ga: BTreeSet<String> = a.genres.iter().map(|g| g.to_lowercase()).collect();
    let gb: BTreeSet<String> = b.genres.iter().map(|g| g.to_lowercase()).collect();
    let union = ga.union(&gb).count();
    let jaccard = if union == 0 {
        0.0
    } else {
        ga.intersection(&gb).count() as f64 / union as f64
    };
    let author_bonus = if a.author.eq_ignore_ascii_case(&b.author) {
        0.25
    } else {
        0.0
    };
    let score = (jaccard * 0.75 + author_bonus).min(1.0);
    (score * 1000.0).round() / 1000.0
}

/// id, title, author, rating, ratings count, genres, published date, description
type SeedRow = (
    &'static str,
    &'static str,
    &'static str,
    f64,
    u64,
    &'static [&'static str],
    &'static str,
    &'static str,
);

const SEED: [SeedRow; 12] = [
    (
        "1",
        "Dune",
        "Frank Herbert",
        4.27,
        1_180_000,
        &["Science Fiction", "Fiction", "Classics"],
        "1965-08-01",
        "A desert planet, a noble family and the spice that controls the universe.",
    ),
    (
        "2",
        "Dune Messiah",
        "Frank Herbert",
        3.89,
        201_000,
        &["Science Fiction", "Fiction"],
        "1969-10-15",
        "Twelve years after Arrakis, the emperor faces the cost of prophecy.",
    ),
    (
        "3",
        "Hyperion",
        "Dan Simmons",
        4.25,
        230_000,
        &["Science Fiction", "Fiction"],
        "1989-05-26",
        "Seven pilgrims travel to the Time Tombs and tell their stories.",
    ),
    (
        "4",
        "The Hobbit",
        "J.R.R. Tolkien",
        4.28,
        3_600_000,
        &["Fantasy", "Fiction", "Classics"],
        "1937-09-21",
        "Bilbo Baggins is swept into a quest to reclaim a dragon's treasure.",
    ),
    (
        "5",
        "The Fellowship of the Ring",
        "J.R.R. Tolkien",
        4.38,
        2_700_000,
        &["Fantasy", "Fiction", "Classics"],
        "1954-07-29",
        "The first part of the journey to destroy the One Ring.",
    ),
    (
        "6",
        "A Wizard of Earthsea",
        "Ursula K. Le Guin",
        4.01,
        320_000,
        &["Fantasy", "Fiction"],
        "1968-11-01",
        "A young mage must confront the shadow he released.",
    ),
    (
        "7",
        "Pride and Prejudice",
        "Jane Austen",
        4.29,
        4_100_000,
        &["Romance", "Classics", "Fiction"],
        "1813-01-28",
        "Elizabeth Bennet and Mr. Darcy misjudge each other.",
    ),
    (
        "8",
        "Emma",
        "Jane Austen",
        4.03,
        780_000,
        &["Romance", "Classics"],
        "1815-12-23",
        "A matchmaker meddles in the love lives of her neighbours.",
    ),
    (
        "9",
        "The Murder of Roger Ackroyd",
        "Agatha Christie",
        4.27,
        250_000,
        &["Mystery", "Classics"],
        "1926-06-01",
        "Hercule Poirot investigates a death in a quiet village.",
    ),
    (
        "10",
        "Gone Girl",
        "Gillian Flynn",
        4.12,
        3_000_000,
        &["Mystery", "Thriller"],
        "2012-06-05",
        "A wife disappears on her fifth wedding anniversary.",
    ),
    (
        "11",
        "Sapiens",
        "Yuval Noah Harari",
        4.39,
        1_000_000,
        &["History", "Non-Fiction", "Science"],
        "2011-01-01",
        "A brief history of humankind from the Stone Age to today.",
    ),
    (
        "12",
        "Leaves of Grass",
        "Walt Whitman",
        4.12,
        8,
        &["Poetry"],
        "1855-07-04",
        "A lifelong collection of free verse.",
    ),
];

fn seed_book(row: &SeedRow) -> Book {
    let (id, title, author, rating, ratings_count, genres, published, description) = *row;
    Book {
        book_id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        rating: Some(rating),
        ratings_count: Some(ratings_count),
        reviews_count: Some(ratings_count / 10),
        description: Some(description.to_string()),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        cover_img: Some(format!("{id}.jpg")),
        published_date: Some(published.to_string()),
    }
}

/// The fixed catalog served by `app()`.
pub fn seed_books() -> Vec<Book> {
    SEED.iter().map(seed_book).collect()
}
