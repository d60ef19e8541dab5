use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Book, RecommendationResponse};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn get(uri: &str) -> axum::response::Response {
    app()
        .oneshot(Request::builder().uri(uri).body(String::new()).unwrap())
        .await
        .unwrap()
}

// --- health ---

#[tokio::test]
async fn health_reports_status() {
    let resp = get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

// --- list ---

#[tokio::test]
async fn list_books_paginates() {
    let resp = get("/books?skip=2&limit=3").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let books: Vec<Book> = body_json(resp).await;
    let ids: Vec<_> = books.iter().map(|b| b.book_id.as_str()).collect();
    assert_eq!(ids, ["3", "4", "5"]);
}

#[tokio::test]
async fn list_books_empty_catalog() {
    let resp = app_with(Vec::new())
        .oneshot(Request::builder().uri("/books").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let books: Vec<Book> = body_json(resp).await;
    assert!(books.is_empty());
}

// --- get ---

#[tokio::test]
async fn get_book_found() {
    let resp = get("/books/4").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let book: Book = body_json(resp).await;
    assert_eq!(book.title, "The Hobbit");
}

#[tokio::test]
async fn get_book_not_found() {
    let resp = get("/books/999").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

// --- filter ---

#[tokio::test]
async fn filter_by_genre_and_rating() {
    let resp = get("/books/filter?genre=fantasy&min_rating=4.2").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let books: Vec<Book> = body_json(resp).await;
    let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["The Hobbit", "The Fellowship of the Ring"]);
}

#[tokio::test]
async fn filter_by_author_substring() {
    let resp = get("/books/filter?author=austen").await;
    let books: Vec<Book> = body_json(resp).await;
    assert_eq!(books.len(), 2);
    assert!(books.iter().all(|b| b.author == "Jane Austen"));
}

#[tokio::test]
async fn filter_by_published_year() {
    let resp = get("/books/filter?published_year=1965").await;
    let books: Vec<Book> = body_json(resp).await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].title, "Dune");
}

#[tokio::test]
async fn filter_rejects_malformed_number() {
    let resp = get("/books/filter?min_rating=high").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- top rated ---

#[tokio::test]
async fn top_rated_sorted_by_rating() {
    let resp = get("/books/top-rated?min_ratings=10&limit=3").await;
    let books: Vec<Book> = body_json(resp).await;
    let ratings: Vec<f64> = books.iter().map(|b| b.rating.unwrap()).collect();
    assert_eq!(ratings, [4.39, 4.38, 4.29]);
}

#[tokio::test]
async fn top_rated_respects_min_ratings() {
    let resp = get("/books/top-rated?min_ratings=1000000&limit=100").await;
    let books: Vec<Book> = body_json(resp).await;
    assert!(books.iter().all(|b| b.ratings_count.unwrap() >= 1_000_000));
    assert!(books.iter().all(|b| b.title != "Leaves of Grass"));
}

// --- genres / authors / stats ---

#[tokio::test]
async fn genres_are_sorted_and_unique() {
    let genres: Vec<String> = body_json(get("/books/genres").await).await;
    let mut sorted = genres.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(genres, sorted);
    assert!(genres.contains(&"Poetry".to_string()));
}

#[tokio::test]
async fn authors_are_limited() {
    let authors: Vec<String> = body_json(get("/books/authors?limit=2").await).await;
    assert_eq!(authors.len(), 2);
}

#[tokio::test]
async fn stats_count_catalog() {
    let stats: serde_json::Value = body_json(get("/books/stats").await).await;
    assert_eq!(stats["total_books"], 12);
    assert!(stats["average_rating"].as_f64().unwrap() > 4.0);
}

// --- search ---

#[tokio::test]
async fn search_puts_title_hits_first() {
    let books: Vec<Book> = body_json(get("/search/books?q=dune&limit=20").await).await;
    let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, ["Dune", "Dune Messiah"]);
}

#[tokio::test]
async fn search_matches_author() {
    let books: Vec<Book> = body_json(get("/search/books?q=tolkien").await).await;
    assert_eq!(books.len(), 2);
}

#[tokio::test]
async fn search_requires_query() {
    let resp = get("/search/books").await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- recommendations ---

#[tokio::test]
async fn recommendations_ranked_by_score() {
    let resp = get("/recommendations/1?num_recommendations=3").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: RecommendationResponse = body_json(resp).await;
    assert_eq!(body.input_book.title, "Dune");
    assert_eq!(body.recommendations.len(), 3);
    assert_eq!(body.total_recommendations, 3);
    assert_eq!(body.recommendations[0].book.title, "Dune Messiah");
    assert!(body
        .recommendations
        .windows(2)
        .all(|w| w[0].score >= w[1].score));
    assert!(body.recommendations.iter().all(|r| r.book.book_id != "1"));
}

#[tokio::test]
async fn recommendations_can_be_empty() {
    let body: RecommendationResponse = body_json(get("/recommendations/12").await).await;
    assert!(body.recommendations.is_empty());
    assert_eq!(body.total_recommendations, 0);
}

#[tokio::test]
async fn recommendations_unknown_book() {
    let resp = get("/recommendations/999").await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
