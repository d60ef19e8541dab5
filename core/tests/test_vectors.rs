//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Comparing parsed values (not raw strings)
//! avoids false negatives from field-ordering differences.

use bookrec_core::{
    ApiError, Book, BookClient, FilterOptions, HttpMethod, HttpRequest, HttpResponse,
    RecommendationResponse,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8000";

fn client() -> BookClient {
    BookClient::new(BASE_URL)
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap()
}

fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    let method = parse_method(expected["method"].as_str().unwrap());
    assert_eq!(req.method, method, "{name}: method");
    let path = format!("{BASE_URL}{}", expected["path"].as_str().unwrap());
    assert_eq!(req.path, path, "{name}: path");

    let expected_query: Vec<(String, String)> = expected["query"]
        .as_array()
        .unwrap()
        .iter()
        .map(|pair| {
            let arr = pair.as_array().unwrap();
            (arr[0].as_str().unwrap().to_string(), arr[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.query, expected_query, "{name}: query");

    if let Some(suffix) = expected.get("url_suffix") {
        assert_eq!(req.url(), format!("{BASE_URL}{}", suffix.as_str().unwrap()), "{name}: url");
    }
}

fn simulated(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn assert_error(name: &str, err: ApiError, expected: &Value) {
    match expected.as_str().unwrap() {
        "NotFound" => assert!(
            matches!(err, ApiError::NotFound),
            "{name}: expected NotFound, got {err:?}"
        ),
        "Http" => assert!(
            matches!(err, ApiError::Http { .. }),
            "{name}: expected Http, got {err:?}"
        ),
        "Deserialization" => assert!(
            matches!(err, ApiError::Deserialization(_)),
            "{name}: expected Deserialization, got {err:?}"
        ),
        other => panic!("{name}: unknown expected_error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Get book
// ---------------------------------------------------------------------------

#[test]
fn get_book_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/get_book.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        let req = c.build_get_book(id);
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_book(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Book = serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[test]
fn filter_books_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/filter_books.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let filters: FilterOptions = serde_json::from_value(case["input"].clone()).unwrap();
        let skip = case["skip"].as_u64().unwrap() as usize;
        let limit = case["limit"].as_u64().unwrap() as usize;

        let req = c.build_filter_books(&filters, skip, limit);
        assert_request(name, &req, &case["expected_request"]);

        let books = c.parse_books(simulated(case)).unwrap();
        let expected: Vec<Book> = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(books, expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn search_books_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/search_books.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let query = case["query"].as_str().unwrap();
        let limit = case["limit"].as_u64().unwrap() as usize;

        let req = c.build_search_books(query, limit);
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_books(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: Vec<Book> =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

#[test]
fn recommendations_test_vectors() {
    let vectors = load(include_str!("../../test-vectors/recommendations.json"));

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();
        let n = case["num_recommendations"].as_u64().unwrap() as usize;

        let req = c.build_recommendations(id, n);
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_recommendations(simulated(case));
        if let Some(expected_error) = case.get("expected_error") {
            assert_error(name, result.unwrap_err(), expected_error);
        } else {
            let expected: RecommendationResponse =
                serde_json::from_value(case["expected_result"].clone()).unwrap();
            assert_eq!(result.unwrap(), expected, "{name}: parsed result");
        }
    }
}
