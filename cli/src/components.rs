//! Text components. Each one is a pure function of its inputs.

use std::fmt::Write;

use bookrec_core::{Book, FilterOptions, InputBook, Recommendation};

use crate::format::{format_count, format_rating, image_url, stars, truncate_text};

const DESCRIPTION_CHARS: usize = 150;
const CARD_GENRES: usize = 3;

pub fn book_card(book: &Book) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", book.title);
    let _ = writeln!(out, "  by {}", book.author);

    if book.rating.is_some() {
        let _ = write!(out, "  {} {}", stars(book.rating), format_rating(book.rating));
        if book.ratings_count.is_some() {
            let _ = write!(out, " ({} ratings)", format_count(book.ratings_count));
        }
        out.push('\n');
    }
    if book.reviews_count.is_some() {
        let _ = writeln!(out, "  {} reviews", format_count(book.reviews_count));
    }
    if let Some(year) = book.published_year() {
        let _ = writeln!(out, "  Published {year}");
    }
    if !book.genres.is_empty() {
        let mut tags: Vec<String> = book
            .genres
            .iter()
            .take(CARD_GENRES)
            .map(|g| format!("[{g}]"))
            .collect();
        if book.genres.len() > CARD_GENRES {
            tags.push(format!("+{}", book.genres.len() - CARD_GENRES));
        }
        let _ = writeln!(out, "  {}", tags.join(" "));
    }
    if let Some(description) = book.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "  {}", truncate_text(description, DESCRIPTION_CHARS));
    }
    let _ = writeln!(out, "  cover: {}", image_url(book.cover_img.as_deref()));
    let _ = write!(out, "  -> /books/{}", book.book_id);
    out
}

/// Full detail block: every field, description untruncated.
pub fn book_details(book: &Book) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", book.title);
    let _ = writeln!(out, "by {}", book.author);
    let _ = writeln!(
        out,
        "{} {} ({} ratings, {} reviews)",
        stars(book.rating),
        format_rating(book.rating),
        format_count(book.ratings_count),
        format_count(book.reviews_count),
    );
    if let Some(year) = book.published_year() {
        let _ = writeln!(out, "Published {year}");
    }
    if !book.genres.is_empty() {
        let _ = writeln!(out, "Genres: {}", book.genres.join(", "));
    }
    if let Some(description) = &book.description {
        let _ = writeln!(out, "\n{description}");
    }
    let _ = write!(out, "\ncover: {}", image_url(book.cover_img.as_deref()));
    out
}

pub fn book_grid(books: &[Book], loading: bool) -> String {
    if loading {
        return "Loading books...".to_string();
    }
    if books.is_empty() {
        return "No books found.".to_string();
    }
    books.iter().map(book_card).collect::<Vec<_>>().join("\n\n")
}

/// Ranked list with match percentages, or an explicit empty state.
pub fn recommendation_list(
    recommendations: &[Recommendation],
    input_book: Option<&InputBook>,
    loading: bool,
) -> String {
    if loading {
        return "Finding recommendations...".to_string();
    }
    let mut out = String::new();
    if let Some(input) = input_book {
        let _ = writeln!(out, "Recommendations for \"{}\"\n", input.title);
    }
    if recommendations.is_empty() {
        out.push_str("No recommendations available for this book yet.");
        return out;
    }
    let items: Vec<String> = recommendations
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            format!(
                "{}. {}\n   {}% match",
                i + 1,
                book_card(&rec.book),
                rec.match_percent()
            )
        })
        .collect();
    out.push_str(&items.join("\n\n"));
    out
}

pub fn filter_summary(filters: &FilterOptions) -> String {
    if filters.is_empty() {
        return "No filters".to_string();
    }
    filters
        .query_pairs()
        .into_iter()
        .map(|(name, value)| format!("{}: {value}", name.replace('_', " ")))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn error_banner(message: &str) -> String {
    format!("Error: {message}")
}
