//! Display formatting for book fields.

const PLACEHOLDER_COVER: &str = "/book-placeholder.jpg";

/// One decimal place, or "No rating" when the book has none.
pub fn format_rating(rating: Option<f64>) -> String {
    match rating {
        Some(r) if r > 0.0 => format!("{r:.1}"),
        _ => "No rating".to_string(),
    }
}

/// Compact count: `950`, `1.2K`, `3.4M`.
pub fn format_count(count: Option<u64>) -> String {
    match count.unwrap_or(0) {
        0 => "0".to_string(),
        n if n >= 1_000_000 => format!("{:.1}M", n as f64 / 1_000_000.0),
        n if n >= 1_000 => format!("{:.1}K", n as f64 / 1_000.0),
        n => n.to_string(),
    }
}

/// Cuts `text` to `max_chars` characters and appends `...` when it was longer.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

pub fn image_url(cover_img: Option<&str>) -> String {
    match cover_img {
        None | Some("") => PLACEHOLDER_COVER.to_string(),
        Some(url) if url.starts_with("http") => url.to_string(),
        Some(name) => format!("/books/{name}"),
    }
}

/// Five-slot star bar with a half star for a fractional part of .5 or more.
pub fn stars(rating: Option<f64>) -> String {
    let rating = match rating {
        Some(r) if r > 0.0 => r.min(5.0),
        _ => return "☆☆☆☆☆".to_string(),
    };
    let full = rating.floor() as usize;
    let half = usize::from(rating.fract() >= 0.5);
    let empty = 5 - full - half;
    format!("{}{}{}", "★".repeat(full), "½".repeat(half), "☆".repeat(empty))
}
