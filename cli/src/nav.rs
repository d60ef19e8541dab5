//! Navigation items and the icon lookup behind them.

use std::fmt::Write;

/// Icons the navigation can show. Names resolve through `from_name`, an
/// explicit table; unknown names have no icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Home,
    BookOpen,
    Search,
    Star,
    ThumbsUp,
}

impl Icon {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Home" => Some(Icon::Home),
            "BookOpen" => Some(Icon::BookOpen),
            "Search" => Some(Icon::Search),
            "Star" => Some(Icon::Star),
            "ThumbsUp" => Some(Icon::ThumbsUp),
            _ => None,
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Icon::Home => "⌂",
            Icon::BookOpen => "▤",
            Icon::Search => "⌕",
            Icon::Star => "★",
            Icon::ThumbsUp => "✓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavItem {
    pub href: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
}

pub const NAV_ITEMS: [NavItem; 5] = [
    NavItem { href: "/", label: "Home", icon: "Home" },
    NavItem { href: "/books", label: "Browse Books", icon: "BookOpen" },
    NavItem { href: "/books/search", label: "Search", icon: "Search" },
    NavItem { href: "/top-rated", label: "Top Rated", icon: "Star" },
    NavItem { href: "/recommendations", label: "Recommendations", icon: "ThumbsUp" },
];

pub const APP_NAME: &str = "BookRec";

/// One-line navigation bar with the entry for `active_href` bracketed.
pub fn render_nav(active_href: &str) -> String {
    let mut out = format!("{APP_NAME} |");
    for item in NAV_ITEMS {
        let glyph = Icon::from_name(item.icon).map_or("", Icon::glyph);
        if item.href == active_href {
            let _ = write!(out, " [{glyph} {}]", item.label);
        } else {
            let _ = write!(out, "  {glyph} {} ", item.label);
        }
    }
    out
}
