//! Terminal front end for the book recommendation service: display
//! formatting, reusable text components, navigation, and one page per screen.

pub mod components;
pub mod format;
pub mod nav;
pub mod pages;
