pub mod card;
pub mod detail;
pub mod price;

use scraper::ElementRef;

/// Text nodes trimmed and concatenated without separators.
pub fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

/// Non-empty text nodes trimmed and joined with single spaces.
pub fn joined_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
