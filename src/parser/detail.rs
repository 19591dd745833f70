use std::sync::LazyLock;

use scraper::{Html, Selector};

use super::stripped_text;
use crate::listing::{DetailFields, OwnerHistory};
use crate::site;

static EMI: LazyLock<Selector> = LazyLock::new(|| Selector::parse(site::EMI_SELECTOR).unwrap());

/// Owner history and EMI text from a detail page. Either may be absent.
pub fn parse_detail_page(html: &str) -> DetailFields {
    let doc = Html::parse_document(html);

    // Newline-joined so no phrase can straddle two text nodes.
    // Phrase order decides, not position in the page.
    let lowered = doc.root_element().text().collect::<Vec<_>>().join("\n").to_lowercase();
    let owner = OwnerHistory::classify(&lowered);

    let emi = doc
        .select(&EMI)
        .next()
        .map(stripped_text)
        .filter(|t| !t.is_empty());

    DetailFields { owner, emi }
}
