use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use super::price::normalize_price;
use super::{joined_text, stripped_text};
use crate::error::ExtractError;
use crate::listing::{FuelType, Listing, Transmission};
use crate::site;

static CARD: LazyLock<Selector> = LazyLock::new(|| Selector::parse(site::CARD_SELECTOR).unwrap());
static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(site::PRICE_SELECTOR).unwrap());
static IMAGE: LazyLock<Selector> = LazyLock::new(|| Selector::parse(site::IMAGE_SELECTOR).unwrap());
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse(site::LINK_SELECTOR).unwrap());

static KM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d[\d,]*)\s?km").unwrap());

/// Result of scanning one listing index page.
#[derive(Debug, Default)]
pub struct PageScan {
    pub listings: Vec<Listing>,
    pub skipped: Vec<ExtractError>,
}

/// Extract every listing card on a page, in document order.
pub fn parse_listing_page(html: &str, base: &Url) -> PageScan {
    let doc = Html::parse_document(html);
    let mut scan = PageScan::default();

    for card in doc.select(&CARD) {
        match extract_card(card, base) {
            Ok(listing) => scan.listings.push(listing),
            Err(e) => scan.skipped.push(e),
        }
    }
    scan
}

/// Build a `Listing` from one card. Owner and EMI are left for enrichment.
pub fn extract_card(card: ElementRef<'_>, base: &Url) -> Result<Listing, ExtractError> {
    let img = card.select(&IMAGE).next().ok_or(ExtractError::MissingImage)?;
    let title = img
        .value()
        .attr("alt")
        .ok_or(ExtractError::MissingTitle)?
        .trim()
        .to_string();

    let price_el = card.select(&PRICE).next().ok_or(ExtractError::MissingPrice)?;
    let price = normalize_price(&stripped_text(price_el));

    let full_text = joined_text(card).to_lowercase();

    let detail_url = card
        .select(&LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| base.join(href).ok())
        .map(|u| u.to_string())
        .unwrap_or_default();

    Ok(Listing {
        title,
        price,
        distance_driven: distance_driven(&full_text),
        fuel: FuelType::classify(&full_text),
        transmission: Transmission::classify(&full_text),
        detail_url,
        owner: None,
        emi: None,
    })
}

/// First "<digits> km" run in the text, separators removed. Empty if none.
fn distance_driven(lowered: &str) -> String {
    KM_RE
        .captures(lowered)
        .map(|c| c[1].replace(',', ""))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(site::BASE_URL).unwrap()
    }

    fn scan_fixture(name: &str) -> PageScan {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap();
        parse_listing_page(&html, &base())
    }

    #[test]
    fn single_card_scenario() {
        let html = r#"
            <div class="NewUcExCard">
              <a href="/used-car-details/used-tata-nexon-cars_123.htm">
                <img src="x.jpg" alt=" Tata Nexon XZ Plus ">
              </a>
              <div class="Price"><p>₹5.25 Lakh</p></div>
              <ul><li>45,230 km</li><li>Diesel</li><li>Manual</li></ul>
            </div>"#;
        let scan = parse_listing_page(html, &base());
        assert!(scan.skipped.is_empty());
        assert_eq!(scan.listings.len(), 1);

        let l = &scan.listings[0];
        assert_eq!(l.title, "Tata Nexon XZ Plus");
        assert_eq!(l.price, "₹525,000");
        assert_eq!(l.distance_driven, "45230");
        assert_eq!(l.fuel, FuelType::Diesel);
        assert_eq!(l.transmission, Transmission::Manual);
        assert_eq!(
            l.detail_url,
            "https://www.cardekho.com/used-car-details/used-tata-nexon-cars_123.htm"
        );
        assert_eq!(l.owner, None);
        assert_eq!(l.emi, None);
    }

    #[test]
    fn card_without_price_is_skipped() {
        let scan = scan_fixture("listing_page");
        assert_eq!(scan.listings.len(), 3);
        assert_eq!(scan.skipped, vec![ExtractError::MissingPrice]);
    }

    #[test]
    fn fixture_preserves_document_order() {
        let scan = scan_fixture("listing_page");
        let titles: Vec<&str> = scan.listings.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Maruti Suzuki Swift VXI",
                "Hyundai Creta 1.6 SX Automatic",
                "Tata Tiago iCNG XZ"
            ]
        );
    }

    #[test]
    fn fixture_fields() {
        let scan = scan_fixture("listing_page");
        let creta = &scan.listings[1];
        assert_eq!(creta.price, "₹1,250,000");
        assert_eq!(creta.fuel, FuelType::Petrol);
        assert_eq!(creta.transmission, Transmission::Automatic);
        assert_eq!(creta.distance_driven, "61000");

        let tiago = &scan.listings[2];
        assert_eq!(tiago.fuel, FuelType::Cng);
        assert_eq!(tiago.transmission, Transmission::Unknown);
        assert_eq!(tiago.distance_driven, "");
        assert_eq!(tiago.detail_url, "");
    }

    #[test]
    fn absolute_links_are_kept() {
        let html = r#"<div class="NewUcExCard">
              <a href="https://other.example/car/1"><img alt="Kia Seltos"></a>
              <span class="Price">₹11 Lakh</span></div>"#;
        let scan = parse_listing_page(html, &base());
        assert_eq!(scan.listings[0].detail_url, "https://other.example/car/1");
    }

    #[test]
    fn missing_alt_is_reported() {
        let html = r#"<div class="NewUcExCard"><img src="a.jpg"><span class="Price">1</span></div>"#;
        let scan = parse_listing_page(html, &base());
        assert!(scan.listings.is_empty());
        assert_eq!(scan.skipped, vec![ExtractError::MissingTitle]);
    }

    #[test]
    fn page_without_cards_is_empty() {
        let scan = parse_listing_page("<html><body><p>No results</p></body></html>", &base());
        assert!(scan.listings.is_empty());
        assert!(scan.skipped.is_empty());
    }
}
