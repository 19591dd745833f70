//! Source-site contract: host, URL layout and CSS selectors.
//!
//! Everything here mirrors the current CarDekho markup and is expected to
//! drift. Extraction code only refers to these names.

use std::time::Duration;

use reqwest::Url;

pub const BASE_URL: &str = "https://www.cardekho.com";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/115.0 Safari/537.36";

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Width of the detail-page worker pool.
pub const CONCURRENCY: usize = 10;

pub const DEFAULT_CITY: &str = "hyderabad";
pub const DEFAULT_PAGES: u32 = 3;

pub const CARD_SELECTOR: &str = ".NewUcExCard";
pub const PRICE_SELECTOR: &str = ".Price";
pub const IMAGE_SELECTOR: &str = "img";
pub const LINK_SELECTOR: &str = "a[href]";
pub const EMI_SELECTOR: &str = "div.monthly-emi-info div.emi";

/// Listing index URL for one page of a city's used-car results (pages start at 1).
pub fn listing_page_url(base: &Url, city: &str, page: u32) -> String {
    let root = base.as_str().trim_end_matches('/');
    format!("{root}/used-cars+in+{city}-page{page}")
}
