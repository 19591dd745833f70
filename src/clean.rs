use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;

use crate::parser::price::numeric_price;
use crate::store::{BrandedRecord, RawRecord};

/// Checked in order against the lower-cased title; first hit wins.
pub const BRANDS: &[&str] = &[
    "hyundai",
    "kia",
    "maruti",
    "suzuki",
    "honda",
    "toyota",
    "tata",
    "mahindra",
    "ford",
    "renault",
    "skoda",
    "volkswagen",
    "nissan",
    "mg",
    "jeep",
    "mercedes",
    "bmw",
    "audi",
];

pub const TEXT_PLACEHOLDER: &str = "nil";
pub const UNKNOWN: &str = "Unknown";
pub const OTHER_BRAND: &str = "Other";

static DIGIT_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Clean every row, keeping row order.
pub fn clean_records(raws: &[RawRecord]) -> Vec<BrandedRecord> {
    raws.par_iter().map(clean_record).collect()
}

pub fn clean_record(raw: &RawRecord) -> BrandedRecord {
    let title = raw.title.as_deref();

    BrandedRecord {
        title: fill_text(title.unwrap_or_default().to_string()),
        price: coerce_price(raw.price.as_deref()).unwrap_or(0),
        km_driven: coerce_km(raw.km_driven.as_deref()).unwrap_or(0),
        fuel: fill_text(tidy_category(raw.fuel.as_deref())),
        transmission: fill_text(tidy_category(raw.transmission.as_deref())),
        owner: fill_text(tidy_category(raw.owner.as_deref())),
        emi: coerce_emi(raw.emi.as_deref()).unwrap_or(0),
        // Brand reads the title as scraped, before the "nil" placeholder.
        brand: brand_of(title),
    }
}

pub fn coerce_km(raw: Option<&str>) -> Option<u64> {
    raw?.replace(',', "").trim().parse().ok()
}

pub fn coerce_price(raw: Option<&str>) -> Option<u64> {
    numeric_price(raw?)
}

/// "₹10,870/month" -> 10870
pub fn coerce_emi(raw: Option<&str>) -> Option<u64> {
    let stripped = raw?.replace('₹', "").replace(',', "");
    DIGIT_RUN.find(&stripped)?.as_str().parse().ok()
}

pub fn tidy_category(raw: Option<&str>) -> String {
    title_case(raw.unwrap_or(UNKNOWN).trim())
}

fn fill_text(s: String) -> String {
    if s.is_empty() {
        TEXT_PLACEHOLDER.to_string()
    } else {
        s
    }
}

/// Upper-case each letter that follows a non-letter, lower-case the rest.
/// "first owner" -> "First Owner", "CNG" -> "Cng".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_letter = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_letter = true;
        } else {
            out.push(c);
            prev_letter = false;
        }
    }
    out
}

pub fn brand_of(title: Option<&str>) -> String {
    let Some(title) = title else {
        return UNKNOWN.to_string();
    };
    let lowered = title.to_lowercase();
    BRANDS
        .iter()
        .find(|b| lowered.contains(*b))
        .map(|b| capitalize(b))
        .unwrap_or_else(|| OTHER_BRAND.to_string())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
