use std::sync::LazyLock;

use regex::Regex;

static LAKH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^([\d.]+)\s*lakh").unwrap());
static CRORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^([\d.]+)\s*crore").unwrap());

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;

const NOISE_TOKENS: &[&str] = &["Compare"];

/// Normalize a free-text price ("₹5.25 Lakh", "12,50,000", "1.1 Crore") into
/// `₹` plus a comma-grouped rupee amount. Text that carries no number comes
/// back cleaned but otherwise untouched.
pub fn normalize_price(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let mut cleaned = raw.replace('₹', "").replace('\n', " ");
    for token in NOISE_TOKENS {
        cleaned = cleaned.replace(token, "");
    }
    let cleaned = cleaned.trim();

    let value = scaled(&LAKH_RE, cleaned, LAKH)
        .or_else(|| scaled(&CRORE_RE, cleaned, CRORE))
        .or_else(|| finite(cleaned.replace(',', "").trim().parse::<f64>().ok()?));

    match value {
        Some(v) => format_rupees(v.round() as u64),
        None => cleaned.to_string(),
    }
}

fn scaled(re: &Regex, text: &str, unit: f64) -> Option<f64> {
    let n = re.captures(text)?.get(1)?.as_str().parse::<f64>().ok()?;
    finite(n * unit)
}

// A negative amount is not a price; such text falls through to the passthrough.
fn finite(v: f64) -> Option<f64> {
    (v.is_finite() && v >= 0.0).then_some(v)
}

/// `₹` followed by the amount with 3-digit comma grouping.
pub fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    out.push('₹');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Second-stage extractor: keep ASCII digits only and read them as a number.
pub fn numeric_price(s: &str) -> Option<u64> {
    let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lakh() {
        assert_eq!(normalize_price("₹5.25 Lakh"), "₹525,000");
        assert_eq!(normalize_price("3 lakh"), "₹300,000");
        assert_eq!(normalize_price("₹1.15 Lakh"), "₹115,000");
    }

    #[test]
    fn crore() {
        assert_eq!(normalize_price("₹1.2 Crore"), "₹12,000,000");
        assert_eq!(normalize_price("2CRORE"), "₹20,000,000");
    }

    #[test]
    fn bare_number_with_separators() {
        assert_eq!(normalize_price("₹4,75,000"), "₹475,000");
        assert_eq!(normalize_price("999"), "₹999");
    }

    #[test]
    fn noise_is_stripped() {
        assert_eq!(normalize_price("₹7.5 Lakh\nCompare"), "₹750,000");
    }

    #[test]
    fn passthrough_is_idempotent() {
        let once = normalize_price("  Price on request ");
        assert_eq!(once, "Price on request");
        assert_eq!(normalize_price(&once), once);
        assert_eq!(normalize_price("inf"), "inf");
    }

    #[test]
    fn negative_amounts_pass_through() {
        assert_eq!(normalize_price("-5"), "-5");
        assert_eq!(normalize_price("₹-2,000"), "-2,000");
        assert_eq!(normalize_price("-1.5 Lakh"), "-1.5 Lakh");
    }

    #[test]
    fn normalized_output_is_a_fixed_point() {
        let once = normalize_price("₹5.25 Lakh");
        assert_eq!(normalize_price(&once), once);
    }

    #[test]
    fn empty_stays_empty() {
        assert_eq!(normalize_price(""), "");
    }

    #[test]
    fn grouping() {
        assert_eq!(format_rupees(0), "₹0");
        assert_eq!(format_rupees(100), "₹100");
        assert_eq!(format_rupees(1000), "₹1,000");
        assert_eq!(format_rupees(12345678), "₹12,345,678");
    }

    #[test]
    fn numeric_extraction() {
        assert_eq!(numeric_price("₹525,000"), Some(525000));
        assert_eq!(numeric_price("525000"), Some(525000));
        assert_eq!(numeric_price("Price on request"), None);
        assert_eq!(numeric_price(""), None);
    }
}
