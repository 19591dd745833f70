use std::collections::{BTreeMap, HashMap};

use crate::store::BrandedRecord;

/// Cars priced below this many rupees count as "under 10 lakh".
pub const TEN_LAKH: u64 = 1_000_000;

/// Mean price per group, groups in alphabetical order.
pub fn mean_by<F>(records: &[BrandedRecord], key: F) -> Vec<(String, f64)>
where
    F: Fn(&BrandedRecord) -> &str,
{
    let mut groups: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for r in records {
        let entry = groups.entry(key(r)).or_insert((0.0, 0));
        entry.0 += r.price as f64;
        entry.1 += 1;
    }
    groups
        .into_iter()
        .map(|(k, (sum, n))| (k.to_string(), sum / n as f64))
        .collect()
}

/// Row count per group, largest first; ties broken alphabetically.
pub fn count_by<F>(records: &[BrandedRecord], key: F) -> Vec<(String, usize)>
where
    F: Fn(&BrandedRecord) -> &str,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for r in records {
        *counts.entry(key(r)).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}

pub struct Summary {
    pub total: usize,
    pub under_ten_lakh: usize,
    pub avg_price_by_fuel: Vec<(String, f64)>,
    pub top_driven: Vec<(String, u64)>,
    pub owner_distribution: Vec<(String, usize)>,
    pub preview: Vec<BrandedRecord>,
}

impl Summary {
    pub fn from_records(records: &[BrandedRecord]) -> Self {
        let mut by_km: Vec<&BrandedRecord> = records.iter().collect();
        // Stable sort keeps scrape order among equal distances.
        by_km.sort_by(|a, b| b.km_driven.cmp(&a.km_driven));

        Summary {
            total: records.len(),
            under_ten_lakh: records.iter().filter(|r| r.price < TEN_LAKH).count(),
            avg_price_by_fuel: mean_by(records, |r| r.fuel.as_str()),
            top_driven: by_km
                .into_iter()
                .take(5)
                .map(|r| (r.title.clone(), r.km_driven))
                .collect(),
            owner_distribution: count_by(records, |r| r.owner.as_str()),
            preview: records.iter().take(5).cloned().collect(),
        }
    }

    pub fn print(&self) {
        println!("\nData cleaned & saved: {} cars scraped in total.", self.total);
        println!("Cars under 10 lakh: {}", self.under_ten_lakh);

        println!("\n--- Average price by fuel ---");
        for (fuel, avg) in &self.avg_price_by_fuel {
            println!("  {:<12} {:>14.0}", fuel, avg);
        }

        println!("\n--- Top 5 most driven ---");
        for (title, km) in &self.top_driven {
            println!("  {:<40} {:>10}", truncate(title, 40), km);
        }

        println!("\n--- Owner distribution ---");
        for (owner, n) in &self.owner_distribution {
            println!("  {:<14} {:>6}", owner, n);
        }

        println!("\nSample Data Preview:");
        println!(
            "{:<32} | {:>10} | {:>8} | {:<8} | {:<10} | {:<14} | {:>7} | {:<10}",
            "Title", "Price", "KM", "Fuel", "Trans", "Owner", "EMI", "Brand"
        );
        println!("{}", "-".repeat(125));
        for r in &self.preview {
            println!(
                "{:<32} | {:>10} | {:>8} | {:<8} | {:<10} | {:<14} | {:>7} | {:<10}",
                truncate(&r.title, 32),
                r.price,
                r.km_driven,
                r.fuel,
                r.transmission,
                r.owner,
                r.emi,
                r.brand
            );
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max - 3).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(title: &str, price: u64, km: u64, fuel: &str, owner: &str) -> BrandedRecord {
        BrandedRecord {
            title: title.to_string(),
            price,
            km_driven: km,
            fuel: fuel.to_string(),
            transmission: "Manual".to_string(),
            owner: owner.to_string(),
            emi: 0,
            brand: "Other".to_string(),
        }
    }

    fn sample() -> Vec<BrandedRecord> {
        vec![
            rec("A", 500_000, 10_000, "Petrol", "First Owner"),
            rec("B", 1_500_000, 80_000, "Diesel", "Second Owner"),
            rec("C", 700_000, 50_000, "Petrol", "First Owner"),
            rec("D", 2_000_000, 5_000, "Diesel", "Unknown"),
            rec("E", 900_000, 120_000, "Cng", "First Owner"),
            rec("F", 300_000, 60_000, "Petrol", "Second Owner"),
        ]
    }

    #[test]
    fn mean_groups_sorted_by_key() {
        let means = mean_by(&sample(), |r| r.fuel.as_str());
        assert_eq!(
            means,
            vec![
                ("Cng".to_string(), 900_000.0),
                ("Diesel".to_string(), 1_750_000.0),
                ("Petrol".to_string(), 500_000.0),
            ]
        );
    }

    #[test]
    fn counts_largest_first() {
        let counts = count_by(&sample(), |r| r.owner.as_str());
        assert_eq!(counts[0], ("First Owner".to_string(), 3));
        assert_eq!(counts[1], ("Second Owner".to_string(), 2));
        assert_eq!(counts[2], ("Unknown".to_string(), 1));
    }

    #[test]
    fn summary_figures() {
        let s = Summary::from_records(&sample());
        assert_eq!(s.total, 6);
        assert_eq!(s.under_ten_lakh, 4);
        let top: Vec<&str> = s.top_driven.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(top, vec!["E", "B", "F", "C", "A"]);
        assert_eq!(s.preview.len(), 5);
    }

    #[test]
    fn empty_table() {
        let s = Summary::from_records(&[]);
        assert_eq!(s.total, 0);
        assert!(s.avg_price_by_fuel.is_empty());
        assert!(s.top_driven.is_empty());
    }
}
