use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::listing::Listing;

pub const RAW_FILE: &str = "cardekho_used_cars_fixed_final.csv";
pub const CLEANED_FILE: &str = "cardekho_used_cars_cleaned.csv";
pub const BRANDED_FILE: &str = "cardekho_used_cars_cleaned_with_brand.csv";

pub const DEFAULT_OUT_DIR: &str = "data";
pub const DEFAULT_BRANDED_PATH: &str = "data/cardekho_used_cars_cleaned_with_brand.csv";
pub const DEFAULT_CHART_DIR: &str = "data/charts";

const BOM: &[u8] = b"\xEF\xBB\xBF";

/// A CSV row type with a fixed column list. The header row is written from
/// this list, so a file with zero rows still names its columns.
pub trait Table: Serialize {
    const HEADERS: &'static [&'static str];
}

const BASE_HEADERS: [&str; 7] = ["Title", "Price", "KM Driven", "Fuel", "Transmission", "Owner", "EMI"];

/// One scraped row as persisted. Empty cells read back as `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Price")]
    pub price: Option<String>,
    #[serde(rename = "KM Driven")]
    pub km_driven: Option<String>,
    #[serde(rename = "Fuel")]
    pub fuel: Option<String>,
    #[serde(rename = "Transmission")]
    pub transmission: Option<String>,
    #[serde(rename = "Owner")]
    pub owner: Option<String>,
    #[serde(rename = "EMI")]
    pub emi: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Price")]
    pub price: u64,
    #[serde(rename = "KM Driven")]
    pub km_driven: u64,
    #[serde(rename = "Fuel")]
    pub fuel: String,
    #[serde(rename = "Transmission")]
    pub transmission: String,
    #[serde(rename = "Owner")]
    pub owner: String,
    #[serde(rename = "EMI")]
    pub emi: u64,
}

/// Cleaned row plus the derived brand; what charts and summaries read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandedRecord {
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Price")]
    pub price: u64,
    #[serde(rename = "KM Driven")]
    pub km_driven: u64,
    #[serde(rename = "Fuel")]
    pub fuel: String,
    #[serde(rename = "Transmission")]
    pub transmission: String,
    #[serde(rename = "Owner")]
    pub owner: String,
    #[serde(rename = "EMI")]
    pub emi: u64,
    #[serde(rename = "Brand")]
    pub brand: String,
}

impl Table for RawRecord {
    const HEADERS: &'static [&'static str] = &BASE_HEADERS;
}

impl Table for CleanRecord {
    const HEADERS: &'static [&'static str] = &BASE_HEADERS;
}

impl Table for BrandedRecord {
    const HEADERS: &'static [&'static str] = &[
        "Title",
        "Price",
        "KM Driven",
        "Fuel",
        "Transmission",
        "Owner",
        "EMI",
        "Brand",
    ];
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_string())
}

impl From<&Listing> for RawRecord {
    fn from(l: &Listing) -> Self {
        RawRecord {
            title: non_empty(&l.title),
            price: non_empty(&l.price),
            km_driven: non_empty(&l.distance_driven),
            fuel: Some(l.fuel.to_string()),
            transmission: Some(l.transmission.to_string()),
            owner: l.owner.map(|o| o.to_string()),
            emi: l.emi.as_deref().and_then(non_empty),
        }
    }
}

impl From<&BrandedRecord> for CleanRecord {
    fn from(r: &BrandedRecord) -> Self {
        CleanRecord {
            title: r.title.clone(),
            price: r.price,
            km_driven: r.km_driven,
            fuel: r.fuel.clone(),
            transmission: r.transmission.clone(),
            owner: r.owner.clone(),
            emi: r.emi,
        }
    }
}

/// Output file paths under one directory.
#[derive(Debug, Clone)]
pub struct OutputPaths {
    pub raw: PathBuf,
    pub cleaned: PathBuf,
    pub branded: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        OutputPaths {
            raw: dir.join(RAW_FILE),
            cleaned: dir.join(CLEANED_FILE),
            branded: dir.join(BRANDED_FILE),
        }
    }
}

/// Write rows with a header, UTF-8 with a BOM so spreadsheet tools keep `₹` intact.
/// The header is written even when `rows` is empty.
pub fn write_csv<T: Table>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    file.write_all(BOM)?;

    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    wtr.write_record(T::HEADERS)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_csv(&text).with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_csv<T: DeserializeOwned>(text: &str) -> Result<Vec<T>> {
    let body = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rdr = csv::Reader::from_reader(body.as_bytes());
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{FuelType, OwnerHistory, Transmission};

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("cardekho_store_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn raw_record_drops_url_and_blanks() {
        let l = Listing {
            title: "Kia Sonet HTX".into(),
            price: "₹950,000".into(),
            distance_driven: String::new(),
            fuel: FuelType::Diesel,
            transmission: Transmission::Automatic,
            detail_url: "https://www.cardekho.com/x".into(),
            owner: Some(OwnerHistory::First),
            emi: Some(String::new()),
        };
        let r = RawRecord::from(&l);
        assert_eq!(r.title.as_deref(), Some("Kia Sonet HTX"));
        assert_eq!(r.km_driven, None);
        assert_eq!(r.fuel.as_deref(), Some("Diesel"));
        assert_eq!(r.owner.as_deref(), Some("First Owner"));
        assert_eq!(r.emi, None);
    }

    #[test]
    fn raw_file_has_bom_header_and_empty_cells() {
        let path = temp_path("raw.csv");
        let rows = vec![RawRecord {
            title: Some("Audi A4".into()),
            price: Some("₹3,500,000".into()),
            ..Default::default()
        }];
        write_csv(&path, &rows).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("Title,Price,KM Driven,Fuel,Transmission,Owner,EMI")
        );
        assert_eq!(lines.next(), Some("Audi A4,\"₹3,500,000\",,,,,"));

        let back: Vec<RawRecord> = read_csv(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn empty_table_still_gets_header() {
        let path = temp_path("empty_raw.csv");
        write_csv(&path, &Vec::<RawRecord>::new()).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(BOM));
        let text = String::from_utf8(bytes[BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "Title,Price,KM Driven,Fuel,Transmission,Owner,EMI\n");

        let back: Vec<RawRecord> = read_csv(&path).unwrap();
        assert!(back.is_empty());

        let branded_path = temp_path("empty_branded.csv");
        write_csv(&branded_path, &Vec::<BrandedRecord>::new()).unwrap();
        let text = fs::read_to_string(&branded_path).unwrap();
        assert!(text.trim_start_matches('\u{feff}').starts_with("Title,Price,KM Driven,"));
        assert!(text.trim_end().ends_with(",EMI,Brand"));
    }

    #[test]
    fn headers_match_serialized_field_names() {
        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(BrandedRecord {
            title: "x".into(),
            price: 1,
            km_driven: 1,
            fuel: "x".into(),
            transmission: "x".into(),
            owner: "x".into(),
            emi: 1,
            brand: "x".into(),
        })
        .unwrap();
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(text.lines().next(), Some(BrandedRecord::HEADERS.join(",").as_str()));

        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(RawRecord::default()).unwrap();
        let text = String::from_utf8(wtr.into_inner().unwrap()).unwrap();
        assert_eq!(text.lines().next(), Some(RawRecord::HEADERS.join(",").as_str()));
    }

    #[test]
    fn branded_reads_back() {
        let path = temp_path("branded.csv");
        let rows = vec![BrandedRecord {
            title: "Maruti Suzuki Swift 2019".into(),
            price: 525000,
            km_driven: 45230,
            fuel: "Petrol".into(),
            transmission: "Manual".into(),
            owner: "First Owner".into(),
            emi: 10870,
            brand: "Maruti".into(),
        }];
        write_csv(&path, &rows).unwrap();
        let back: Vec<BrandedRecord> = read_csv(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn output_paths() {
        let p = OutputPaths::in_dir(Path::new("data"));
        assert_eq!(p.branded, Path::new(DEFAULT_BRANDED_PATH));
    }
}
