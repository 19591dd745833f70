mod analysis;
mod charts;
mod clean;
mod error;
mod listing;
mod parser;
mod scraper;
mod site;
mod store;

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};

use analysis::Summary;
use listing::Listing;
use store::{BrandedRecord, CleanRecord, OutputPaths, RawRecord};

#[derive(Parser)]
#[command(name = "cardekho_scraper", about = "Used-car listing scraper and cleaner for CarDekho")]
struct Cli {
    /// Defaults to `run`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape + enrich + clean, then print a summary
    Run(ScrapeArgs),
    /// Scrape + enrich only, writing the raw CSV
    Scrape(ScrapeArgs),
    /// Clean an existing raw CSV into the cleaned and branded CSVs
    Clean {
        /// Directory holding the raw CSV; outputs land next to it
        #[arg(short, long, default_value = store::DEFAULT_OUT_DIR)]
        out: PathBuf,
    },
    /// Print the analyst summary for a branded CSV
    Summary {
        #[arg(short, long, default_value = store::DEFAULT_BRANDED_PATH)]
        input: PathBuf,
    },
    /// Render the six summary charts from a branded CSV
    Charts {
        #[arg(short, long, default_value = store::DEFAULT_BRANDED_PATH)]
        input: PathBuf,
        #[arg(long, default_value = store::DEFAULT_CHART_DIR)]
        out_dir: PathBuf,
    },
}

#[derive(Args, Clone)]
struct ScrapeArgs {
    /// Number of listing pages to walk
    #[arg(short = 'n', long, default_value_t = site::DEFAULT_PAGES)]
    pages: u32,
    /// City segment of the listing URL
    #[arg(short, long, default_value = site::DEFAULT_CITY)]
    city: String,
    /// Output directory for the CSV files
    #[arg(short, long, default_value = store::DEFAULT_OUT_DIR)]
    out: PathBuf,
}

impl Default for ScrapeArgs {
    fn default() -> Self {
        ScrapeArgs {
            pages: site::DEFAULT_PAGES,
            city: site::DEFAULT_CITY.to_string(),
            out: PathBuf::from(store::DEFAULT_OUT_DIR),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or_else(|| Commands::Run(ScrapeArgs::default())) {
        Commands::Run(args) => {
            let paths = OutputPaths::in_dir(&args.out);
            let listings = scrape(&args).await?;
            let raw = write_raw(&paths, &listings)?;
            let branded = clean_and_save(&paths, &raw)?;
            Summary::from_records(&branded).print();
            Ok(())
        }
        Commands::Scrape(args) => {
            let paths = OutputPaths::in_dir(&args.out);
            let listings = scrape(&args).await?;
            write_raw(&paths, &listings)?;
            Ok(())
        }
        Commands::Clean { out } => {
            let paths = OutputPaths::in_dir(&out);
            let raw: Vec<RawRecord> = store::read_csv(&paths.raw)?;
            println!("Loaded {} raw rows from {}", raw.len(), paths.raw.display());
            let branded = clean_and_save(&paths, &raw)?;
            println!("Cleaned {} rows.", branded.len());
            Ok(())
        }
        Commands::Summary { input } => {
            let branded: Vec<BrandedRecord> = store::read_csv(&input)?;
            Summary::from_records(&branded).print();
            Ok(())
        }
        Commands::Charts { input, out_dir } => {
            let branded: Vec<BrandedRecord> = store::read_csv(&input)?;
            let written = charts::render_all(&branded, &out_dir)?;
            println!("Rendered {} charts into {}", written.len(), out_dir.display());
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Phase 1 (sequential pages) then phase 2 (pooled detail fetches).
async fn scrape(args: &ScrapeArgs) -> anyhow::Result<Vec<Listing>> {
    let client = scraper::build_client()?;
    let base = reqwest::Url::parse(site::BASE_URL)?;

    let t_scrape = Instant::now();
    let listings = scraper::enumerate_listings(&client, &base, &args.city, args.pages).await?;
    println!(
        "Collected {} listings in {:.1}s",
        listings.len(),
        t_scrape.elapsed().as_secs_f64()
    );

    if listings.is_empty() {
        return Ok(listings);
    }
    Ok(scraper::enrich(&client, listings).await)
}

fn write_raw(paths: &OutputPaths, listings: &[Listing]) -> anyhow::Result<Vec<RawRecord>> {
    let raw: Vec<RawRecord> = listings.iter().map(RawRecord::from).collect();
    store::write_csv(&paths.raw, &raw)?;
    println!("Saved {} raw rows to {}", raw.len(), paths.raw.display());
    Ok(raw)
}

fn clean_and_save(paths: &OutputPaths, raw: &[RawRecord]) -> anyhow::Result<Vec<BrandedRecord>> {
    let branded = clean::clean_records(raw);
    let cleaned: Vec<CleanRecord> = branded.iter().map(CleanRecord::from).collect();
    store::write_csv(&paths.cleaned, &cleaned)?;
    store::write_csv(&paths.branded, &branded)?;
    println!(
        "Saved {} and {}",
        display_name(&paths.cleaned),
        display_name(&paths.branded)
    );
    Ok(branded)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
