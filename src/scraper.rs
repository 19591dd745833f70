use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{Client, Url};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::listing::{DetailFields, Listing};
use crate::parser::card::parse_listing_page;
use crate::parser::detail::parse_detail_page;
use crate::site;

/// Shared HTTP client: browser user agent, per-request timeout.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(site::USER_AGENT)
        .timeout(site::REQUEST_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")
}

/// Fetch listing pages `1..=pages` under `base` one after another and
/// extract every card. Relative card links resolve against `base`.
///
/// Cards that fail extraction are skipped with a warning. A transport error
/// on a whole page aborts the run.
pub async fn enumerate_listings(
    client: &Client,
    base: &Url,
    city: &str,
    pages: u32,
) -> Result<Vec<Listing>> {
    let mut listings = Vec::new();

    for page in 1..=pages {
        let url = site::listing_page_url(base, city, page);
        println!("\nScraping listing page {page}");

        let html = fetch_listing_page(client, &url).await?;
        let scan = parse_listing_page(&html, base);
        println!(
            "Found {} cars on page {page}",
            scan.listings.len() + scan.skipped.len()
        );

        for reason in &scan.skipped {
            warn!(page, "Skipped a car: {}", reason);
        }
        listings.extend(scan.listings);
    }

    info!("Enumerated {} listings across {} pages", listings.len(), pages);
    Ok(listings)
}

async fn fetch_listing_page(client: &Client, url: &str) -> Result<String> {
    let resp = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to fetch listing page {url}"))?;

    let status = resp.status();
    if !status.is_success() {
        warn!(%status, "Listing page {} returned a non-success status", url);
    }

    resp.text()
        .await
        .with_context(|| format!("Failed to read listing page {url}"))
}

/// Owner history and EMI for one listing. Never fails: any problem is logged
/// and yields empty fields. Empty or malformed URLs never touch the network.
pub async fn fetch_detail(client: &Client, url: &str) -> DetailFields {
    if url.is_empty() {
        debug!("No detail url, skipping fetch");
        return DetailFields::default();
    }

    match try_fetch_detail(client, url).await {
        Ok(detail) => detail,
        Err(e) => {
            warn!("Error fetching {}: {}", url, e);
            DetailFields::default()
        }
    }
}

async fn try_fetch_detail(client: &Client, url: &str) -> Result<DetailFields, FetchError> {
    let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl(url.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(url.to_string()));
    }

    let resp = client.get(parsed).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }

    let html = resp.text().await?;
    Ok(parse_detail_page(&html))
}

/// Run `fetch` once per url on a pool of `site::CONCURRENCY` workers.
///
/// Output has the same length and order as `urls`, whatever order the tasks
/// finish in. Returns only after every task has reported.
pub async fn fetch_all_details<F, Fut>(urls: Vec<String>, fetch: F) -> Vec<DetailFields>
where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DetailFields> + Send + 'static,
{
    let total = urls.len();
    let fetch = Arc::new(fetch);
    let semaphore = Arc::new(Semaphore::new(site::CONCURRENCY));

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    // Workers send (index, result); the receive loop is the only writer of `slots`.
    let (tx, mut rx) = tokio::sync::mpsc::channel::<(usize, DetailFields)>(site::CONCURRENCY * 2);

    for (idx, url) in urls.into_iter().enumerate() {
        let fetch = Arc::clone(&fetch);
        let sem = Arc::clone(&semaphore);
        let tx = tx.clone();

        tokio::spawn(async move {
            let Ok(_permit) = sem.acquire().await else {
                return;
            };
            let detail = fetch(url).await;
            let _ = tx.send((idx, detail)).await;
        });
    }

    // Drop our copy of tx so rx closes when all spawned tasks finish
    drop(tx);

    let mut slots: Vec<Option<DetailFields>> = vec![None; total];
    while let Some((idx, detail)) = rx.recv().await {
        slots[idx] = Some(detail);
        pb.inc(1);
    }
    pb.finish_and_clear();

    slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.unwrap_or_else(|| {
                warn!(idx, "Detail task ended without a result, leaving fields empty");
                DetailFields::default()
            })
        })
        .collect()
}

/// Pair `listings[i]` with `details[i]`. Panics if the lengths differ.
pub fn merge_details(mut listings: Vec<Listing>, details: Vec<DetailFields>) -> Vec<Listing> {
    assert_eq!(
        listings.len(),
        details.len(),
        "detail results must line up with listings"
    );
    for (listing, detail) in listings.iter_mut().zip(details) {
        listing.apply_detail(detail);
    }
    listings
}

/// Fetch every listing's detail page concurrently, then merge by position.
pub async fn enrich(client: &Client, listings: Vec<Listing>) -> Vec<Listing> {
    println!("\nFetching Owner & EMI details...");
    let t0 = Instant::now();

    let urls: Vec<String> = listings.iter().map(|l| l.detail_url.clone()).collect();
    let client = client.clone();
    let details = fetch_all_details(urls, move |url| {
        let client = client.clone();
        async move { fetch_detail(&client, &url).await }
    })
    .await;

    let listings = merge_details(listings, details);
    info!(
        "Enriched {} listings ({} with owner, {} with EMI) in {:.1}s",
        listings.len(),
        listings.iter().filter(|l| l.owner.is_some()).count(),
        listings.iter().filter(|l| l.emi.is_some()).count(),
        t0.elapsed().as_secs_f64()
    );
    listings
}
