use reqwest::StatusCode;
use thiserror::Error;

/// Why a single listing card could not be turned into a `Listing`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("card has no image")]
    MissingImage,
    #[error("card image has no alt text")]
    MissingTitle,
    #[error("card has no price element")]
    MissingPrice,
}

/// Failure fetching a single detail page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid detail url {0:?}")]
    InvalidUrl(String),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
}
