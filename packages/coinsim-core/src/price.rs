//! Live USD prices from the CoinCap v3 REST API.

use crate::coins::Coin;
use crate::config::Config;
use crate::Result;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;

/// Default CoinCap v3 endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://rest.coincap.io/v3";

/// Anything that can quote a coin in USD.
pub trait PriceSource {
    fn price_usd(&self, coin: Coin) -> std::result::Result<f64, PriceError>;
}

/// Price lookup failures. None of them are retried.
#[derive(Debug, thiserror::Error)]
pub enum PriceError {
    #[error("Could not connect to the API endpoint ({url}). Please check your network connection, firewall settings, or if the API service is available.")]
    Connect { url: String },

    #[error("The request to {url} timed out. Please try again later.")]
    Timeout { url: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("API request failed for '{coin}' with status code {status}. Check API key, crypto ID, or try again later. Response: {body}")]
    Status {
        coin: String,
        status: StatusCode,
        body: String,
    },

    #[error("Could not decode API response for '{coin}': {message}. Response: {body}")]
    Decode {
        coin: String,
        message: String,
        body: String,
    },

    #[error("No asset found for search term '{coin}'")]
    NotFound { coin: String },

    #[error("API returned no price for '{coin}'")]
    MissingPrice { coin: String },

    #[error("Could not parse price '{value}' for '{coin}'")]
    InvalidPrice { coin: String, value: String },
}

#[derive(Debug, Deserialize)]
struct AssetsResponse {
    data: Vec<Asset>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "priceUsd", default)]
    price_usd: Option<String>,
}

/// Extract the USD price of `coin` from an `/assets?search=` response body.
///
/// Prefers the asset whose id matches the coin exactly and falls back to the
/// first result.
pub fn parse_assets_response(coin: Coin, body: &str) -> std::result::Result<f64, PriceError> {
    let response: AssetsResponse =
        serde_json::from_str(body).map_err(|e| PriceError::Decode {
            coin: coin.id().to_string(),
            message: e.to_string(),
            body: body.to_string(),
        })?;

    let asset = response
        .data
        .iter()
        .find(|a| a.id.as_deref() == Some(coin.id()))
        .or_else(|| response.data.first())
        .ok_or_else(|| PriceError::NotFound {
            coin: coin.id().to_string(),
        })?;

    let raw = asset
        .price_usd
        .as_deref()
        .ok_or_else(|| PriceError::MissingPrice {
            coin: coin.id().to_string(),
        })?;

    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price >= 0.0 => Ok(price),
        _ => Err(PriceError::InvalidPrice {
            coin: coin.id().to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Blocking CoinCap client.
#[derive(Debug, Clone)]
pub struct CoinCapClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl CoinCapClient {
    /// Create a client for `base_url` authenticated with `api_key`.
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PriceError::Request {
                url: base_url.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client,
        })
    }

    /// Build a client from configuration. Fails when no API key is set.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.api_base_url,
            config.api_key()?,
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn assets_url(&self) -> String {
        format!("{}/assets", self.base_url)
    }

    fn transport_error(url: &str, err: reqwest::Error) -> PriceError {
        if err.is_timeout() {
            PriceError::Timeout {
                url: url.to_string(),
            }
        } else if err.is_connect() {
            PriceError::Connect {
                url: url.to_string(),
            }
        } else {
            PriceError::Request {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }
}

impl PriceSource for CoinCapClient {
    fn price_usd(&self, coin: Coin) -> std::result::Result<f64, PriceError> {
        let url = self.assets_url();
        tracing::debug!("Fetching {} price from {}", coin, url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("search", coin.id())])
            .send()
            .map_err(|e| Self::transport_error(&url, e))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Self::transport_error(&url, e))?;

        if status != StatusCode::OK {
            return Err(PriceError::Status {
                coin: coin.id().to_string(),
                status,
                body,
            });
        }

        let price = parse_assets_response(coin, &body)?;
        tracing::debug!("{} price: {}", coin, price);
        Ok(price)
    }
}
