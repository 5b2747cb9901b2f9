use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{StatusCode, Url};
use thiserror::Error;

use super::model::{parse_collection, CollectionError, Product, WeatherFeatureCollection};
use super::time::{format_instant_for_query, TimeWindow};
use crate::config::Config;

const ACCEPT_GEOJSON: &str = "application/geo+json, application/json";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request failed ({})", .0.as_u16())]
    Status(StatusCode),

    #[error("Invalid GeoJSON response: {0}")]
    InvalidCollection(#[from] CollectionError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid request URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

/// Anything that can produce the advisory collection of one product for a
/// reference instant.
#[async_trait]
pub trait AdvisorySource: Send + Sync + 'static {
    async fn fetch(&self, product: Product, target: DateTime<Utc>) -> Result<WeatherFeatureCollection, FetchError>;
}

// ---------------------------------------------------------------------------
// Aviation Weather Center data API client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct AwcClient {
    client: reqwest::Client,
    api_base: String,
}

impl AwcClient {
    pub fn new(config: &Config) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_GEOJSON));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(AwcClient {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// `{base}/{endpoint}?format=geojson&from=..&to=..` for the default window around `target`.
    pub fn request_url(&self, product: Product, target: DateTime<Utc>) -> Result<Url, FetchError> {
        let url = format!("{}/{}", self.api_base, product.endpoint());
        Url::parse_with_params(&url, query_params(target)).map_err(|e| FetchError::InvalidUrl {
            url,
            reason: e.to_string(),
        })
    }
}

/// Query pairs shaping an upstream request around `target`.
pub fn query_params(target: DateTime<Utc>) -> [(&'static str, String); 3] {
    let window = TimeWindow::around(target);
    [
        ("format", "geojson".to_string()),
        ("from", format_instant_for_query(window.start)),
        ("to", format_instant_for_query(window.end)),
    ]
}

#[async_trait]
impl AdvisorySource for AwcClient {
    async fn fetch(&self, product: Product, target: DateTime<Utc>) -> Result<WeatherFeatureCollection, FetchError> {
        let url = self.request_url(product, target)?;
        log::debug!("GET {url}");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let collection = parse_collection(&body)?;
        log::info!("{product}: received {} advisories", collection.len());
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn request_url_carries_window_and_format() {
        let config = Config {
            api_base: "https://example.test/api/data/".to_string(),
            ..Config::default()
        };
        let client = AwcClient::new(&config).unwrap();
        let target = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();

        let url = client.request_url(Product::AirSigmet, target).unwrap();
        assert_eq!(url.path(), "/api/data/airsigmet");

        let pairs: Vec<(String, String)> = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        assert_eq!(
            pairs,
            vec![
                ("format".to_string(), "geojson".to_string()),
                ("from".to_string(), "2024-01-01T00:00:00.000Z".to_string()),
                ("to".to_string(), "2024-01-02T06:00:00.000Z".to_string()),
            ]
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            FetchError::Status(StatusCode::SERVICE_UNAVAILABLE).to_string(),
            "Request failed (503)"
        );
        let shape = FetchError::from(CollectionError::UnexpectedType(Some("Feature".to_string())));
        assert!(shape.to_string().starts_with("Invalid GeoJSON response"));
    }
}
