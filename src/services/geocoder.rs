use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::Coordinate;
use crate::services::cache::{CacheKey, CacheManager};

/// Errors that can occur when talking to a geocoding service
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Rate limited by geocoding service")]
    RateLimited,

    #[error("Geocoding service returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Address-to-coordinate lookup
///
/// `Ok(None)` means the service answered but found no match.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError>;
}

/// Resolve an address, leaving the coordinate unset on any failure
///
/// Geocoding is best-effort: a timeout or a service error must never fail
/// the request that triggered it. The record is simply stored without a
/// location, which also keeps it out of proximity notifications.
pub async fn locate_or_unset(geocoder: &dyn Geocoder, address: &str) -> Coordinate {
    match geocoder.geocode(address).await {
        Ok(Some(coordinate)) => coordinate,
        Ok(None) => {
            tracing::debug!("No geocoding match for '{}'", address);
            Coordinate::unset()
        }
        Err(e) => {
            tracing::warn!("Geocoding failed for '{}', leaving location unset: {}", address, e);
            Coordinate::unset()
        }
    }
}

/// Nominatim / OpenStreetMap geocoder
///
/// The public instance allows one request per second and requires an
/// identifying User-Agent. Successful lookups are cached when a
/// [`CacheManager`] is attached.
pub struct NominatimGeocoder {
    base_url: String,
    client: Client,
    cache: Option<Arc<CacheManager>>,
}

impl NominatimGeocoder {
    /// Create a new Nominatim client
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            cache: None,
        })
    }

    pub fn with_cache(mut self, cache: Arc<CacheManager>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn cached(&self, address: &str) -> Option<Coordinate> {
        let cache = self.cache.as_ref()?;
        cache.get::<Coordinate>(&CacheKey::geocode(address)).await.ok()
    }

    async fn remember(&self, address: &str, coordinate: &Coordinate) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(&CacheKey::geocode(address), coordinate).await {
                tracing::warn!("Failed to cache geocode result: {}", e);
            }
        }
    }

    async fn search(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let url = format!(
            "{}/search?q={}&format=jsonv2&limit=1",
            self.base_url,
            urlencoding::encode(address)
        );

        tracing::debug!("Geocoding via: {}", url);

        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }

        if !response.status().is_success() {
            return Err(GeocodeError::ApiError(format!(
                "Search failed: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        parse_search_response(&body)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        if let Some(coordinate) = self.cached(address).await {
            tracing::trace!("Geocode cache hit for '{}'", address);
            return Ok(Some(coordinate));
        }

        let result = self.search(address).await?;
        if let Some(coordinate) = &result {
            self.remember(address, coordinate).await;
        }

        Ok(result)
    }
}

/// Geocoder used when lookups are disabled in configuration
pub struct DisabledGeocoder;

#[async_trait]
impl Geocoder for DisabledGeocoder {
    async fn geocode(&self, _address: &str) -> Result<Option<Coordinate>, GeocodeError> {
        Ok(None)
    }
}

fn parse_degrees(value: &Value, field: &str) -> Result<f64, GeocodeError> {
    value
        .get(field)
        .and_then(|v| match v {
            Value::String(s) => s.parse::<f64>().ok(),
            other => other.as_f64(),
        })
        .ok_or_else(|| GeocodeError::InvalidResponse(format!("Missing {} in search result", field)))
}

/// Parses a Nominatim `jsonv2` search response
fn parse_search_response(body: &Value) -> Result<Option<Coordinate>, GeocodeError> {
    let results = body
        .as_array()
        .ok_or_else(|| GeocodeError::InvalidResponse("Search response is not an array".into()))?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let latitude = parse_degrees(first, "lat")?;
    let longitude = parse_degrees(first, "lon")?;

    Ok(Some(Coordinate::new(latitude, longitude)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geocoder_for(server: &mockito::Server) -> NominatimGeocoder {
        NominatimGeocoder::new(&server.url(), "animal-rescue-tests", Duration::from_secs(5))
            .expect("Failed to build geocoder")
    }

    #[test]
    fn test_parse_search_response() {
        let body = serde_json::json!([{
            "lat": "41.8827",
            "lon": "-87.6278",
            "display_name": "100, North State Street, Chicago, IL, USA"
        }]);
        let coordinate = parse_search_response(&body).unwrap().unwrap();
        assert!((coordinate.latitude.unwrap() - 41.8827).abs() < 1e-4);
        assert!((coordinate.longitude.unwrap() - -87.6278).abs() < 1e-4);
    }

    #[test]
    fn test_parse_empty_and_malformed() {
        assert!(parse_search_response(&serde_json::json!([])).unwrap().is_none());
        assert!(parse_search_response(&serde_json::json!({"error": "x"})).is_err());
        assert!(parse_search_response(&serde_json::json!([{"lat": "1.0"}])).is_err());
    }

    #[tokio::test]
    async fn test_geocode_hits_search_endpoint_and_caches() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::UrlEncoded(
                "q".into(),
                "1 Main St, Springfield, IL 62701".into(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"lat": "39.7817", "lon": "-89.6501"}]"#)
            .expect(1)
            .create_async()
            .await;

        let geocoder =
            geocoder_for(&server).with_cache(Arc::new(CacheManager::in_memory(100, 60)));

        for _ in 0..2 {
            let coordinate = geocoder
                .geocode("1 Main St, Springfield, IL 62701")
                .await
                .unwrap()
                .unwrap();
            assert!((coordinate.latitude.unwrap() - 39.7817).abs() < 1e-4);
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .create_async()
            .await;

        let err = geocoder_for(&server).geocode("anywhere").await.unwrap_err();
        assert!(matches!(err, GeocodeError::RateLimited));
    }

    #[tokio::test]
    async fn test_locate_or_unset_swallows_service_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let coordinate = locate_or_unset(&geocoder_for(&server), "anywhere").await;
        assert_eq!(coordinate, Coordinate::unset());
    }

    #[tokio::test]
    async fn test_locate_or_unset_without_match() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/search")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let coordinate = locate_or_unset(&geocoder_for(&server), "nowhere").await;
        assert!(!coordinate.is_set());
    }

    #[tokio::test]
    async fn test_disabled_geocoder_never_matches() {
        assert!(!locate_or_unset(&DisabledGeocoder, "1 Main St").await.is_set());
    }
}
