use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::geo::{Coordinate, GeoError};
use crate::models::config::GeocoderConfig;

/// Address lookup service.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeoError>;
}

/// Resolves `address` with a single attempt, logging failures.
///
/// Blank addresses and failed lookups both yield `None`; the map then shows
/// its placeholder.
pub async fn resolve_address<G>(geocoder: &G, address: &str) -> Option<Coordinate>
where
    G: Geocoder + ?Sized,
{
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    match geocoder.geocode(address).await {
        Ok(Some(coordinate)) => Some(coordinate),
        Ok(None) => {
            log::warn!("No geocoding result for `{address}`");
            None
        }
        Err(err) => {
            log::warn!("Failed to geocode `{address}`: {err}");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    lat: String,
    lon: String,
}

impl SearchResult {
    fn coordinate(&self) -> Result<Coordinate, GeoError> {
        let latitude = self
            .lat
            .parse::<f64>()
            .map_err(|err| GeoError::Decode(format!("lat `{}`: {err}", self.lat)))?;
        let longitude = self
            .lon
            .parse::<f64>()
            .map_err(|err| GeoError::Decode(format!("lon `{}`: {err}", self.lon)))?;
        Coordinate::new(latitude, longitude)
    }
}

/// Nominatim-compatible geocoder.
#[derive(Clone)]
pub struct HttpGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGeocoder {
    pub fn new(config: &GeocoderConfig, timeout: Duration) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeoError> {
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("format", "jsonv2"), ("limit", "1"), ("q", address)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status.as_u16()));
        }

        let results: Vec<SearchResult> = response.json().await?;
        results.first().map(SearchResult::coordinate).transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    struct FakeGeocoder {
        result: Mutex<Option<Result<Option<Coordinate>, GeoError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeGeocoder {
        fn returning(result: Result<Option<Coordinate>, GeoError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, GeoError> {
            self.calls.lock().unwrap().push(address.to_string());
            self.result.lock().unwrap().take().unwrap_or(Ok(None))
        }
    }

    #[tokio::test]
    async fn resolves_first_result() {
        let point = Coordinate::new(40.7, -74.0).unwrap();
        let geocoder = FakeGeocoder::returning(Ok(Some(point)));

        assert_eq!(resolve_address(&geocoder, " 1 Main St ").await, Some(point));
        assert_eq!(geocoder.calls.lock().unwrap().as_slice(), ["1 Main St"]);
    }

    #[tokio::test]
    async fn failure_degrades_to_none() {
        let geocoder = FakeGeocoder::returning(Err(GeoError::Status(503)));
        assert_eq!(resolve_address(&geocoder, "1 Main St").await, None);
    }

    #[tokio::test]
    async fn blank_address_skips_lookup() {
        let geocoder = FakeGeocoder::returning(Ok(None));
        assert_eq!(resolve_address(&geocoder, "   ").await, None);
        assert!(geocoder.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn search_result_parses_strings() {
        let result = SearchResult {
            lat: "51.5".into(),
            lon: "-0.12".into(),
        };
        let point = result.coordinate().unwrap();
        assert_eq!(point.latitude(), 51.5);

        let bad = SearchResult {
            lat: "north".into(),
            lon: "0".into(),
        };
        assert!(matches!(bad.coordinate(), Err(GeoError::Decode(_))));
    }
}
