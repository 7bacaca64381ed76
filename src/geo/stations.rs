//! Nearby charging and fuel stations for the fleet map.

use std::fmt::Display;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::geo::{Coordinate, GeoError};
use crate::models::config::StationsConfig;

/// Upper bound on stations returned per lookup.
const MAX_STATIONS: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StationKind {
    Charging,
    Fuel,
}

impl StationKind {
    /// Places API category for this kind.
    pub fn category(self) -> &'static str {
        match self {
            StationKind::Charging => "service.vehicle.charging_station",
            StationKind::Fuel => "service.vehicle.fuel",
        }
    }
}

impl Display for StationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StationKind::Charging => write!(f, "charging"),
            StationKind::Fuel => write!(f, "fuel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: String,
    pub kind: StationKind,
    pub name: String,
    pub address: Option<String>,
    pub coordinate: Coordinate,
}

/// Points-of-interest lookup keyed by coordinate and radius.
#[async_trait]
pub trait StationProvider: Send + Sync {
    async fn nearby(
        &self,
        kind: StationKind,
        center: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<Station>, GeoError>;
}

/// Both lookups of the fleet map, each kept with its own outcome.
#[derive(Debug)]
pub struct FleetStations {
    pub charging: Result<Vec<Station>, GeoError>,
    pub fuel: Result<Vec<Station>, GeoError>,
}

impl FleetStations {
    /// Stations from the lookups that succeeded.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        let charging = self.charging.as_ref().map(|s| s.iter());
        let fuel = self.fuel.as_ref().map(|s| s.iter());
        charging
            .into_iter()
            .flatten()
            .chain(fuel.into_iter().flatten())
    }

    /// Banner text for failed lookups, if any.
    pub fn error_message(&self) -> Option<String> {
        let failures: Vec<String> = [
            (StationKind::Charging, &self.charging),
            (StationKind::Fuel, &self.fuel),
        ]
        .into_iter()
        .filter_map(|(kind, result)| {
            result
                .as_ref()
                .err()
                .map(|err| format!("Could not load {kind} stations: {err}"))
        })
        .collect();
        if failures.is_empty() {
            None
        } else {
            Some(failures.join("\n"))
        }
    }
}

/// Loads charging and fuel stations concurrently.
///
/// Returns once both lookups have completed; a failure of one does not
/// cancel or discard the other.
pub async fn load_fleet_stations<P>(
    provider: &P,
    center: Coordinate,
    radius_meters: u32,
) -> FleetStations
where
    P: StationProvider + ?Sized,
{
    let (charging, fuel) = tokio::join!(
        provider.nearby(StationKind::Charging, center, radius_meters),
        provider.nearby(StationKind::Fuel, center, radius_meters),
    );

    for (kind, result) in [(StationKind::Charging, &charging), (StationKind::Fuel, &fuel)] {
        match result {
            Ok(stations) => log::info!("Loaded {} {kind} stations", stations.len()),
            Err(err) => log::error!("Failed to load {kind} stations: {err}"),
        }
    }

    FleetStations { charging, fuel }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    properties: PlaceProperties,
}

#[derive(Debug, Deserialize)]
struct PlaceProperties {
    place_id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    formatted: Option<String>,
    lat: f64,
    lon: f64,
}

impl PlaceProperties {
    fn into_station(self, kind: StationKind) -> Result<Station, GeoError> {
        let coordinate = Coordinate::new(self.lat, self.lon)?;
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| match kind {
                StationKind::Charging => "Charging station".to_string(),
                StationKind::Fuel => "Fuel station".to_string(),
            });
        Ok(Station {
            id: self.place_id,
            kind,
            name,
            address: self.formatted,
            coordinate,
        })
    }
}

/// Geoapify-style places client.
#[derive(Clone)]
pub struct HttpStationProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpStationProvider {
    pub fn new(config: &StationsConfig, timeout: Duration) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

fn circle_filter(center: Coordinate, radius_meters: u32) -> String {
    format!(
        "circle:{},{},{radius_meters}",
        center.longitude(),
        center.latitude()
    )
}

#[async_trait]
impl StationProvider for HttpStationProvider {
    async fn nearby(
        &self,
        kind: StationKind,
        center: Coordinate,
        radius_meters: u32,
    ) -> Result<Vec<Station>, GeoError> {
        let limit = MAX_STATIONS.to_string();
        let filter = circle_filter(center, radius_meters);
        let response = self
            .client
            .get(format!("{}/v2/places", self.base_url))
            .query(&[
                ("categories", kind.category()),
                ("filter", filter.as_str()),
                ("limit", limit.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status.as_u16()));
        }

        let collection: FeatureCollection = response.json().await?;
        collection
            .features
            .into_iter()
            .map(|feature| feature.properties.into_station(kind))
            .collect()
    }
}
