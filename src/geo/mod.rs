//! Geocoding and map support: addresses to coordinates, pins, navigation
//! links, nearby stations and the map region sync guard.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod annotation;
pub mod geocoder;
pub mod region;
pub mod stations;

pub use annotation::{AnnotationDiff, MapAnnotation, navigation_url, reconcile_annotations};
pub use geocoder::{Geocoder, HttpGeocoder, resolve_address};
pub use region::{RegionSync, SyncState};
pub use stations::{
    FleetStations, HttpStationProvider, Station, StationKind, StationProvider,
    load_fleet_stations,
};

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned status {0}")]
    Status(u16),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// WGS84 point with latitude in [-90, 90] and longitude in [-180, 180].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::InvalidCoordinate(format!("latitude {latitude}")));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidCoordinate(format!("longitude {longitude}")));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// Visible map area: a center and the latitude/longitude extent around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapRegion {
    pub center: Coordinate,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    /// Span used when zooming onto a single address.
    pub const DEFAULT_SPAN: f64 = 0.01;

    pub fn new(center: Coordinate, latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            center,
            latitude_delta,
            longitude_delta,
        }
    }

    pub fn around(center: Coordinate) -> Self {
        Self::new(center, Self::DEFAULT_SPAN, Self::DEFAULT_SPAN)
    }

    /// Smallest region containing all `points` with a 20% margin.
    pub fn fitting(points: &[Coordinate]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_lat, mut max_lat) = (first.latitude, first.latitude);
        let (mut min_lon, mut max_lon) = (first.longitude, first.longitude);
        for point in &points[1..] {
            min_lat = min_lat.min(point.latitude);
            max_lat = max_lat.max(point.latitude);
            min_lon = min_lon.min(point.longitude);
            max_lon = max_lon.max(point.longitude);
        }
        let center = Coordinate {
            latitude: (min_lat + max_lat) / 2.0,
            longitude: (min_lon + max_lon) / 2.0,
        };
        Some(Self::new(
            center,
            ((max_lat - min_lat) * 1.2).max(Self::DEFAULT_SPAN),
            ((max_lon - min_lon) * 1.2).max(Self::DEFAULT_SPAN),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_bounds_are_checked() {
        assert!(Coordinate::new(45.0, -122.0).is_ok());
        assert!(Coordinate::new(91.0, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn fitting_region_covers_points() {
        let points = [
            Coordinate::new(45.0, -122.0).unwrap(),
            Coordinate::new(45.2, -122.4).unwrap(),
        ];
        let region = MapRegion::fitting(&points).unwrap();
        assert!((region.center.latitude() - 45.1).abs() < 1e-9);
        assert!((region.center.longitude() + 122.2).abs() < 1e-9);
        assert!(region.latitude_delta >= 0.2);
        assert!(MapRegion::fitting(&[]).is_none());
    }
}
