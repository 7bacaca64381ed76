use std::collections::HashMap;

use crate::geo::Coordinate;

/// Pin shown on a map for a client or job.
#[derive(Debug, Clone, PartialEq)]
pub struct MapAnnotation {
    /// Stable key, e.g. `client-3` or `job-12`.
    pub id: String,
    pub coordinate: Coordinate,
    pub title: String,
    pub subtitle: Option<String>,
}

impl MapAnnotation {
    pub fn new(id: impl Into<String>, coordinate: Coordinate, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            coordinate,
            title: title.into(),
            subtitle: None,
        }
    }

    #[must_use]
    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn for_client(client: &crate::domain::client::Client, coordinate: Coordinate) -> Self {
        Self::new(format!("client-{}", client.id), coordinate, client.full_name())
            .subtitle(client.property_address.clone())
    }

    pub fn for_job(job: &crate::domain::job::Job, coordinate: Coordinate) -> Self {
        Self::new(format!("job-{}", job.id), coordinate, job.title.as_str())
            .subtitle(job.property_address.clone())
    }
}

/// Changes needed to bring the pins on screen in line with the desired set.
#[derive(Debug, Default, PartialEq)]
pub struct AnnotationDiff {
    /// Ids of pins to take off the map.
    pub remove: Vec<String>,
    /// Pins to place, in the order they were desired.
    pub add: Vec<MapAnnotation>,
}

impl AnnotationDiff {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Diffs pins by id. A pin whose position or text changed is removed and
/// added again; unchanged pins are left alone.
pub fn reconcile_annotations(
    current: &[MapAnnotation],
    desired: &[MapAnnotation],
) -> AnnotationDiff {
    let wanted: HashMap<&str, &MapAnnotation> =
        desired.iter().map(|a| (a.id.as_str(), a)).collect();
    let shown: HashMap<&str, &MapAnnotation> =
        current.iter().map(|a| (a.id.as_str(), a)).collect();

    let remove = current
        .iter()
        .filter(|a| wanted.get(a.id.as_str()) != Some(a))
        .map(|a| a.id.clone())
        .collect();
    let add = desired
        .iter()
        .filter(|a| shown.get(a.id.as_str()) != Some(a))
        .cloned()
        .collect();

    AnnotationDiff { remove, add }
}

/// Base of the external directions link.
const DIRECTIONS_URL: &str = "https://maps.apple.com/";

/// Link that opens turn-by-turn driving directions to `destination`.
pub fn navigation_url(destination: Coordinate, label: &str) -> String {
    let daddr = format!(
        "{:.6},{:.6}",
        destination.latitude(),
        destination.longitude()
    );
    let mut params = vec![("daddr", daddr), ("dirflg", "d".to_string())];
    let label = label.trim();
    if !label.is_empty() {
        params.push(("q", label.to_string()));
    }
    match reqwest::Url::parse_with_params(DIRECTIONS_URL, &params) {
        Ok(url) => url.into(),
        Err(err) => {
            log::error!("Failed to build directions link: {err}");
            DIRECTIONS_URL.to_string()
        }
    }
}
