//! Closest-earthquake selection.

use crate::earthquakes::geo::geodesic_km;
use crate::earthquakes::models::{City, ClosestEarthquake, Feature, FeatureCollection, SearchOutcome};

/// Find the feature nearest to `city` and its distance in kilometres.
///
/// Features without usable coordinates are skipped. On equal distance the
/// earlier feature wins.
pub fn find_closest<'a>(city: &City, collection: &'a FeatureCollection) -> Option<(&'a Feature, f64)> {
    let origin = city.coordinates();
    collection
        .features
        .iter()
        .filter_map(|feature| {
            let position = feature.coordinates()?;
            Some((feature, geodesic_km(origin, position)))
        })
        .fold(None, |best: Option<(&Feature, f64)>, candidate| match best {
            Some(current) if current.1 <= candidate.1 => Some(current),
            _ => Some(candidate),
        })
}

/// Build the search outcome for `city` from a USGS response.
pub fn closest_outcome(city: &City, collection: &FeatureCollection) -> SearchOutcome {
    match find_closest(city, collection) {
        Some((feature, distance_km)) => {
            SearchOutcome::Found(ClosestEarthquake::from_feature(city, feature, distance_km))
        }
        None => SearchOutcome::no_results(),
    }
}
