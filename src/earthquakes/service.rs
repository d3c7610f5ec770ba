//! Closest-earthquake search orchestration.

use crate::earthquakes::cache::ResultCache;
use crate::earthquakes::cities::CityStore;
use crate::earthquakes::models::{City, CityError, DateRange, NewCity, SearchOutcome};
use crate::earthquakes::search::closest_outcome;
use crate::earthquakes::usgs::{UsgsClient, UsgsError};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("city {0} not found")]
    CityNotFound(u64),
    #[error("failed to retrieve earthquakes: {0}")]
    Upstream(#[from] UsgsError),
}

/// Ties the city registry, the result cache and the USGS client together.
#[derive(Clone)]
pub struct EarthquakeService {
    cities: CityStore,
    usgs: UsgsClient,
    cache: Option<ResultCache>,
}

impl EarthquakeService {
    pub fn new(cities: CityStore, usgs: UsgsClient, cache: Option<ResultCache>) -> Self {
        Self { cities, usgs, cache }
    }

    pub fn cities(&self) -> &CityStore {
        &self.cities
    }

    pub fn cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    /// Find the earthquake closest to a city within `range`.
    pub async fn search(&self, city_id: u64, range: DateRange) -> Result<SearchOutcome, SearchError> {
        let city = self.cities.get(city_id).ok_or(SearchError::CityNotFound(city_id))?;

        if let Some(outcome) = self.cache.as_ref().and_then(|c| c.get(city_id, range)) {
            tracing::debug!(city_id, start = %range.start, end = %range.end, "Serving search from cache");
            return Ok(outcome);
        }

        let collection = self.usgs.fetch(&range).await?;
        let outcome = closest_outcome(&city, &collection);

        if let Some(cache) = &self.cache {
            cache.insert(city_id, range, outcome.clone());
            // update_city invalidates after writing the store, so either it
            // runs after this insert or the store already shows the change.
            if self.cities.get(city_id).as_ref() != Some(&city) {
                tracing::debug!(city_id, "City changed during search, dropping cached outcome");
                cache.invalidate_city(city_id);
            }
        }

        tracing::info!(
            city = %city.name,
            start = %range.start,
            end = %range.end,
            found = matches!(outcome, SearchOutcome::Found(_)),
            "Search completed"
        );
        Ok(outcome)
    }

    /// Replace a city, dropping cached results computed for its old position.
    pub fn update_city(&self, id: u64, new: NewCity) -> Result<City, CityError> {
        let city = self.cities.update(id, new)?;
        if let Some(cache) = &self.cache {
            cache.invalidate_city(id);
        }
        Ok(city)
    }

    pub fn delete_city(&self, id: u64) -> Result<City, CityError> {
        let city = self.cities.delete(id)?;
        if let Some(cache) = &self.cache {
            cache.invalidate_city(id);
        }
        Ok(city)
    }
}
