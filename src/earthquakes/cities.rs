//! In-memory city registry.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::CitySeed;
use crate::earthquakes::models::{City, CityError, NewCity};

/// Thread-safe store of registered cities. Names are unique.
#[derive(Clone)]
pub struct CityStore {
    cities: Arc<DashMap<u64, City>>,
    names: Arc<DashMap<String, u64>>,
    next_id: Arc<AtomicU64>,
}

impl CityStore {
    pub fn new() -> Self {
        Self {
            cities: Arc::new(DashMap::new()),
            names: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Build a store pre-populated from configuration seeds.
    pub fn from_seeds(seeds: &[CitySeed]) -> Result<Self, CityError> {
        let store = Self::new();
        for seed in seeds {
            store.create(NewCity {
                name: seed.name.clone(),
                latitude: seed.latitude,
                longitude: seed.longitude,
            })?;
        }
        tracing::info!(count = store.count(), "Seeded cities");
        Ok(store)
    }

    /// Register a new city.
    pub fn create(&self, new: NewCity) -> Result<City, CityError> {
        new.validate()?;
        let name = new.name.trim().to_string();

        match self.names.entry(name.clone()) {
            Entry::Occupied(_) => Err(CityError::DuplicateName(name)),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let city = City {
                    id,
                    name,
                    latitude: new.latitude,
                    longitude: new.longitude,
                };
                slot.insert(id);
                self.cities.insert(id, city.clone());
                Ok(city)
            }
        }
    }

    pub fn get(&self, id: u64) -> Option<City> {
        self.cities.get(&id).map(|r| r.value().clone())
    }

    /// All cities ordered by id.
    pub fn list(&self) -> Vec<City> {
        let mut cities: Vec<City> = self.cities.iter().map(|r| r.value().clone()).collect();
        cities.sort_by_key(|c| c.id);
        cities
    }

    /// Replace the fields of an existing city.
    pub fn update(&self, id: u64, new: NewCity) -> Result<City, CityError> {
        new.validate()?;
        let name = new.name.trim().to_string();

        // Lock order is names then cities, as in create.
        let name_slot = match self.names.entry(name.clone()) {
            Entry::Occupied(owner) if *owner.get() != id => {
                return Err(CityError::DuplicateName(name));
            }
            slot => slot,
        };
        // A city deleted concurrently stays deleted.
        let Some(mut city) = self.cities.get_mut(&id) else {
            return Err(CityError::NotFound(id));
        };

        let old_name = std::mem::replace(&mut city.name, name);
        city.latitude = new.latitude;
        city.longitude = new.longitude;
        let updated = city.clone();
        drop(city);

        name_slot.or_insert(id);
        if old_name != updated.name {
            self.names.remove(&old_name);
        }
        Ok(updated)
    }

    pub fn delete(&self, id: u64) -> Result<City, CityError> {
        let (_, city) = self.cities.remove(&id).ok_or(CityError::NotFound(id))?;
        self.names.remove(&city.name);
        Ok(city)
    }

    pub fn count(&self) -> usize {
        self.cities.len()
    }
}

impl Default for CityStore {
    fn default() -> Self {
        Self::new()
    }
}
