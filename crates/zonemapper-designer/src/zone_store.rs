//! Zone store keyed by zone id.
//!
//! At most one zone per id; iteration is always ascending by id so that draw
//! order and palette assignment stay stable.

use std::collections::BTreeMap;
use zonemapper_core::Point;

use crate::model::{Zone, ZoneGeometry};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneStore {
    zones: BTreeMap<i64, Zone>,
}

impl ZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the zone for `id`.
    ///
    /// Returns `true` when the stored geometry changed.
    pub fn upsert(&mut self, id: i64, geometry: ZoneGeometry) -> bool {
        match self.zones.get(&id) {
            Some(existing) if existing.geometry == geometry => false,
            _ => {
                self.zones.insert(id, Zone::new(id, geometry));
                true
            }
        }
    }

    /// Removes a zone. Missing ids are a no-op.
    pub fn remove(&mut self, id: i64) -> Option<Zone> {
        self.zones.remove(&id)
    }

    pub fn clear(&mut self) -> usize {
        let count = self.zones.len();
        self.zones.clear();
        count
    }

    pub fn get(&self, id: i64) -> Option<&Zone> {
        self.zones.get(&id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.zones.contains_key(&id)
    }

    /// Zones in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.zones.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Topmost zone containing a world point. Later (higher id) zones are
    /// drawn over earlier ones, so they win.
    pub fn zone_at(&self, point: &Point) -> Option<&Zone> {
        self.zones.values().rev().find(|z| z.contains(point))
    }
}
