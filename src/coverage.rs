use chrono::Datelike;
use itertools::Itertools;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    readings::{EntityId, EntityKind},
    Readings,
};

/// Zones with readings, month by month
#[derive(Debug, Default)]
pub struct ZoneCoverage {
    zones: BTreeSet<EntityId>,
    months: BTreeMap<u32, BTreeSet<EntityId>>,
}
impl ZoneCoverage {
    pub fn new(readings: &Readings) -> Self {
        let mut this = Self::default();
        for reading in readings.iter() {
            if let Some(zone) = EntityKind::Zone.of(reading) {
                this.zones.insert(zone.clone());
                this.months
                    .entry(reading.timestamp.month())
                    .or_default()
                    .insert(zone.clone());
            }
        }
        this
    }
    /// Zones with readings in the given month of the year
    pub fn zones_in(&self, month: u32) -> Vec<&EntityId> {
        self.months
            .get(&month)
            .map(|zones| zones.iter().collect())
            .unwrap_or_default()
    }
    /// Zones without readings in the given month of the year
    pub fn missing_in(&self, month: u32) -> Vec<&EntityId> {
        match self.months.get(&month) {
            Some(zones) => self.zones.difference(zones).collect(),
            None => self.zones.iter().collect(),
        }
    }
    /// Months of the year with readings from every zone
    pub fn complete_months(&self) -> Vec<u32> {
        (1..=12)
            .filter(|&month| !self.zones.is_empty() && self.missing_in(month).is_empty())
            .collect()
    }
    pub fn summary(&self) {
        println!("\nAll unique zones: [{}]", self.zones.iter().join(", "));
        for month in 1..=12 {
            let missing = self.missing_in(month);
            if missing.is_empty() {
                println!("\nMonth {month} has data for ALL zones!");
            } else {
                let zones = self.zones_in(month);
                println!("\nMonth {month}:");
                println!("Zones with data: [{}]", zones.iter().join(", "));
                println!("Missing zones: [{}]", missing.iter().join(", "));
                println!(
                    "Total zones with data: {} out of {}",
                    zones.len(),
                    self.zones.len()
                );
            }
        }
    }
}
