//! Core data models for the dispatch engine.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::geometry::Location;

/// Unique identifier of a delivery order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Priority class of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Urgent delivery; always served ahead of resupply
    Emergency,
    /// Routine restocking
    Resupply,
}

impl Priority {
    /// Sort rank: lower ranks are served first.
    pub fn rank(self) -> u8 {
        match self {
            Priority::Emergency => 0,
            Priority::Resupply => 1,
        }
    }

    pub fn is_emergency(self) -> bool {
        matches!(self, Priority::Emergency)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Emergency => write!(f, "Emergency"),
            Priority::Resupply => write!(f, "Resupply"),
        }
    }
}

/// A named delivery point (usually a hospital or clinic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub north_m: f64,
    pub east_m: f64,
}

impl Site {
    pub fn location(&self) -> Location {
        Location::new(self.north_m, self.east_m)
    }
}

/// A delivery request. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Name of the destination site
    pub site: String,
    pub location: Location,
    pub priority: Priority,
    /// Arrival time in seconds since midnight
    pub time: u32,
}

impl Order {
    pub fn new(
        id: OrderId,
        site: impl Into<String>,
        location: Location,
        priority: Priority,
        time: u32,
    ) -> Self {
        Self {
            id,
            site: site.into(),
            location,
            priority,
            time,
        }
    }

    /// Distance of the straight out-and-back trip from the Nest.
    pub fn solo_round_trip_m(&self) -> f64 {
        2.0 * self.location.distance_from_nest()
    }
}

/// Lookup table of delivery sites by name.
#[derive(Debug, Clone, Default)]
pub struct SiteRegistry {
    sites: HashMap<String, Site>,
}

impl SiteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a site. A later site with the same name replaces the earlier one.
    pub fn insert(&mut self, site: Site) {
        self.sites.insert(site.name.clone(), site);
    }

    pub fn get(&self, name: &str) -> Option<&Site> {
        self.sites.get(name)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    /// Build an order for a named site, denormalizing its location.
    pub fn resolve(
        &self,
        id: OrderId,
        site_name: &str,
        priority: Priority,
        time: u32,
    ) -> Result<Order> {
        let site = self
            .get(site_name)
            .ok_or_else(|| DispatchError::UnknownSite {
                name: site_name.to_string(),
            })?;
        Ok(Order::new(id, &site.name, site.location(), priority, time))
    }
}

impl FromIterator<Site> for SiteRegistry {
    fn from_iter<I: IntoIterator<Item = Site>>(iter: I) -> Self {
        let mut registry = SiteRegistry::new();
        for site in iter {
            registry.insert(site);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> SiteRegistry {
        vec![
            Site {
                name: "Bigobo".to_string(),
                north_m: 3_000.0,
                east_m: 4_000.0,
            },
            Site {
                name: "Gikonko".to_string(),
                north_m: -12_000.0,
                east_m: 0.0,
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_emergency_outranks_resupply() {
        assert!(Priority::Emergency.rank() < Priority::Resupply.rank());
        assert!(Priority::Emergency.is_emergency());
        assert!(!Priority::Resupply.is_emergency());
    }

    #[test]
    fn test_resolve_denormalizes_location() {
        let order = registry()
            .resolve(OrderId(7), "Bigobo", Priority::Resupply, 3_600)
            .unwrap();
        assert_eq!(order.id, OrderId(7));
        assert_eq!(order.site, "Bigobo");
        assert_eq!(order.location, Location::new(3_000.0, 4_000.0));
        assert_eq!(order.solo_round_trip_m(), 10_000.0);
    }

    #[test]
    fn test_resolve_unknown_site() {
        let err = registry()
            .resolve(OrderId(1), "Nowhere", Priority::Emergency, 0)
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownSite { ref name } if name == "Nowhere"));
    }

    #[test]
    fn test_priority_parses_from_plain_names() {
        let p: Priority = serde_json::from_str("\"Emergency\"").unwrap();
        assert_eq!(p, Priority::Emergency);
        assert_eq!(Priority::Resupply.to_string(), "Resupply");
    }
}
