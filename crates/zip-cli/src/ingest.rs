//! CSV ingestion of hospitals and orders.
//!
//! Both files are headerless with whitespace around fields:
//! - hospitals: `name, north_m, east_m`
//! - orders: `time, hospital, priority`

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use zip_core::{Order, OrderId, Priority, Site, SiteRegistry};

#[derive(Debug, Deserialize)]
struct OrderRow {
    time: u32,
    hospital: String,
    priority: Priority,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(false)
        .trim(Trim::All)
        .from_reader(input)
}

/// Parse a hospitals file into a registry.
pub fn read_sites<R: Read>(input: R) -> Result<SiteRegistry> {
    let mut registry = SiteRegistry::new();
    for (row, record) in reader(input).deserialize::<Site>().enumerate() {
        let site = record.with_context(|| format!("hospitals row {}", row + 1))?;
        anyhow::ensure!(
            site.north_m.is_finite() && site.east_m.is_finite(),
            "hospitals row {}: {} has a non-finite coordinate ({}, {})",
            row + 1,
            site.name,
            site.north_m,
            site.east_m
        );
        if registry.get(&site.name).is_some() {
            tracing::warn!(site = %site.name, "Duplicate hospital name, keeping the last one");
        }
        registry.insert(site);
    }
    Ok(registry)
}

/// Parse an orders file, resolving each row against `sites`.
///
/// Ids are assigned in file order starting at 1. The result is sorted by
/// arrival time; rows with equal times keep their file order.
pub fn read_orders<R: Read>(input: R, sites: &SiteRegistry) -> Result<Vec<Order>> {
    let mut orders = Vec::new();
    for (row, record) in reader(input).deserialize::<OrderRow>().enumerate() {
        let record = record.with_context(|| format!("orders row {}", row + 1))?;
        let id = OrderId(row as u64 + 1);
        let order = sites
            .resolve(id, &record.hospital, record.priority, record.time)
            .with_context(|| format!("orders row {}", row + 1))?;
        orders.push(order);
    }
    orders.sort_by_key(|order| order.time);
    Ok(orders)
}

pub fn load_sites(path: &Path) -> Result<SiteRegistry> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let sites = read_sites(file).with_context(|| format!("reading {}", path.display()))?;
    tracing::info!(path = %path.display(), sites = sites.len(), "Loaded hospitals");
    Ok(sites)
}

pub fn load_orders(path: &Path, sites: &SiteRegistry) -> Result<Vec<Order>> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let orders = read_orders(file, sites).with_context(|| format!("reading {}", path.display()))?;
    tracing::info!(path = %path.display(), orders = orders.len(), "Loaded orders");
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip_core::Location;

    const HOSPITALS: &str = "\
Bigobo, 3000, 4000
Butaro,  -12000 , 500
Gikonko, 0, 7500
";

    #[test]
    fn test_read_sites_trims_fields() {
        let sites = read_sites(HOSPITALS.as_bytes()).unwrap();
        assert_eq!(sites.len(), 3);
        let butaro = sites.get("Butaro").unwrap();
        assert_eq!(butaro.location(), Location::new(-12_000.0, 500.0));
    }

    #[test]
    fn test_read_orders_resolves_and_sorts() {
        let sites = read_sites(HOSPITALS.as_bytes()).unwrap();
        let csv = "\
25200, Gikonko, Resupply
25000, Bigobo, Emergency
25200, Butaro, Emergency
";
        let orders = read_orders(csv.as_bytes(), &sites).unwrap();
        let summary: Vec<(u64, u32, &str)> = orders
            .iter()
            .map(|o| (o.id.0, o.time, o.site.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (2, 25000, "Bigobo"),
                (1, 25200, "Gikonko"),
                (3, 25200, "Butaro"),
            ]
        );
        assert_eq!(orders[0].priority, Priority::Emergency);
        assert_eq!(orders[0].location, Location::new(3_000.0, 4_000.0));
    }

    #[test]
    fn test_unknown_hospital_names_row() {
        let sites = read_sites(HOSPITALS.as_bytes()).unwrap();
        let csv = "100, Bigobo, Resupply\n200, Kigali, Emergency\n";
        let err = read_orders(csv.as_bytes(), &sites).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("orders row 2"), "{message}");
        assert!(message.contains("unknown site: Kigali"), "{message}");
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        let err = read_sites("Bigobo, 3000, 4000\nGhost, NaN, 0\n".as_bytes()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("hospitals row 2"), "{message}");
        assert!(message.contains("Ghost"), "{message}");

        assert!(read_sites("Far, 0, inf\n".as_bytes()).is_err());
    }

    #[test]
    fn test_bad_priority_is_an_error() {
        let sites = read_sites(HOSPITALS.as_bytes()).unwrap();
        let csv = "100, Bigobo, Routine\n";
        assert!(read_orders(csv.as_bytes(), &sites).is_err());
    }
}
