//! Synthetic order streams for exercising the dispatcher.

use std::io::Write;

use anyhow::{ensure, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use zip_core::{Priority, SiteRegistry};

/// Shape of a generated day of demand.
#[derive(Debug, Clone)]
pub struct DemandProfile {
    pub orders: usize,
    /// First possible order time, seconds since midnight
    pub start_s: u32,
    /// Orders arrive strictly before this time
    pub end_s: u32,
    /// Probability that an order is an emergency (clamped to 0..=1)
    pub emergency_share: f64,
    pub seed: u64,
}

impl Default for DemandProfile {
    fn default() -> Self {
        Self {
            orders: 100,
            start_s: 8 * 3600,
            end_s: 20 * 3600,
            emergency_share: 0.25,
            seed: 42,
        }
    }
}

/// One row of a generated orders file. Field order matches the orders CSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedOrder {
    pub time: u32,
    pub hospital: String,
    pub priority: Priority,
}

/// Draw `profile.orders` orders spread over the profile window.
///
/// The same profile and registry always give the same stream.
pub fn generate_orders(
    profile: &DemandProfile,
    sites: &SiteRegistry,
) -> Result<Vec<GeneratedOrder>> {
    ensure!(!sites.is_empty(), "no hospitals to generate orders for");
    ensure!(
        profile.start_s < profile.end_s,
        "demand window is empty ({}..{})",
        profile.start_s,
        profile.end_s
    );

    let mut names: Vec<&str> = sites.iter().map(|site| site.name.as_str()).collect();
    names.sort_unstable();

    let emergency_share = profile.emergency_share.clamp(0.0, 1.0);
    let mut rng = StdRng::seed_from_u64(profile.seed);

    let mut orders: Vec<GeneratedOrder> = (0..profile.orders)
        .map(|_| {
            let time = rng.random_range(profile.start_s..profile.end_s);
            let hospital = names[rng.random_range(0..names.len())].to_string();
            let priority = if rng.random_bool(emergency_share) {
                Priority::Emergency
            } else {
                Priority::Resupply
            };
            GeneratedOrder {
                time,
                hospital,
                priority,
            }
        })
        .collect();
    orders.sort_by_key(|order| order.time);

    tracing::debug!(
        orders = orders.len(),
        sites = names.len(),
        seed = profile.seed,
        "Generated demand"
    );
    Ok(orders)
}

/// Write orders as a headerless CSV readable by the orders loader.
pub fn write_orders<W: Write>(orders: &[GeneratedOrder], output: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(output);
    for order in orders {
        writer.serialize(order)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{read_orders, read_sites};

    fn sites() -> SiteRegistry {
        read_sites("Bigobo,3000,4000\nGikonko,-12000,8000\nKabgayi,9000,-2000\n".as_bytes())
            .unwrap()
    }

    #[test]
    fn test_same_seed_same_stream() {
        let profile = DemandProfile::default();
        let a = generate_orders(&profile, &sites()).unwrap();
        let b = generate_orders(&profile, &sites()).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 100);
    }

    #[test]
    fn test_orders_sorted_within_window() {
        let profile = DemandProfile {
            orders: 250,
            start_s: 1_000,
            end_s: 2_000,
            ..DemandProfile::default()
        };
        let orders = generate_orders(&profile, &sites()).unwrap();
        assert!(orders.windows(2).all(|w| w[0].time <= w[1].time));
        assert!(orders.iter().all(|o| (1_000..2_000).contains(&o.time)));
    }

    #[test]
    fn test_emergency_share_extremes() {
        let all = DemandProfile {
            emergency_share: 1.5,
            ..DemandProfile::default()
        };
        let orders = generate_orders(&all, &sites()).unwrap();
        assert!(orders.iter().all(|o| o.priority == Priority::Emergency));

        let none = DemandProfile {
            emergency_share: 0.0,
            ..DemandProfile::default()
        };
        let orders = generate_orders(&none, &sites()).unwrap();
        assert!(orders.iter().all(|o| o.priority == Priority::Resupply));
    }

    #[test]
    fn test_empty_registry_is_an_error() {
        let err = generate_orders(&DemandProfile::default(), &SiteRegistry::new()).unwrap_err();
        assert!(err.to_string().contains("no hospitals"));
    }

    #[test]
    fn test_written_orders_load_back() {
        let sites = sites();
        let profile = DemandProfile {
            orders: 20,
            ..DemandProfile::default()
        };
        let generated = generate_orders(&profile, &sites).unwrap();

        let mut out = Vec::new();
        write_orders(&generated, &mut out).unwrap();
        let loaded = read_orders(out.as_slice(), &sites).unwrap();

        assert_eq!(loaded.len(), 20);
        assert_eq!(loaded[0].site, generated[0].hospital);
        assert_eq!(loaded[19].time, generated[19].time);
    }
}
