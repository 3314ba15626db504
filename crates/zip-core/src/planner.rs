//! Greedy route construction for a single flight.
//!
//! The planner walks outward from the Nest, always taking the nearest
//! remaining order of the most urgent class that still lets the Zip get
//! home within range. Flights are replanned every tick against the fresh
//! queue.

use crate::config::FleetConfig;
use crate::geometry::Location;
use crate::models::Order;

/// Stops chosen for one flight, in visiting order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlannedRoute {
    pub stops: Vec<Order>,
    /// Full round trip including the leg back to the Nest
    pub total_distance_m: f64,
}

impl PlannedRoute {
    /// True when no flight could be built from the pending orders.
    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// True when at least one stop is an emergency delivery.
    pub fn has_emergency(&self) -> bool {
        self.stops.iter().any(|order| order.priority.is_emergency())
    }
}

/// Nearest-neighbour planner bounded by flight capacity and range.
#[derive(Debug, Clone)]
pub struct RoutePlanner {
    max_packages_per_flight: usize,
    max_range_m: f64,
}

impl RoutePlanner {
    pub fn new(max_packages_per_flight: usize, max_range_m: f64) -> Self {
        Self {
            max_packages_per_flight,
            max_range_m,
        }
    }

    pub fn from_config(config: &FleetConfig) -> Self {
        Self::new(config.max_packages_per_flight, config.max_range_m)
    }

    /// Build one flight from `pending`, which should be in queue order.
    ///
    /// `pending` is only read; the caller commits the returned stops.
    pub fn plan_flight(&self, pending: &[Order]) -> PlannedRoute {
        let mut candidates: Vec<&Order> = pending.iter().collect();
        let mut stops: Vec<Order> = Vec::new();
        let mut total_distance_m = 0.0;
        let mut current = Location::NEST;

        while stops.len() < self.max_packages_per_flight && !candidates.is_empty() {
            let emergency_pool = candidates.iter().any(|o| o.priority.is_emergency());
            let Some(idx) = nearest_in_pool(&candidates, &current, emergency_pool) else {
                break;
            };
            let candidate = candidates.remove(idx);

            let leg_m = current.distance_to(&candidate.location);
            let extended_m = total_distance_m + leg_m + candidate.location.distance_from_nest();
            if !extended_m.is_finite() || extended_m > self.max_range_m {
                tracing::trace!(
                    order_id = %candidate.id,
                    extended_m,
                    max_range_m = self.max_range_m,
                    "Stop out of range from current position, skipping"
                );
                continue;
            }

            total_distance_m += leg_m;
            current = candidate.location;
            stops.push(candidate.clone());
        }

        if stops.is_empty() {
            return PlannedRoute::default();
        }

        total_distance_m += current.distance_from_nest();
        PlannedRoute {
            stops,
            total_distance_m,
        }
    }
}

/// Index of the closest candidate in the emergency or resupply pool.
///
/// Exact distance ties go to the earlier arrival, then to queue order.
fn nearest_in_pool(candidates: &[&Order], from: &Location, emergency: bool) -> Option<usize> {
    let mut best: Option<(usize, f64, u32)> = None;

    for (idx, order) in candidates.iter().enumerate() {
        if order.priority.is_emergency() != emergency {
            continue;
        }
        let distance_m = from.distance_to(&order.location);
        let closer = match best {
            None => true,
            Some((_, best_m, best_time)) => {
                distance_m < best_m || (distance_m == best_m && order.time < best_time)
            }
        };
        if closer {
            best = Some((idx, distance_m, order.time));
        }
    }

    best.map(|(idx, _, _)| idx)
}
