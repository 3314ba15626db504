//! Fleet and dispatch management for a single Nest.
//!
//! The manager owns the request queue and the set of Zips in the air. The
//! clock driver feeds it orders with [`FleetManager::queue_order`] and polls
//! [`FleetManager::launch_flights`]; each poll first lands returned Zips,
//! then plans and launches flights until the fleet or the queue runs out.

use std::collections::HashSet;

use serde::Serialize;

use crate::config::FleetConfig;
use crate::error::{DispatchError, Result};
use crate::flight::Flight;
use crate::models::Order;
use crate::planner::{PlannedRoute, RoutePlanner};
use crate::queue::RequestQueue;

/// A flight in the air and the time its Zip gets back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveFlight {
    pub flight: Flight,
    pub return_time: u32,
}

/// Dispatcher for one Nest's fleet.
#[derive(Debug, Clone)]
pub struct FleetManager {
    config: FleetConfig,
    planner: RoutePlanner,
    queue: RequestQueue,
    active: Vec<ActiveFlight>,
    completed_orders: usize,
    rejected_orders: usize,
    flights_launched: u64,
    last_launch_time: Option<u32>,
}

impl FleetManager {
    /// Create a dispatcher with every Zip at the Nest.
    pub fn new(config: FleetConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            planner: RoutePlanner::from_config(&config),
            config,
            queue: RequestQueue::new(),
            active: Vec::new(),
            completed_orders: 0,
            rejected_orders: 0,
            flights_launched: 0,
            last_launch_time: None,
        })
    }

    pub fn config(&self) -> &FleetConfig {
        &self.config
    }

    /// Accept a new order, or reject it if no Zip could ever reach it.
    pub fn queue_order(&mut self, order: Order) -> Result<()> {
        let round_trip_m = order.solo_round_trip_m();
        if !round_trip_m.is_finite() || round_trip_m > self.config.max_range_m {
            self.rejected_orders += 1;
            tracing::warn!(
                order_id = %order.id,
                site = %order.site,
                round_trip_m,
                max_range_m = self.config.max_range_m,
                "Rejecting unreachable order"
            );
            return Err(DispatchError::UnreachableOrder {
                order_id: order.id,
                round_trip_m,
                max_range_m: self.config.max_range_m,
            });
        }

        let (order_id, priority, time) = (order.id, order.priority, order.time);
        self.queue.enqueue(order)?;
        tracing::debug!(%order_id, %priority, time, pending = self.queue.len(), "Order queued");
        Ok(())
    }

    /// Land every Zip whose return time is at or before `now`.
    ///
    /// Returns how many Zips were freed. Calling again with the same time
    /// frees nothing more.
    pub fn release_returned(&mut self, now: u32) -> usize {
        let mut released = 0;
        let mut delivered = 0;

        self.active.retain(|entry| {
            if entry.return_time > now {
                return true;
            }
            released += 1;
            delivered += entry.flight.stop_count();
            tracing::debug!(
                flight = entry.flight.number(),
                return_time = entry.return_time,
                now,
                "Zip back at Nest"
            );
            false
        });

        self.completed_orders += delivered;
        released
    }

    /// Land returned Zips, then launch as many flights as the fleet,
    /// the queue and the emergency reserve allow.
    pub fn launch_flights(&mut self, now: u32) -> Result<Vec<Flight>> {
        if let Some(previous) = self.last_launch_time {
            if now < previous {
                tracing::error!(previous, now, "Dispatch clock moved backwards");
                return Err(DispatchError::ClockRegression {
                    previous,
                    current: now,
                });
            }
        }
        self.last_launch_time = Some(now);
        self.release_returned(now);

        let mut launched = Vec::new();
        while self.available_vehicles() > 0 && !self.queue.is_empty() {
            let pending = self.queue.snapshot();
            let counts = self.queue.pending_counts();

            let route = self.planner.plan_flight(&pending);
            if route.is_empty() {
                tracing::debug!(
                    now,
                    emergency_pending = counts.emergency,
                    resupply_pending = counts.resupply,
                    "No feasible flight this tick"
                );
                break;
            }

            let available = self.available_vehicles();
            if !self.admits(&route, available) {
                tracing::debug!(
                    now,
                    available,
                    reserved = self.config.reserved_emergency_vehicles,
                    resupply_pending = counts.resupply,
                    "Holding resupply flight to keep emergency reserve"
                );
                break;
            }

            launched.push(self.commit(now, route)?);
        }

        Ok(launched)
    }

    /// Reserved-capacity policy.
    ///
    /// A flight carrying any emergency goes whenever a Zip is free. A
    /// resupply-only flight goes only if the reserve is still whole after
    /// it leaves, so it is held when `available - 1 < reserved`.
    fn admits(&self, route: &PlannedRoute, available: usize) -> bool {
        if route.has_emergency() {
            return available > 0;
        }
        available > self.config.reserved_emergency_vehicles
    }

    fn commit(&mut self, now: u32, route: PlannedRoute) -> Result<Flight> {
        // Check every stop before removing any so a divergent plan leaves
        // the queue untouched.
        let mut seen = HashSet::with_capacity(route.stops.len());
        if let Some(bad) = route
            .stops
            .iter()
            .find(|o| !self.queue.contains(o.id) || !seen.insert(o.id))
        {
            tracing::error!(order_id = %bad.id, "Planned stop missing from request queue or repeated");
            return Err(DispatchError::QueueDivergence { order_id: bad.id });
        }
        for stop in &route.stops {
            if self.queue.remove_by_id(stop.id).is_none() {
                return Err(DispatchError::QueueDivergence { order_id: stop.id });
            }
        }

        self.flights_launched += 1;
        let flight = Flight::new(
            self.flights_launched,
            now,
            route.stops,
            route.total_distance_m,
            self.config.max_range_m,
        );
        let return_time = flight.return_time(self.config.groundspeed_mps);

        tracing::info!(
            flight = flight.number(),
            now,
            stops = flight.stop_count(),
            emergency = flight.has_emergency(),
            distance_m = flight.total_distance_m(),
            return_time,
            path = ?flight.flight_path(),
            "Launching flight"
        );

        self.active.push(ActiveFlight {
            flight: flight.clone(),
            return_time,
        });
        Ok(flight)
    }

    pub fn available_vehicles(&self) -> usize {
        self.config.fleet_size.saturating_sub(self.active.len())
    }

    pub fn active_flight_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_flights(&self) -> &[ActiveFlight] {
        &self.active
    }

    /// Earliest time a Zip in the air gets back, if any are flying.
    pub fn next_return_time(&self) -> Option<u32> {
        self.active.iter().map(|entry| entry.return_time).min()
    }

    /// Orders whose flight has landed.
    pub fn completed_order_count(&self) -> usize {
        self.completed_orders
    }

    /// Orders on flights that have not landed yet.
    pub fn in_flight_order_count(&self) -> usize {
        self.active
            .iter()
            .map(|entry| entry.flight.stop_count())
            .sum()
    }

    /// Orders still waiting for a flight.
    pub fn unfulfilled_order_count(&self) -> usize {
        self.queue.len()
    }

    /// Waiting orders, most urgent first.
    pub fn unfulfilled_orders(&self) -> Vec<Order> {
        self.queue.snapshot()
    }

    pub fn rejected_order_count(&self) -> usize {
        self.rejected_orders
    }

    pub fn flights_launched(&self) -> u64 {
        self.flights_launched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Location;
    use crate::models::{OrderId, Priority};

    fn config() -> FleetConfig {
        FleetConfig {
            fleet_size: 3,
            max_packages_per_flight: 1,
            groundspeed_mps: 10.0,
            max_range_m: 10_000.0,
            reserved_emergency_vehicles: 1,
        }
    }

    fn order(id: u64, priority: Priority, north_m: f64) -> Order {
        Order::new(
            OrderId(id),
            format!("site-{id}"),
            Location::new(north_m, 0.0),
            priority,
            0,
        )
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let bad = FleetConfig {
            fleet_size: 0,
            ..config()
        };
        assert!(matches!(
            FleetManager::new(bad),
            Err(DispatchError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_unreachable_order_is_rejected() {
        let mut fleet = FleetManager::new(config()).unwrap();
        let err = fleet
            .queue_order(order(1, Priority::Emergency, 5_001.0))
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnreachableOrder { .. }));
        assert_eq!(fleet.unfulfilled_order_count(), 0);
        assert_eq!(fleet.rejected_order_count(), 1);

        // Exactly half the range is still reachable.
        fleet
            .queue_order(order(2, Priority::Emergency, 5_000.0))
            .unwrap();
        assert_eq!(fleet.unfulfilled_order_count(), 1);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut fleet = FleetManager::new(config()).unwrap();
        fleet.queue_order(order(1, Priority::Emergency, 1_000.0)).unwrap();
        let flights = fleet.launch_flights(0).unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(fleet.active_flights()[0].return_time, 200);

        assert_eq!(fleet.release_returned(199), 0);
        assert_eq!(fleet.active_flight_count(), 1);

        assert_eq!(fleet.release_returned(200), 1);
        assert_eq!(fleet.release_returned(200), 0);
        assert_eq!(fleet.active_flight_count(), 0);
        assert_eq!(fleet.completed_order_count(), 1);
    }

    #[test]
    fn test_clock_regression_fails_fast() {
        let mut fleet = FleetManager::new(config()).unwrap();
        fleet.launch_flights(120).unwrap();
        fleet.launch_flights(120).unwrap();
        let err = fleet.launch_flights(60).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::ClockRegression {
                previous: 120,
                current: 60
            }
        ));
    }

    #[test]
    fn test_divergent_plan_leaves_queue_untouched() {
        let mut fleet = FleetManager::new(config()).unwrap();
        fleet.queue_order(order(1, Priority::Resupply, 1_000.0)).unwrap();

        let route = PlannedRoute {
            stops: vec![order(1, Priority::Resupply, 1_000.0), order(9, Priority::Resupply, 2_000.0)],
            total_distance_m: 4_000.0,
        };
        let err = fleet.commit(0, route).unwrap_err();
        assert!(matches!(err, DispatchError::QueueDivergence { order_id } if order_id == OrderId(9)));
        assert_eq!(fleet.unfulfilled_order_count(), 1);
        assert_eq!(fleet.active_flight_count(), 0);
        assert_eq!(fleet.flights_launched(), 0);
    }

    #[test]
    fn test_nan_location_is_rejected() {
        let mut fleet = FleetManager::new(config()).unwrap();
        let err = fleet
            .queue_order(order(1, Priority::Emergency, f64::NAN))
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnreachableOrder { .. }));
        assert_eq!(fleet.rejected_order_count(), 1);
        assert_eq!(fleet.unfulfilled_order_count(), 0);
        assert!(fleet.launch_flights(0).unwrap().is_empty());
    }

    #[test]
    fn test_repeated_stop_leaves_queue_untouched() {
        let mut fleet = FleetManager::new(config()).unwrap();
        fleet.queue_order(order(1, Priority::Resupply, 1_000.0)).unwrap();
        fleet.queue_order(order(2, Priority::Resupply, 2_000.0)).unwrap();

        let route = PlannedRoute {
            stops: vec![
                order(2, Priority::Resupply, 2_000.0),
                order(1, Priority::Resupply, 1_000.0),
                order(2, Priority::Resupply, 2_000.0),
            ],
            total_distance_m: 4_000.0,
        };
        let err = fleet.commit(0, route).unwrap_err();
        assert!(matches!(err, DispatchError::QueueDivergence { order_id } if order_id == OrderId(2)));
        assert_eq!(fleet.unfulfilled_order_count(), 2);
        assert_eq!(fleet.flights_launched(), 0);
    }

    #[test]
    fn test_emergency_uses_reserved_vehicle() {
        let mut fleet = FleetManager::new(config()).unwrap();
        for id in 1..=3 {
            fleet.queue_order(order(id, Priority::Emergency, 1_000.0)).unwrap();
        }
        let flights = fleet.launch_flights(0).unwrap();
        assert_eq!(flights.len(), 3);
        assert_eq!(fleet.available_vehicles(), 0);
    }

    #[test]
    fn test_resupply_stops_at_reserve() {
        let mut fleet = FleetManager::new(config()).unwrap();
        for id in 1..=3 {
            fleet.queue_order(order(id, Priority::Resupply, 1_000.0)).unwrap();
        }
        let flights = fleet.launch_flights(0).unwrap();
        // 3 Zips, 1 reserved: two resupply flights, the third waits.
        assert_eq!(flights.len(), 2);
        assert_eq!(fleet.available_vehicles(), 1);
        assert_eq!(fleet.unfulfilled_order_count(), 1);
        assert_eq!(fleet.in_flight_order_count(), 2);
    }

    #[test]
    fn test_returned_zip_relaunches_same_tick() {
        let mut fleet = FleetManager::new(FleetConfig {
            fleet_size: 1,
            reserved_emergency_vehicles: 0,
            ..config()
        })
        .unwrap();
        fleet.queue_order(order(1, Priority::Resupply, 1_000.0)).unwrap();
        fleet.queue_order(order(2, Priority::Resupply, 1_000.0)).unwrap();

        assert_eq!(fleet.launch_flights(0).unwrap().len(), 1);
        assert_eq!(fleet.next_return_time(), Some(200));
        assert!(fleet.launch_flights(100).unwrap().is_empty());

        let flights = fleet.launch_flights(200).unwrap();
        assert_eq!(flights.len(), 1);
        assert_eq!(flights[0].launch_time(), 200);
        assert_eq!(fleet.completed_order_count(), 1);
    }
}
