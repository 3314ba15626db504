//! Record of a launched flight.

use std::fmt;

use serde::Serialize;

use crate::geometry::Location;
use crate::models::{Order, OrderId};

/// A launched flight. Built once at dispatch and never modified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flight {
    number: u64,
    launch_time: u32,
    stops: Vec<Order>,
    total_distance_m: f64,
    battery_remaining_pct: f64,
}

/// Forecast arrival of one order on a flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Delivery {
    pub order_id: OrderId,
    pub site: String,
    pub arrival_time: u32,
}

impl Flight {
    pub fn new(
        number: u64,
        launch_time: u32,
        stops: Vec<Order>,
        total_distance_m: f64,
        max_range_m: f64,
    ) -> Self {
        let battery_remaining_pct = if max_range_m > 0.0 {
            100.0 - (total_distance_m / max_range_m) * 100.0
        } else {
            0.0
        };
        Self {
            number,
            launch_time,
            stops,
            total_distance_m,
            battery_remaining_pct,
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn launch_time(&self) -> u32 {
        self.launch_time
    }

    /// Orders in the sequence they are delivered.
    pub fn stops(&self) -> &[Order] {
        &self.stops
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn total_distance_m(&self) -> f64 {
        self.total_distance_m
    }

    /// Battery expected on landing, as a percentage of a full charge.
    pub fn battery_remaining_pct(&self) -> f64 {
        self.battery_remaining_pct
    }

    pub fn has_emergency(&self) -> bool {
        self.stops.iter().any(|order| order.priority.is_emergency())
    }

    /// Site names in visiting order.
    pub fn flight_path(&self) -> Vec<String> {
        self.stops.iter().map(|order| order.site.clone()).collect()
    }

    /// Whole seconds airborne, rounded up.
    pub fn flight_time_s(&self, groundspeed_mps: f64) -> u32 {
        seconds_at(self.total_distance_m, groundspeed_mps)
    }

    /// Time the Zip is back at the Nest and can fly again.
    pub fn return_time(&self, groundspeed_mps: f64) -> u32 {
        self.launch_time
            .saturating_add(self.flight_time_s(groundspeed_mps))
    }

    /// Arrival time at each stop.
    pub fn delivery_schedule(&self, groundspeed_mps: f64) -> Vec<Delivery> {
        let mut flown_m = 0.0;
        let mut current = Location::NEST;

        self.stops
            .iter()
            .map(|order| {
                flown_m += current.distance_to(&order.location);
                current = order.location;
                Delivery {
                    order_id: order.id,
                    site: order.site.clone(),
                    arrival_time: self
                        .launch_time
                        .saturating_add(seconds_at(flown_m, groundspeed_mps)),
                }
            })
            .collect()
    }
}

fn seconds_at(distance_m: f64, groundspeed_mps: f64) -> u32 {
    if groundspeed_mps <= 0.0 {
        return u32::MAX;
    }
    (distance_m / groundspeed_mps).ceil() as u32
}

impl fmt::Display for Flight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Flight {} at t={}s: Nest", self.number, self.launch_time)?;
        for order in &self.stops {
            write!(f, " -> {} ({} {})", order.site, order.priority, order.id)?;
        }
        write!(
            f,
            " -> Nest, {:.1} km, {:.0}% battery remaining",
            self.total_distance_m / 1_000.0,
            self.battery_remaining_pct
        )
    }
}
